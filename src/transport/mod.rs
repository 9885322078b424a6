//! Framed TCP transport for the chat protocol.
//!
//! Each inbound envelope frame is answered by zero or more reply frames in
//! the order the handler produced them, then one end frame.

pub mod client;
pub mod codec;
pub mod server;

pub use client::AgentClient;
pub use server::AgentServer;
