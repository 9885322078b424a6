//! Agent chat protocol: message types and the two handlers (chat message,
//! acknowledgement).

pub mod handler;
pub mod protocol;

pub use handler::{ChatHandler, Outbox};
pub use protocol::{ChatAcknowledgement, ChatContent, ChatMessage, Envelope, ProtocolMessage};
