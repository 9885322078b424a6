//! # Governance Agent - chat assistant for ICP governance
//!
//! Answers natural-language questions about Internet Computer governance by
//! letting a completion model pick from a fixed tool menu:
//! - ICP statistics REST API (proposals, neurons, rates, supply)
//! - A proposal-store canister (saved proposal IDs, user preferences)
//!
//! ## Flow
//!
//! ```text
//!   chat message ──► ChatHandler ──► QueryProcessor ──► completion API (with tools)
//!        ▲                                │
//!        │                                ▼
//!      reply ◄── completion API ◄── Dispatcher ──► statistics API | canister
//! ```
//!
//! One tool round per question: the model's tool calls are executed in
//! order, their results are sent back once, and that answer is the reply.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod agent;
pub mod backends;
pub mod chat;
pub mod completion;
pub mod conversation;
pub mod dispatch;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validation;

pub mod observability;

pub use agent::GovernanceAgent;
pub use types::{Config, Error, Result};
