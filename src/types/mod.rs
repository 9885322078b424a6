//! Core types for the governance agent.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Strongly-typed identifiers (MessageId, AgentAddress)
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration for the completion API, backends and transport

mod config;
mod errors;
mod ids;

pub use config::{
    CanisterConfig, CompletionConfig, Config, IcNetwork, ServerConfig, StatisticsConfig,
    TransportConfig,
};
pub use errors::{Error, Result};
pub use ids::{AgentAddress, MessageId};
