//! Completion API: request/response types and the HTTP client.

pub mod client;
pub mod types;

pub use client::{CompletionProvider, HttpCompletionClient};
pub use types::{
    Choice, CompletionMessage, CompletionRequest, CompletionResponse, FunctionCall, Role, ToolCall,
};

#[cfg(test)]
pub use client::MockCompletionProvider;
