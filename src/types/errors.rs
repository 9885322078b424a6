//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the governance agent.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation errors (bad tool arguments, bad envelopes).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown tool, endpoint or message kind.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or inconsistent configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Completion API rejected the request or returned something unusable.
    #[error("completion API error: {0}")]
    Completion(String),

    /// Non-2xx answer from an upstream HTTP API.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Canister ID text could not be parsed as a principal.
    #[error("invalid CanisterId '{id}': {reason}")]
    InvalidCanisterId { id: String, reason: String },

    /// Canister call or candid decoding failed.
    #[error("canister error: {0}")]
    Canister(String),

    /// Timeout.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Internal errors.
    #[error("internal error: {0}")]
    Internal(String),

    /// HTTP transport errors.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable error code written into transport error frames.
    pub fn to_error_code(&self) -> &'static str {
        match self {
            Error::Validation(_) | Error::Serialization(_) => "INVALID_ARGUMENT",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Config(_) | Error::InvalidCanisterId { .. } => "FAILED_PRECONDITION",
            Error::Completion(_) | Error::Upstream { .. } | Error::Http(_) => "UNAVAILABLE",
            Error::Canister(_) => "UNAVAILABLE",
            Error::Timeout(_) => "DEADLINE_EXCEEDED",
            Error::Internal(_) | Error::Io(_) => "INTERNAL",
        }
    }

    /// True when the failure points at the canister identifier rather than the call.
    pub fn is_canister_id_error(&self) -> bool {
        match self {
            Error::InvalidCanisterId { .. } => true,
            Error::Canister(msg) => msg.contains("CanisterId"),
            _ => false,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }

    pub fn canister(msg: impl Into<String>) -> Self {
        Self::Canister(msg.into())
    }

    pub fn invalid_canister_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCanisterId {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
