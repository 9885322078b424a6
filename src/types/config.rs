//! Configuration structures.
//!
//! Configuration is loaded from environment variables (and a `.env` file when
//! present). Every section has defaults matching the public endpoints.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::{Error, Result};

/// Global agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion API configuration.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// ICP statistics REST API configuration.
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Proposal-store canister configuration.
    #[serde(default)]
    pub canister: CanisterConfig,

    /// Agent endpoint configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Frame transport limits.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Completion API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Base URL; `/chat/completions` is appended.
    pub base_url: String,

    /// Bearer token. Required at runtime.
    #[serde(default)]
    pub api_key: String,

    /// Model identifier.
    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Per-request timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.asi1.ai/v1".to_string(),
            api_key: String::new(),
            model: "asi1-mini".to_string(),
            temperature: 0.7,
            max_tokens: 2048,
            timeout: Duration::from_secs(60),
        }
    }
}

// Keeps the API key out of logs.
impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// ICP statistics REST API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsConfig {
    pub base_url: String,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ic-api.internetcomputer.org/api/v3".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Which replica the canister lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IcNetwork {
    /// Local `dfx` replica. The root key must be fetched.
    Local,
    /// Mainnet.
    Ic,
}

impl std::str::FromStr for IcNetwork {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(IcNetwork::Local),
            "ic" | "mainnet" => Ok(IcNetwork::Ic),
            other => Err(Error::config(format!("Unknown ICP network: {}", other))),
        }
    }
}

/// Proposal-store canister configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanisterConfig {
    pub network: IcNetwork,

    /// Principal text of the proposal-store canister.
    pub canister_id: String,

    /// Replica URL used when `network` is `local`.
    pub local_url: String,

    /// Replica URL used when `network` is `ic`.
    pub mainnet_url: String,

    /// PEM identity file. Anonymous identity when unset.
    pub identity_pem: Option<String>,
}

impl CanisterConfig {
    /// Replica URL for the configured network.
    pub fn replica_url(&self) -> &str {
        match self.network {
            IcNetwork::Local => &self.local_url,
            IcNetwork::Ic => &self.mainnet_url,
        }
    }
}

impl Default for CanisterConfig {
    fn default() -> Self {
        Self {
            network: IcNetwork::Local,
            canister_id: "uxrrr-q7777-77774-qaaaq-cai".to_string(),
            local_url: "http://127.0.0.1:4943".to_string(),
            mainnet_url: "https://ic0.app".to_string(),
            identity_pem: None,
        }
    }
}

/// Agent endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Agent endpoint bind address (TCP).
    pub listen_addr: String,

    /// Name announced in logs.
    pub agent_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8001".to_string(),
            agent_name: "ICP-governance-agent".to_string(),
        }
    }
}

/// Frame transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum frame payload size in bytes.
    pub max_frame_bytes: u32,

    /// Maximum concurrent TCP connections. Connections beyond this limit
    /// are rejected.
    pub max_connections: usize,

    /// Read timeout in seconds per frame. Connections idle beyond this
    /// duration are dropped.
    pub read_timeout_secs: u64,

    /// Write timeout in seconds per frame.
    pub write_timeout_secs: u64,

    /// Bounded channel capacity for outbound envelopes of one request.
    pub outbox_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 1024 * 1024,
            max_connections: 256,
            read_timeout_secs: 300,
            write_timeout_secs: 10,
            outbox_capacity: 16,
        }
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(Error::config(format!("Failed to read .env: {}", e))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, starting from defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.completion.api_key = get("ASI1_API_KEY").ok_or_else(|| {
            Error::config("ASI1_API_KEY not set. Add it to your environment or .env")
        })?;
        if let Some(url) = get("ASI1_BASE_URL") {
            config.completion.base_url = url;
        }
        if let Some(model) = get("ASI1_MODEL") {
            config.completion.model = model;
        }
        if let Some(url) = get("IC_API_BASE_URL") {
            config.statistics.base_url = url;
        }
        if let Some(network) = get("ICP_NETWORK") {
            config.canister.network = network.parse()?;
        }
        if let Some(id) = get("ICP_CANISTER_ID") {
            config.canister.canister_id = id;
        }
        if let Some(url) = get("CANISTER_BASE_URL") {
            config.canister.local_url = url;
        }
        if let Some(pem) = get("ICP_IDENTITY_PEM") {
            config.canister.identity_pem = Some(pem);
        }
        if let Some(addr) = get("AGENT_LISTEN_ADDR") {
            config.server.listen_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the completion API would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.completion.api_key.trim().is_empty() {
            return Err(Error::config("completion API key cannot be empty"));
        }
        if self.completion.max_tokens == 0 {
            return Err(Error::config("max_tokens must be positive"));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(Error::config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.completion.temperature
            )));
        }
        if self.canister.canister_id.trim().is_empty() {
            return Err(Error::config("canister_id cannot be empty"));
        }
        Ok(())
    }
}
