//! Native ICP integration for the proposal-store canister.
//!
//! Talks to the canister through `ic-agent` with candid-encoded arguments.
//! Interface: `canister/governance_store.did`.

use async_trait::async_trait;
use candid::{CandidType, Decode, Encode, Nat, Principal};
use ic_agent::identity::{AnonymousIdentity, BasicIdentity, Secp256k1Identity};
use ic_agent::{Agent, Identity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::OnceCell;

use crate::types::{CanisterConfig, Error, IcNetwork, Result};

/// Preferences record as stored by the canister.
#[derive(Debug, Clone, PartialEq, Eq, CandidType, Serialize, Deserialize)]
pub struct Preferences {
    pub prefs: String,
    pub created_at_ns: u64,
    pub updated_at_ns: u64,
}

/// The small piece of mutable state the agent keeps on-chain.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn add_proposal_id(&self, proposal_id: u64) -> Result<()>;

    async fn remove_proposal_id(&self, proposal_id: u64) -> Result<()>;

    async fn proposal_ids(&self) -> Result<Vec<u64>>;

    async fn preferences(&self) -> Result<Option<Preferences>>;

    async fn set_preferences(&self, prefs: String) -> Result<Preferences>;
}

/// ic-agent client bound to one canister.
///
/// Nothing touches the network until the first call: the canister ID is
/// parsed, the identity loaded and (on `local`) the root key fetched then.
/// A failed attempt is not cached, so the next call retries.
pub struct IcCanisterClient {
    config: CanisterConfig,
    connection: OnceCell<Connection>,
}

struct Connection {
    agent: Agent,
    canister_id: Principal,
}

impl std::fmt::Debug for IcCanisterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcCanisterClient")
            .field("canister_id", &self.config.canister_id)
            .field("connected", &self.connection.initialized())
            .finish_non_exhaustive()
    }
}

impl IcCanisterClient {
    pub fn new(config: &CanisterConfig) -> Self {
        Self {
            config: config.clone(),
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<&Connection> {
        self.connection
            .get_or_try_init(|| connect(&self.config))
            .await
    }

    async fn update(&self, method: &str, arg: Vec<u8>) -> Result<Vec<u8>> {
        let conn = self.connection().await?;
        conn.agent
            .update(&conn.canister_id, method)
            .with_arg(arg)
            .call_and_wait()
            .await
            .map_err(|e| Error::canister(format!("{} failed: {}", method, e)))
    }

    async fn query(&self, method: &str, arg: Vec<u8>) -> Result<Vec<u8>> {
        let conn = self.connection().await?;
        conn.agent
            .query(&conn.canister_id, method)
            .with_arg(arg)
            .call()
            .await
            .map_err(|e| Error::canister(format!("{} failed: {}", method, e)))
    }
}

/// Build the agent for the configured network. Fetches the root key on `local`.
async fn connect(config: &CanisterConfig) -> Result<Connection> {
    let canister_id = parse_canister_id(&config.canister_id)?;

    let identity: Box<dyn Identity> = match &config.identity_pem {
        Some(path) => load_identity(Path::new(path))?,
        None => Box::new(AnonymousIdentity),
    };

    let agent = Agent::builder()
        .with_url(config.replica_url())
        .with_boxed_identity(identity)
        .build()
        .map_err(|e| Error::canister(format!("Failed to build agent: {}", e)))?;

    if config.network == IcNetwork::Local {
        agent
            .fetch_root_key()
            .await
            .map_err(|e| Error::canister(format!("Failed to fetch root key: {}", e)))?;
    }

    tracing::info!(
        canister_id = %canister_id,
        url = config.replica_url(),
        "Connected to proposal-store canister"
    );
    Ok(Connection { agent, canister_id })
}

#[async_trait]
impl ProposalStore for IcCanisterClient {
    async fn add_proposal_id(&self, proposal_id: u64) -> Result<()> {
        let arg = Encode!(&Nat::from(proposal_id)).map_err(candid_error)?;
        self.update("addProposalId", arg).await?;
        Ok(())
    }

    async fn remove_proposal_id(&self, proposal_id: u64) -> Result<()> {
        let arg = Encode!(&Nat::from(proposal_id)).map_err(candid_error)?;
        self.update("removeProposalId", arg).await?;
        Ok(())
    }

    async fn proposal_ids(&self) -> Result<Vec<u64>> {
        let arg = Encode!().map_err(candid_error)?;
        let bytes = self.query("getProposalIds", arg).await?;
        let ids = Decode!(&bytes, Vec<Nat>).map_err(candid_error)?;
        ids.iter().map(nat_to_u64).collect()
    }

    async fn preferences(&self) -> Result<Option<Preferences>> {
        let arg = Encode!().map_err(candid_error)?;
        let bytes = self.query("getPreferences", arg).await?;
        Decode!(&bytes, Option<Preferences>).map_err(candid_error)
    }

    async fn set_preferences(&self, prefs: String) -> Result<Preferences> {
        let arg = Encode!(&prefs).map_err(candid_error)?;
        let bytes = self.update("setPreferences", arg).await?;
        Decode!(&bytes, Preferences).map_err(candid_error)
    }
}

/// Parse a principal, reporting failures as canister-ID problems.
pub fn parse_canister_id(text: &str) -> Result<Principal> {
    Principal::from_text(text.trim())
        .map_err(|e| Error::invalid_canister_id(text, e.to_string()))
}

/// Load a PEM identity. secp256k1 keys (dfx default) first, then ed25519.
fn load_identity(path: &Path) -> Result<Box<dyn Identity>> {
    if let Ok(id) = Secp256k1Identity::from_pem_file(path) {
        return Ok(Box::new(id));
    }
    BasicIdentity::from_pem_file(path)
        .map(|id| Box::new(id) as Box<dyn Identity>)
        .map_err(|e| {
            Error::config(format!(
                "Failed to load identity from {}: {}",
                path.display(),
                e
            ))
        })
}

fn candid_error(e: candid::Error) -> Error {
    Error::canister(format!("candid: {}", e))
}

fn nat_to_u64(n: &Nat) -> Result<u64> {
    u64::try_from(&n.0).map_err(|_| Error::canister(format!("proposal id {} exceeds u64", n)))
}
