//! Agent assembly: wires configuration into the clients, dispatcher,
//! query processor and chat handler.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::backends::{IcApiClient, IcCanisterClient, ProposalStore, StatisticsApi};
use crate::chat::ChatHandler;
use crate::completion::{CompletionProvider, HttpCompletionClient};
use crate::conversation::{CompletionSettings, QueryProcessor};
use crate::dispatch::Dispatcher;
use crate::tools::ToolCatalog;
use crate::transport::AgentServer;
use crate::types::{AgentAddress, Config, Error, Result};

/// A fully wired governance agent.
#[derive(Debug, Clone)]
pub struct GovernanceAgent {
    config: Config,
    processor: Arc<QueryProcessor>,
    handler: ChatHandler,
}

impl GovernanceAgent {
    /// Build the agent against the real completion API, statistics API and canister.
    ///
    /// No network calls happen here; the canister is reached on first use.
    pub fn from_config(config: Config) -> Result<Self> {
        let provider = Arc::new(HttpCompletionClient::new(&config.completion)?);
        let statistics = Arc::new(IcApiClient::new(&config.statistics)?);
        let store = Arc::new(IcCanisterClient::new(&config.canister));
        Self::with_backends(config, provider, statistics, store)
    }

    /// Build the agent over caller-supplied backends.
    pub fn with_backends(
        config: Config,
        provider: Arc<dyn CompletionProvider>,
        statistics: Arc<dyn StatisticsApi>,
        store: Arc<dyn ProposalStore>,
    ) -> Result<Self> {
        let catalog = Arc::new(ToolCatalog::governance());
        let dispatcher = Arc::new(Dispatcher::new(catalog, statistics, store));
        let processor = Arc::new(QueryProcessor::new(
            provider,
            dispatcher,
            CompletionSettings::from(&config.completion),
        ));
        let address = AgentAddress::from_string(config.server.agent_name.clone())
            .map_err(Error::config)?;
        let handler = ChatHandler::new(address, processor.clone());

        Ok(Self {
            config,
            processor,
            handler,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handler(&self) -> &ChatHandler {
        &self.handler
    }

    /// Answer one question directly, bypassing the chat protocol.
    pub async fn ask(&self, query: &str) -> String {
        self.processor.process_query(query).await
    }

    /// Chat server bound to the configured listen address.
    pub fn server(&self) -> Result<AgentServer> {
        let addr: SocketAddr = self.config.server.listen_addr.parse().map_err(|e| {
            Error::config(format!(
                "invalid listen address '{}': {}",
                self.config.server.listen_addr, e
            ))
        })?;
        Ok(AgentServer::new(
            self.handler.clone(),
            addr,
            self.config.transport.clone(),
        ))
    }
}
