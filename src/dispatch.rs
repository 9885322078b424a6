//! Tool dispatcher: routes a model tool call to the backend that serves it.
//!
//! Routing is by catalog membership: every entry names its [`ToolBackend`].
//! Failures never escape [`Dispatcher::execute`]; they become a tool message
//! the model can explain to the user.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::backends::{ProposalStore, StatisticsApi, StatsRequest};
use crate::completion::{CompletionMessage, ToolCall};
use crate::tools::governance as names;
use crate::tools::{ToolBackend, ToolCatalog};
use crate::types::{Error, Result};
use crate::validation::normalize_proposal_id;

/// Routes tool calls to the statistics API or the proposal-store canister.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    statistics: Arc<dyn StatisticsApi>,
    store: Arc<dyn ProposalStore>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.catalog.list_names())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<ToolCatalog>,
        statistics: Arc<dyn StatisticsApi>,
        store: Arc<dyn ProposalStore>,
    ) -> Self {
        Self {
            catalog,
            statistics,
            store,
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Run one tool by name and return its JSON result.
    pub async fn dispatch(&self, name: &str, args: &Value) -> Result<Value> {
        match self.catalog.backend_for(name) {
            Some(ToolBackend::Statistics) => {
                let request = StatsRequest::for_tool(name, args)?;
                self.statistics.fetch(&request).await
            }
            Some(ToolBackend::Canister) => self.call_canister(name, args).await,
            None => Err(Error::not_found(format!("Unsupported tool: {}", name))),
        }
    }

    async fn call_canister(&self, name: &str, args: &Value) -> Result<Value> {
        tracing::debug!(function = name, args = %args, "Canister call");

        match name {
            names::ADD_PROPOSAL_ID => {
                let id = normalize_proposal_id(args)?;
                tracing::info!("Adding proposal ID {}", id);
                self.store.add_proposal_id(id).await?;
                Ok(json!({ "status": "ok" }))
            }
            names::REMOVE_PROPOSAL_ID => {
                let id = normalize_proposal_id(args)?;
                tracing::info!("Removing proposal ID {}", id);
                self.store.remove_proposal_id(id).await?;
                Ok(json!({ "status": "ok" }))
            }
            names::GET_PROPOSAL_IDS => {
                let ids = self.store.proposal_ids().await?;
                tracing::info!("Stored proposal IDs: {:?}", ids);
                Ok(json!({ "status": "ok", "proposal_ids": ids }))
            }
            names::GET_USER_PREFERENCES => {
                let prefs = self.store.preferences().await?;
                Ok(json!({ "status": "ok", "preferences": prefs }))
            }
            names::SET_USER_PREFERENCES => {
                let text = args
                    .get("preferences")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::validation("preferences is missing"))?;
                let prefs = self.store.set_preferences(text.to_string()).await?;
                Ok(json!({ "status": "ok", "preferences": prefs }))
            }
            other => Err(Error::not_found(format!(
                "Unsupported canister function: {}",
                other
            ))),
        }
    }

    /// Execute a model tool call and wrap the outcome as a `tool` message.
    pub async fn execute(&self, call: &ToolCall) -> CompletionMessage {
        let name = call.function.name.as_str();
        let content = match self.run_call(call).await {
            Ok(result) => result.to_string(),
            Err(e) => {
                tracing::error!("Tool execution failed for {}: {}", name, e);
                json!({
                    "error": format_error_response(&e),
                    "status": "failed",
                    "tool": name,
                })
                .to_string()
            }
        };
        CompletionMessage::tool(call.id.clone(), content)
    }

    async fn run_call(&self, call: &ToolCall) -> Result<Value> {
        let name = call.function.name.as_str();
        let args = call.function.parse_arguments()?;

        let problems = self.catalog.validate_args(name, &args)?;
        if !problems.is_empty() {
            return Err(Error::validation(problems.join("; ")));
        }

        self.dispatch(name, &args).await
    }
}

/// Turn a tool failure into text the model can relay to the user.
pub fn format_error_response(error: &Error) -> String {
    if error.is_canister_id_error() {
        format!(
            "⚠️ There was an issue with the canister identification.\n\n\
             Technical Details:\n\
             - Error: {}\n\
             - This might be due to an incorrect canister ID format\n\n\
             Suggested Actions:\n\
             1. Verify the canister ID is correct\n\
             2. Check that the canister is deployed\n\
             3. Try `dfx canister id backend` to get the correct ID",
            error
        )
    } else {
        format!(
            "⚠️ An error occurred while accessing your preferences:\n\n\
             {}\n\n\
             You can try:\n\
             1. Waiting a few moments and trying again\n\
             2. Checking if the canister is running",
            error
        )
    }
}
