//! Conversation loop: question → completion with tools → tool round → answer.

use async_trait::async_trait;
use std::sync::Arc;

use crate::completion::{CompletionMessage, CompletionProvider, CompletionRequest};
use crate::dispatch::Dispatcher;
use crate::types::{CompletionConfig, Result};

/// Reply used whenever the model calls no tool.
pub const NO_TOOL_MATCH_REPLY: &str = "No matching tool function found.";

/// Anything that can answer a user's question with text.
#[async_trait]
pub trait QueryResponder: Send + Sync {
    async fn respond(&self, query: &str) -> String;
}

/// Sampling settings shared by both completion calls.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&CompletionConfig> for CompletionSettings {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Runs a single question through the model and the tool backends.
#[derive(Clone)]
pub struct QueryProcessor {
    provider: Arc<dyn CompletionProvider>,
    dispatcher: Arc<Dispatcher>,
    settings: CompletionSettings,
}

impl std::fmt::Debug for QueryProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryProcessor")
            .field("settings", &self.settings)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

impl QueryProcessor {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        dispatcher: Arc<Dispatcher>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            settings,
        }
    }

    /// Answer a question. Never fails: errors are reported in the returned text.
    pub async fn process_query(&self, query: &str) -> String {
        match self.run(query).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!("Error processing query: {}", e);
                format!("An error occurred: {}", e)
            }
        }
    }

    async fn run(&self, query: &str) -> Result<String> {
        let initial = CompletionMessage::user(query);
        let first = self
            .provider
            .complete(self.request(
                vec![initial.clone()],
                self.dispatcher.catalog().to_function_specs(),
            ))
            .await?;

        if first.tool_calls.is_empty() {
            tracing::info!("Model called no tool; answering with the fallback reply");
            return Ok(NO_TOOL_MATCH_REPLY.to_string());
        }

        tracing::info!(
            calls = first.tool_calls.len(),
            "Model requested tools: {:?}",
            first
                .tool_calls
                .iter()
                .map(|c| c.function.name.as_str())
                .collect::<Vec<_>>()
        );

        let calls = first.tool_calls.clone();
        let mut history = vec![initial, first];
        for call in &calls {
            history.push(self.dispatcher.execute(call).await);
        }

        let last = self.provider.complete(self.request(history, Vec::new())).await?;
        Ok(last.content.unwrap_or_default())
    }

    fn request(
        &self,
        messages: Vec<CompletionMessage>,
        tools: Vec<serde_json::Value>,
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            tools,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

#[async_trait]
impl QueryResponder for QueryProcessor {
    async fn respond(&self, query: &str) -> String {
        self.process_query(query).await
    }
}
