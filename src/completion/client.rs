//! Completion API client.

use async_trait::async_trait;

use super::types::{CompletionMessage, CompletionRequest, CompletionResponse};
use crate::types::{CompletionConfig, Error, Result};

/// Anything that can turn a request into the model's next message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion and return the first choice's message.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionMessage>;
}

/// HTTP client for an OpenAI-compatible completion endpoint (ASI:One by default).
#[derive(Clone)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::config("completion API key cannot be empty"));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionMessage> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Completion API returned {}: {}", status, body);
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed.into_first_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let mut config = CompletionConfig::default();
        config.api_key = "sk-test".to_string();
        config.base_url = "http://localhost:1234/v1/".to_string();
        let client = HttpCompletionClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn test_requires_api_key() {
        assert!(HttpCompletionClient::new(&CompletionConfig::default()).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let mut config = CompletionConfig::default();
        config.api_key = "sk-very-secret".to_string();
        let client = HttpCompletionClient::new(&config).unwrap();
        assert!(!format!("{:?}", client).contains("sk-very-secret"));
    }
}
