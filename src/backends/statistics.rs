//! ICP statistics REST client (`ic-api.internetcomputer.org`).
//!
//! Each statistics tool maps to one GET endpoint. The mapping is a pure
//! function ([`StatsRequest::for_tool`]) so it can be checked without a server.

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::governance as names;
use crate::types::{Error, Result, StatisticsConfig};
use crate::validation::{normalize_proposal_id, optional_string_list, optional_u64};

/// Default page size for proposal listings.
pub const DEFAULT_PROPOSAL_LIMIT: u64 = 50;

const PROPOSAL_LIST_FILTERS: &[&str] = &[
    "include_reward_status",
    "include_topic",
    "include_status",
    "include_action",
    "include_action_nns_function",
];

const PROPOSAL_SCALAR_FILTERS: &[&str] = &["max_proposal_index", "manage_neuron_id", "proposer"];

/// A resolved GET request: path under the base URL plus query pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl StatsRequest {
    fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Resolve a statistics tool call into a request.
    pub fn for_tool(name: &str, args: &Value) -> Result<Self> {
        let request = match name {
            names::GET_GOVERNANCE_METRICS => Self::path("/governance-metrics"),
            names::GOVERNANCE_TOTAL_LOCKED_E8S => {
                Self::path("/governance-metrics/governance_total_locked_e8s")
            }
            names::GET_ICP_USD_RATE => Self::path("/icp-usd-rate"),
            names::GET_GOVERNANCE_NEURONS_TOTAL => Self::path("/metrics/governance-neurons-total"),
            names::GET_GOVERNANCE_VOTING_POWER_TOTAL => {
                Self::path("/metrics/governance-voting-power-total")
            }
            names::GET_IC_PROPOSALS => Self::proposals(args)?,
            names::GET_IC_PROPOSALS_COUNT => Self::path("/proposals-count"),
            names::GET_IC_LATEST_PROPOSAL_ID => Self::path("/latest-proposal-id"),
            names::GET_IC_PROPOSALS_OVER_PAST_7D => Self::path("/proposals-over-past-7d"),
            names::GET_IC_PROPOSAL_INFO => {
                let id = normalize_proposal_id(args)?;
                Self::path(format!("/proposals/{}", id))
            }
            other => {
                return Err(Error::not_found(format!(
                    "Unsupported function call: {}",
                    other
                )))
            }
        };
        Ok(request)
    }

    fn proposals(args: &Value) -> Result<Self> {
        let offset = optional_u64(args, "offset")?.unwrap_or(0);
        let limit = optional_u64(args, "limit")?.unwrap_or(DEFAULT_PROPOSAL_LIMIT);

        let mut query = vec![
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
            ("format".to_string(), "json".to_string()),
        ];
        for field in PROPOSAL_SCALAR_FILTERS {
            if let Some(v) = optional_u64(args, field)? {
                query.push((field.to_string(), v.to_string()));
            }
        }
        for field in PROPOSAL_LIST_FILTERS {
            for v in optional_string_list(args, field)? {
                query.push((field.to_string(), v));
            }
        }

        Ok(Self {
            path: "/proposals".to_string(),
            query,
        })
    }
}

/// Read-only statistics source.
#[async_trait]
pub trait StatisticsApi: Send + Sync {
    async fn fetch(&self, request: &StatsRequest) -> Result<Value>;
}

/// reqwest-backed client for the public API.
#[derive(Debug, Clone)]
pub struct IcApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl IcApiClient {
    pub fn new(config: &StatisticsConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, request: &StatsRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }
}

#[async_trait]
impl StatisticsApi for IcApiClient {
    async fn fetch(&self, request: &StatsRequest) -> Result<Value> {
        let url = self.url_for(request);
        tracing::debug!(url = %url, query = ?request.query, "Fetching ICP statistics");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(&request.query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_paths() {
        let cases = [
            (names::GET_GOVERNANCE_METRICS, "/governance-metrics"),
            (
                names::GOVERNANCE_TOTAL_LOCKED_E8S,
                "/governance-metrics/governance_total_locked_e8s",
            ),
            (names::GET_ICP_USD_RATE, "/icp-usd-rate"),
            (names::GET_GOVERNANCE_NEURONS_TOTAL, "/metrics/governance-neurons-total"),
            (
                names::GET_GOVERNANCE_VOTING_POWER_TOTAL,
                "/metrics/governance-voting-power-total",
            ),
            (names::GET_IC_PROPOSALS_COUNT, "/proposals-count"),
            (names::GET_IC_LATEST_PROPOSAL_ID, "/latest-proposal-id"),
            (names::GET_IC_PROPOSALS_OVER_PAST_7D, "/proposals-over-past-7d"),
        ];
        for (tool, path) in cases {
            let request = StatsRequest::for_tool(tool, &json!({})).unwrap();
            assert_eq!(request.path, path);
            assert!(request.query.is_empty());
        }
    }

    #[test]
    fn test_proposals_defaults() {
        let request = StatsRequest::for_tool(names::GET_IC_PROPOSALS, &json!({})).unwrap();
        assert_eq!(request.path, "/proposals");
        assert_eq!(
            request.query,
            pairs(&[("offset", "0"), ("limit", "50"), ("format", "json")])
        );
    }

    #[test]
    fn test_proposals_filters_repeat_keys() {
        let args = json!({
            "offset": 100,
            "limit": 75,
            "proposer": 42,
            "include_status": ["OPEN", "ADOPTED"],
            "include_topic": ["TOPIC_GOVERNANCE"],
        });
        let request = StatsRequest::for_tool(names::GET_IC_PROPOSALS, &args).unwrap();
        assert_eq!(
            request.query,
            pairs(&[
                ("offset", "100"),
                ("limit", "75"),
                ("format", "json"),
                ("proposer", "42"),
                ("include_topic", "TOPIC_GOVERNANCE"),
                ("include_status", "OPEN"),
                ("include_status", "ADOPTED"),
            ])
        );
    }

    #[test]
    fn test_proposal_info_path() {
        let request =
            StatsRequest::for_tool(names::GET_IC_PROPOSAL_INFO, &json!({"proposal_id": "131072"}))
                .unwrap();
        assert_eq!(request.path, "/proposals/131072");
    }

    #[test]
    fn test_proposal_info_requires_id() {
        assert!(StatsRequest::for_tool(names::GET_IC_PROPOSAL_INFO, &json!({})).is_err());
    }

    #[test]
    fn test_unknown_tool() {
        let err = StatsRequest::for_tool("add_proposal_id", &json!({})).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_url_for_strips_trailing_slash() {
        let client = IcApiClient::new(&StatisticsConfig {
            base_url: "http://localhost:8080/api/v3/".to_string(),
            ..StatisticsConfig::default()
        })
        .unwrap();
        let request = StatsRequest::for_tool(names::GET_ICP_USD_RATE, &json!({})).unwrap();
        assert_eq!(client.url_for(&request), "http://localhost:8080/api/v3/icp-usd-rate");
    }
}
