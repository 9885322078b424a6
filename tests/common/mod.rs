//! Shared fixtures: axum stand-ins for the completion and statistics APIs,
//! and an in-memory proposal store.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use governance_agent::backends::{Preferences, ProposalStore};
use governance_agent::types::{CompletionConfig, Config, StatisticsConfig};
use governance_agent::Result;

/// Serve `app` on an ephemeral port and return its address.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Scripted completion endpoint. Replies are consumed in order; requests are recorded.
#[derive(Default)]
pub struct MockCompletions {
    replies: Mutex<VecDeque<(StatusCode, Value)>>,
    pub requests: Mutex<Vec<Value>>,
    pub auth_headers: Mutex<Vec<String>>,
}

impl MockCompletions {
    pub fn new(replies: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| (StatusCode::OK, r)).collect()),
            ..Self::default()
        })
    }

    pub fn failing(status: StatusCode, body: Value) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([(status, body)])),
            ..Self::default()
        })
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

async fn completions(
    State(mock): State<Arc<MockCompletions>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        mock.auth_headers.lock().unwrap().push(auth.to_string());
    }
    mock.requests.lock().unwrap().push(body);
    let (status, reply) = mock
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "no scripted reply"})));
    (status, Json(reply))
}

/// Start the completion mock; returns its `/v1` base URL.
pub async fn spawn_completions(mock: Arc<MockCompletions>) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(mock);
    format!("http://{}/v1", spawn_app(app).await)
}

/// A completion response whose first choice is plain text.
pub fn text_reply(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": text}
        }]
    })
}

/// A completion response whose first choice calls tools.
pub fn tool_reply(calls: &[(&str, &str, &str)]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, args)| {
            json!({
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": args}
            })
        })
        .collect();
    json!({
        "choices": [{
            "index": 0,
            "finish_reason": "tool_calls",
            "message": {"role": "assistant", "content": null, "tool_calls": tool_calls}
        }]
    })
}

/// Records every statistics request as `path?query`.
#[derive(Default)]
pub struct StatsLog {
    pub hits: Mutex<Vec<String>>,
}

impl StatsLog {
    fn record(&self, path: &str, query: Option<String>) {
        let entry = match query {
            Some(q) if !q.is_empty() => format!("{}?{}", path, q),
            _ => path.to_string(),
        };
        self.hits.lock().unwrap().push(entry);
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

async fn usd_rate(State(log): State<Arc<StatsLog>>) -> Json<Value> {
    log.record("/icp-usd-rate", None);
    Json(json!({"icp_usd_rate": [[1700000000, "5.12"]]}))
}

async fn proposals(State(log): State<Arc<StatsLog>>, RawQuery(query): RawQuery) -> Json<Value> {
    log.record("/proposals", query);
    Json(json!({"data": [{"proposal_id": 130000, "title": "Upgrade NNS"}], "max_proposal_index": 130000}))
}

async fn proposal_info(
    State(log): State<Arc<StatsLog>>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    log.record(&format!("/proposals/{}", id), None);
    if id == 0 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Proposal not found"})));
    }
    (StatusCode::OK, Json(json!({"proposal_id": id, "status": "EXECUTED"})))
}

/// Start the statistics mock; returns its `/api/v3` base URL.
pub async fn spawn_statistics(log: Arc<StatsLog>) -> String {
    let app = Router::new()
        .route("/api/v3/icp-usd-rate", get(usd_rate))
        .route("/api/v3/proposals", get(proposals))
        .route("/api/v3/proposals/{id}", get(proposal_info))
        .with_state(log);
    format!("http://{}/api/v3", spawn_app(app).await)
}

/// Proposal store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: Mutex<Vec<u64>>,
    prefs: Mutex<Option<Preferences>>,
}

#[async_trait]
impl ProposalStore for MemoryStore {
    async fn add_proposal_id(&self, proposal_id: u64) -> Result<()> {
        let mut ids = self.ids.lock().unwrap();
        if !ids.contains(&proposal_id) {
            ids.push(proposal_id);
        }
        Ok(())
    }

    async fn remove_proposal_id(&self, proposal_id: u64) -> Result<()> {
        self.ids.lock().unwrap().retain(|id| *id != proposal_id);
        Ok(())
    }

    async fn proposal_ids(&self) -> Result<Vec<u64>> {
        Ok(self.ids.lock().unwrap().clone())
    }

    async fn preferences(&self) -> Result<Option<Preferences>> {
        Ok(self.prefs.lock().unwrap().clone())
    }

    async fn set_preferences(&self, prefs: String) -> Result<Preferences> {
        let mut slot = self.prefs.lock().unwrap();
        let created = slot.as_ref().map_or(1, |p| p.created_at_ns);
        let stored = Preferences {
            prefs,
            created_at_ns: created,
            updated_at_ns: created + 1,
        };
        *slot = Some(stored.clone());
        Ok(stored)
    }
}

/// Config pointing both HTTP backends at the given mocks.
pub fn config_for(completion_url: &str, statistics_url: &str) -> Config {
    Config {
        completion: CompletionConfig {
            base_url: completion_url.to_string(),
            api_key: "sk-test".to_string(),
            ..CompletionConfig::default()
        },
        statistics: StatisticsConfig {
            base_url: statistics_url.to_string(),
            ..StatisticsConfig::default()
        },
        ..Config::default()
    }
}
