//! Chat protocol messages exchanged between agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{AgentAddress, MessageId};

/// One item of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChatContent {
    Text {
        text: String,
    },
    StartSession,
    EndSession,
    Metadata {
        #[serde(default)]
        metadata: HashMap<String, String>,
    },
    /// Any content kind this agent does not handle (resources, streams, ...).
    #[serde(other)]
    Unsupported,
}

impl ChatContent {
    pub fn text(text: impl Into<String>) -> Self {
        ChatContent::Text { text: text.into() }
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub timestamp: DateTime<Utc>,
    pub msg_id: MessageId,
    pub content: Vec<ChatContent>,
}

impl ChatMessage {
    /// Fresh message (new id, current time) carrying a single text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            msg_id: MessageId::new(),
            content: vec![ChatContent::text(text)],
        }
    }
}

/// Receipt for a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAcknowledgement {
    pub timestamp: DateTime<Utc>,
    pub acknowledged_msg_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl ChatAcknowledgement {
    pub fn for_message(msg_id: &MessageId) -> Self {
        Self {
            timestamp: Utc::now(),
            acknowledged_msg_id: msg_id.clone(),
            metadata: None,
        }
    }
}

/// Protocol message, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProtocolMessage {
    ChatMessage(ChatMessage),
    ChatAcknowledgement(ChatAcknowledgement),
}

/// Addressed protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub sender: AgentAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<AgentAddress>,
    pub message: ProtocolMessage,
}

impl Envelope {
    pub fn new(sender: AgentAddress, message: ProtocolMessage) -> Self {
        Self {
            sender,
            recipient: None,
            message,
        }
    }

    pub fn to(mut self, recipient: AgentAddress) -> Self {
        self.recipient = Some(recipient);
        self
    }
}
