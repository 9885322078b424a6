//! Client for talking to a running agent over the framed TCP protocol.

use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::chat::{ChatContent, ChatMessage, Envelope, ProtocolMessage};
use crate::transport::codec::{
    decode_json, read_frame, write_json, MSG_END, MSG_ENVELOPE, MSG_ERROR, MSG_REPLY,
};
use crate::types::{AgentAddress, Error, Result, TransportConfig};

/// Sends envelopes to an agent and collects its replies.
#[derive(Debug, Clone)]
pub struct AgentClient {
    addr: SocketAddr,
    sender: AgentAddress,
    max_frame_bytes: u32,
    timeout: Duration,
}

impl AgentClient {
    pub fn new(addr: SocketAddr, sender: AgentAddress, config: &TransportConfig) -> Self {
        Self {
            addr,
            sender,
            max_frame_bytes: config.max_frame_bytes,
            timeout: Duration::from_secs(config.read_timeout_secs),
        }
    }

    pub fn sender(&self) -> &AgentAddress {
        &self.sender
    }

    /// Send one envelope and return every reply up to the end marker.
    pub async fn send(&self, envelope: &Envelope) -> Result<Vec<Envelope>> {
        tokio::time::timeout(self.timeout, self.exchange(envelope))
            .await
            .map_err(|_| Error::timeout(format!("no end of replies from {}", self.addr)))?
    }

    async fn exchange(&self, envelope: &Envelope) -> Result<Vec<Envelope>> {
        let mut stream = TcpStream::connect(self.addr).await?;
        write_json(&mut stream, MSG_ENVELOPE, envelope).await?;

        let mut replies = Vec::new();
        loop {
            let (msg_type, payload) = read_frame(&mut stream, self.max_frame_bytes)
                .await?
                .ok_or_else(|| Error::internal("connection closed before end of replies"))?;

            match msg_type {
                MSG_REPLY => replies.push(decode_json(&payload)?),
                MSG_END => return Ok(replies),
                MSG_ERROR => {
                    let body: Value = decode_json(&payload)?;
                    let code = body.get("code").and_then(Value::as_str).unwrap_or("UNKNOWN");
                    let message = body.get("message").and_then(Value::as_str).unwrap_or("");
                    tracing::warn!(code, "Agent returned error: {}", message);
                    return Err(Error::internal(format!("{}: {}", code, message)));
                }
                other => {
                    return Err(Error::internal(format!(
                        "Unexpected message type: 0x{:02X}",
                        other
                    )))
                }
            }
        }
    }

    /// Ask a question as a chat message and return the text of every reply.
    pub async fn ask(&self, text: &str) -> Result<Vec<String>> {
        let envelope = Envelope::new(
            self.sender.clone(),
            ProtocolMessage::ChatMessage(ChatMessage::text(text)),
        );
        let replies = self.send(&envelope).await?;

        Ok(replies
            .into_iter()
            .filter_map(|env| match env.message {
                ProtocolMessage::ChatMessage(msg) => Some(msg.content),
                ProtocolMessage::ChatAcknowledgement(_) => None,
            })
            .flatten()
            .filter_map(|item| match item {
                ChatContent::Text { text } => Some(text),
                _ => None,
            })
            .collect())
    }
}
