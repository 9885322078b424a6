//! Chat protocol handlers: user messages and acknowledgements.

use std::sync::Arc;
use tokio::sync::mpsc;

use super::protocol::{ChatAcknowledgement, ChatContent, ChatMessage, Envelope, ProtocolMessage};
use crate::conversation::QueryResponder;
use crate::types::{AgentAddress, Error, Result};

/// Outbound envelopes produced while handling one inbound envelope.
pub type Outbox = mpsc::Sender<Envelope>;

/// Handles the chat protocol on behalf of this agent.
#[derive(Clone)]
pub struct ChatHandler {
    address: AgentAddress,
    responder: Arc<dyn QueryResponder>,
}

impl std::fmt::Debug for ChatHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHandler")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl ChatHandler {
    pub fn new(address: AgentAddress, responder: Arc<dyn QueryResponder>) -> Self {
        Self { address, responder }
    }

    pub fn address(&self) -> &AgentAddress {
        &self.address
    }

    /// Route an inbound envelope to the matching handler.
    pub async fn handle_envelope(&self, envelope: Envelope, outbox: &Outbox) -> Result<()> {
        match envelope.message {
            ProtocolMessage::ChatMessage(msg) => {
                self.on_message(&envelope.sender, msg, outbox).await;
                Ok(())
            }
            ProtocolMessage::ChatAcknowledgement(ack) => {
                self.handle_acknowledgement(&envelope.sender, &ack);
                Ok(())
            }
        }
    }

    /// Handle a chat message, answering with an error text if replying fails midway.
    pub async fn on_message(&self, sender: &AgentAddress, msg: ChatMessage, outbox: &Outbox) {
        if let Err(e) = self.handle_message(sender, msg, outbox).await {
            tracing::error!("Error handling chat message: {}", e);
            let reply = ChatMessage::text(format!("An error occurred: {}", e));
            if self.send(sender, ProtocolMessage::ChatMessage(reply), outbox).await.is_err() {
                tracing::warn!("Could not deliver error reply to {}", sender);
            }
        }
    }

    /// Acknowledge, then answer every text item in order.
    pub async fn handle_message(
        &self,
        sender: &AgentAddress,
        msg: ChatMessage,
        outbox: &Outbox,
    ) -> Result<()> {
        let ack = ChatAcknowledgement::for_message(&msg.msg_id);
        self.send(sender, ProtocolMessage::ChatAcknowledgement(ack), outbox)
            .await?;

        for item in msg.content {
            match item {
                ChatContent::StartSession => {
                    tracing::info!("Got a start session message from {}", sender);
                }
                ChatContent::Text { text } => {
                    tracing::info!("Got a message from {}: {}", sender, text);
                    let answer = self.responder.respond(&text).await;
                    tracing::info!("Response text: {}", answer);
                    self.send(
                        sender,
                        ProtocolMessage::ChatMessage(ChatMessage::text(answer)),
                        outbox,
                    )
                    .await?;
                }
                ChatContent::EndSession => {
                    tracing::info!("Session ended by {}", sender);
                }
                other => {
                    tracing::info!("Got unexpected content from {}: {:?}", sender, other);
                }
            }
        }
        Ok(())
    }

    /// Log an acknowledgement. Nothing is sent back.
    pub fn handle_acknowledgement(&self, sender: &AgentAddress, ack: &ChatAcknowledgement) {
        tracing::info!(
            "Received acknowledgement from {} for message {}",
            sender,
            ack.acknowledged_msg_id
        );
        if let Some(metadata) = &ack.metadata {
            tracing::info!("Metadata: {:?}", metadata);
        }
    }

    async fn send(
        &self,
        recipient: &AgentAddress,
        message: ProtocolMessage,
        outbox: &Outbox,
    ) -> Result<()> {
        let envelope = Envelope::new(self.address.clone(), message).to(recipient.clone());
        outbox
            .send(envelope)
            .await
            .map_err(|_| Error::internal("outbox closed"))
    }
}
