//! TCP agent server: accept loop and per-connection handler.

use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::chat::{ChatHandler, Envelope};
use crate::transport::codec::{
    decode_json, read_frame, write_json, MSG_END, MSG_ENVELOPE, MSG_ERROR, MSG_REPLY,
};
use crate::types::{Error, TransportConfig};

/// Serves the chat protocol over framed TCP.
#[derive(Debug)]
pub struct AgentServer {
    handler: ChatHandler,
    addr: SocketAddr,
    cancel: CancellationToken,
    config: TransportConfig,
}

impl AgentServer {
    pub fn new(handler: ChatHandler, addr: SocketAddr, config: TransportConfig) -> Self {
        Self {
            handler,
            addr,
            cancel: CancellationToken::new(),
            config,
        }
    }

    /// Bind the configured address and serve until cancelled.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_listener(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let conn_semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        tracing::info!(
            "Agent {} listening on {} (max_connections={})",
            self.handler.address(),
            listener.local_addr()?,
            self.config.max_connections,
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Agent server shutting down");
                    break;
                }
                accept = listener.accept() => {
                    let (stream, peer) = accept?;

                    let permit = match conn_semaphore.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::warn!(
                                "Connection from {} rejected: at max_connections ({})",
                                peer,
                                self.config.max_connections,
                            );
                            drop(stream);
                            continue;
                        }
                    };

                    tracing::debug!(
                        "Connection from {} (active={})",
                        peer,
                        self.config.max_connections - conn_semaphore.available_permits(),
                    );
                    let handler = self.handler.clone();
                    let cancel = self.cancel.clone();
                    let config = self.config.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, handler, cancel, config, permit).await {
                            tracing::warn!("Connection from {} error: {}", peer, e);
                        }
                    });
                }
            }
        }
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Token cancelled on shutdown, for wiring to signal handlers.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Read envelopes, run the chat handler, stream its replies, end each batch with `MSG_END`.
async fn handle_connection(
    stream: TcpStream,
    handler: ChatHandler,
    cancel: CancellationToken,
    config: TransportConfig,
    _permit: OwnedSemaphorePermit,
) -> std::io::Result<()> {
    let (mut reader, mut writer) = stream.into_split();
    let read_timeout = Duration::from_secs(config.read_timeout_secs);
    let write_timeout = Duration::from_secs(config.write_timeout_secs);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame_result = tokio::time::timeout(read_timeout, read_frame(&mut reader, config.max_frame_bytes)) => {
                let (msg_type, payload) = match frame_result {
                    Err(_elapsed) => {
                        tracing::debug!("Read timeout ({}s), dropping connection", config.read_timeout_secs);
                        break;
                    }
                    Ok(result) => match result? {
                        Some(frame) => frame,
                        None => break,
                    },
                };

                if msg_type != MSG_ENVELOPE {
                    let err = Error::validation(format!("Unexpected message type: 0x{:02X}", msg_type));
                    write_error(&mut writer, &err, write_timeout).await?;
                    continue;
                }

                let envelope: Envelope = match decode_json(&payload) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        let err = Error::validation(format!("Invalid envelope: {}", e));
                        write_error(&mut writer, &err, write_timeout).await?;
                        continue;
                    }
                };

                let (tx, mut rx) = mpsc::channel(config.outbox_capacity.max(1));
                let handler = handler.clone();
                let task = tokio::spawn(async move { handler.handle_envelope(envelope, &tx).await });

                let mut cancelled = false;
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            task.abort();
                            cancelled = true;
                            break;
                        }
                        reply = rx.recv() => match reply {
                            Some(reply) => timed_write(&mut writer, MSG_REPLY, &reply, write_timeout).await?,
                            None => break,
                        },
                    }
                }
                if cancelled {
                    tracing::debug!("Shutdown while handling an envelope, closing connection");
                    break;
                }

                match task.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => write_error(&mut writer, &e, write_timeout).await?,
                    Err(join) => {
                        let err = Error::internal(format!("handler task failed: {}", join));
                        write_error(&mut writer, &err, write_timeout).await?;
                    }
                }
                timed_write(&mut writer, MSG_END, &json!({}), write_timeout).await?;
            }
        }
    }

    Ok(())
}

async fn write_error<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    error: &Error,
    timeout: Duration,
) -> std::io::Result<()> {
    tracing::warn!("Sending error frame: {}", error);
    let payload = json!({
        "code": error.to_error_code(),
        "message": error.to_string(),
    });
    timed_write(writer, MSG_ERROR, &payload, timeout).await
}

/// Write a frame, failing if the peer does not drain it within `timeout`.
async fn timed_write<W, T>(
    writer: &mut W,
    msg_type: u8,
    value: &T,
    timeout: Duration,
) -> std::io::Result<()>
where
    W: tokio::io::AsyncWriteExt + Unpin,
    T: serde::Serialize + ?Sized,
{
    tokio::time::timeout(timeout, write_json(writer, msg_type, value))
        .await
        .map_err(|_| {
            tracing::warn!("Write timeout ({}s), dropping connection", timeout.as_secs());
            std::io::Error::new(std::io::ErrorKind::TimedOut, "write timeout")
        })?
}
