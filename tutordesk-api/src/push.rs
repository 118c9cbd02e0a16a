//! Push subscriber - listens for "data updated" signals from the backend.
//!
//! The backend runs a Socket.IO server. This module speaks just enough of
//! Engine.IO v4 / Socket.IO v5 over a raw WebSocket to join the default
//! namespace, answer heartbeats, and forward `data_updated` events:
//!
//! ```text
//! server: 0{"sid":"..","pingInterval":25000,"pingTimeout":20000}
//! client: 40
//! server: 40{"sid":".."}
//! server: 2                      (ping)   -> client: 3 (pong)
//! server: 42["data_updated",{"module":"bookings"}]
//! ```

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use tutordesk_types::{SyncModule, UnknownModule};

/// Name of the Socket.IO event announcing a changed module.
pub const DATA_UPDATED_EVENT: &str = "data_updated";

/// Payload of a `data_updated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSignal {
    pub module: String,
}

impl PushSignal {
    pub fn module(&self) -> Result<SyncModule, UnknownModule> {
        self.module.parse()
    }
}

/// Engine.IO transport packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(Value),
    Close,
    Ping,
    Pong,
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// Socket.IO packet carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect,
    Disconnect,
    Event { name: String, payload: Value },
    Ack,
    ConnectError(String),
}

/// Parses one Engine.IO text frame. Returns `None` for malformed frames.
pub fn parse_frame(frame: &str) -> Option<EnginePacket> {
    let mut chars = frame.chars();
    let kind = chars.next()?;
    let rest = chars.as_str();
    match kind {
        '0' => Some(EnginePacket::Open(
            serde_json::from_str(rest).unwrap_or(Value::Null),
        )),
        '1' => Some(EnginePacket::Close),
        '2' => Some(EnginePacket::Ping),
        '3' => Some(EnginePacket::Pong),
        '4' => parse_socket_packet(rest).map(EnginePacket::Message),
        '5' => Some(EnginePacket::Upgrade),
        '6' => Some(EnginePacket::Noop),
        _ => None,
    }
}

fn parse_socket_packet(packet: &str) -> Option<SocketPacket> {
    let mut chars = packet.chars();
    let kind = chars.next()?;
    let mut rest = chars.as_str();

    // Optional namespace ("/admin,") and ack id digits precede the data
    if rest.starts_with('/') {
        rest = rest.split_once(',').map_or("", |(_, data)| data);
    }
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());

    match kind {
        '0' => Some(SocketPacket::Connect),
        '1' => Some(SocketPacket::Disconnect),
        '2' => {
            let mut args: Vec<Value> = serde_json::from_str(rest).ok()?;
            if args.is_empty() {
                return None;
            }
            let name = args.remove(0).as_str()?.to_string();
            let payload = if args.is_empty() {
                Value::Null
            } else {
                args.remove(0)
            };
            Some(SocketPacket::Event { name, payload })
        }
        '3' => Some(SocketPacket::Ack),
        '4' => {
            let message = serde_json::from_str::<Value>(rest)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| rest.to_string());
            Some(SocketPacket::ConnectError(message))
        }
        _ => None,
    }
}

/// Push subscriber - receives module invalidation signals.
pub struct PushSubscriber {
    endpoint: String,
    reconnect_delay: Duration,
    max_reconnect_attempts: u32,
    signal_tx: broadcast::Sender<PushSignal>,
    shutdown_tx: broadcast::Sender<()>,
}

impl PushSubscriber {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let (signal_tx, _) = broadcast::channel(256);
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            endpoint: config.push_endpoint()?,
            reconnect_delay: Duration::from_secs(config.reconnect_delay_secs),
            max_reconnect_attempts: config.max_reconnect_attempts,
            signal_tx,
            shutdown_tx,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get a receiver for push signals
    pub fn subscribe(&self) -> broadcast::Receiver<PushSignal> {
        self.signal_tx.subscribe()
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Runs until shutdown or until reconnect attempts are exhausted.
    pub async fn run(&self) {
        let mut reconnect_attempts = 0u32;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            if shutdown_rx.try_recv().is_ok() {
                info!("push subscriber shutting down");
                break;
            }

            info!("connecting to push server at {}", self.endpoint);

            match self.connect_and_listen().await {
                Ok(()) => {
                    reconnect_attempts = 0;
                }
                Err(e) => {
                    error!("push connection error: {e}");
                    reconnect_attempts += 1;

                    if self.max_reconnect_attempts > 0
                        && reconnect_attempts >= self.max_reconnect_attempts
                    {
                        error!(
                            "max reconnection attempts ({}) reached, stopping push subscriber",
                            self.max_reconnect_attempts
                        );
                        break;
                    }
                }
            }

            info!(
                "reconnecting in {:?} (attempt {})",
                self.reconnect_delay, reconnect_attempts
            );

            tokio::select! {
                _ = sleep(self.reconnect_delay) => {}
                _ = shutdown_rx.recv() => {
                    info!("shutdown received during reconnect wait");
                    break;
                }
            }
        }

        info!("push subscriber stopped");
    }

    /// Connects once and forwards signals until the server goes away.
    ///
    /// Returns `Ok` on shutdown or a clean close.
    async fn connect_and_listen(&self) -> ApiResult<()> {
        let (ws_stream, _) = connect_async(self.endpoint.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    let _ = write.send(Message::Text("41".into())).await;
                    let _ = write.close().await;
                    return Ok(());
                }
                frame = read.next() => {
                    let text = match frame {
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(_))) | None => {
                            info!("push server closed the connection");
                            return Ok(());
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                    };

                    match parse_frame(&text) {
                        Some(EnginePacket::Open(handshake)) => {
                            debug!("engine.io handshake: {handshake}");
                            write.send(Message::Text("40".into())).await?;
                        }
                        Some(EnginePacket::Ping) => {
                            write.send(Message::Text("3".into())).await?;
                        }
                        Some(EnginePacket::Close) => return Ok(()),
                        Some(EnginePacket::Message(SocketPacket::Connect)) => {
                            info!("joined push namespace");
                        }
                        Some(EnginePacket::Message(SocketPacket::Disconnect)) => {
                            return Err(ApiError::Push("server disconnected the namespace".into()));
                        }
                        Some(EnginePacket::Message(SocketPacket::ConnectError(message))) => {
                            return Err(ApiError::Push(message));
                        }
                        Some(EnginePacket::Message(SocketPacket::Event { name, payload })) => {
                            self.forward(&name, payload);
                        }
                        Some(_) => {}
                        None => warn!("ignoring malformed push frame: {text}"),
                    }
                }
            }
        }
    }

    fn forward(&self, name: &str, payload: Value) {
        if name != DATA_UPDATED_EVENT {
            debug!("ignoring push event {name}");
            return;
        }
        match serde_json::from_value::<PushSignal>(payload) {
            Ok(signal) => {
                debug!("data updated: {}", signal.module);
                // No receivers is fine; nobody is watching yet
                let _ = self.signal_tx.send(signal);
            }
            Err(e) => warn!("malformed {DATA_UPDATED_EVENT} payload: {e}"),
        }
    }
}
