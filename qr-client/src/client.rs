//! Reconnecting live order client
//!
//! 1. Connect to `/api/ws/orders/live?token=`
//! 2. Dispatch every [`LiveMessage`] to a [`LiveEventHandler`]
//! 3. Send a text `ping` keepalive
//! 4. Reconnect with exponential backoff until the attempt budget runs out

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use shared::live::LiveMessage;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{ClientError, ClientResult, LiveClientConfig};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receives live events; called from the client task
#[async_trait]
pub trait LiveEventHandler: Send + Sync {
    async fn on_message(&self, message: LiveMessage);

    /// The socket closed or failed; a reconnect may follow
    async fn on_connection_lost(&self) {}
}

/// Observable connection state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub is_connecting: bool,
    pub reconnect_attempts: u32,
    pub has_auth: bool,
    pub restaurant_id: Option<Uuid>,
}

#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Shutdown,
    Lost,
}

pub struct LiveClient {
    config: LiveClientConfig,
    status: watch::Sender<ConnectionStatus>,
}

impl LiveClient {
    pub fn new(config: LiveClientConfig) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self { config, status }
    }

    pub fn config(&self) -> &LiveClientConfig {
        &self.config
    }

    /// Subscribe to connection status changes
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    fn update(&self, f: impl FnOnce(&mut ConnectionStatus)) {
        self.status.send_modify(f);
    }

    /// Run until `shutdown` fires (`Ok`) or reconnects are exhausted
    pub async fn run<H: LiveEventHandler>(
        &self,
        token: &str,
        handler: &H,
        shutdown: CancellationToken,
    ) -> ClientResult<()> {
        let url = self.config.live_url(token)?;
        self.update(|s| s.has_auth = !token.is_empty());

        let mut attempts: u32 = 0;
        let result = loop {
            if shutdown.is_cancelled() {
                break Ok(());
            }

            self.update(|s| {
                s.is_connecting = true;
                s.reconnect_attempts = attempts;
            });

            let connected = tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                result = tokio_tungstenite::connect_async(url.as_str()) => result,
            };

            match connected {
                Ok((ws, _)) => {
                    attempts = 0;
                    self.update(|s| {
                        s.is_connected = true;
                        s.is_connecting = false;
                        s.reconnect_attempts = 0;
                    });
                    tracing::info!("Live order feed connected");

                    let end = self.run_session(ws, handler, &shutdown).await;
                    self.update(|s| s.is_connected = false);
                    if end == SessionEnd::Shutdown {
                        break Ok(());
                    }
                    tracing::warn!("Live order feed disconnected");
                    handler.on_connection_lost().await;
                }
                Err(e) => {
                    self.update(|s| s.is_connecting = false);
                    tracing::warn!(attempts, "Live order feed connection failed: {e}");
                }
            }

            if self.config.attempts_exhausted(attempts) {
                tracing::error!(attempts, "Live order feed: giving up on reconnect");
                break Err(ClientError::ReconnectExhausted { attempts });
            }
            attempts += 1;

            let delay = self.config.backoff_delay(attempts);
            tracing::info!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "Live order feed reconnecting"
            );
            tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                _ = tokio::time::sleep(delay) => {},
            }
        };

        self.update(|s| {
            s.is_connected = false;
            s.is_connecting = false;
            s.reconnect_attempts = attempts;
        });
        result
    }

    /// Run a single WebSocket session until disconnect or shutdown
    async fn run_session<H: LiveEventHandler>(
        &self,
        ws: WsStream,
        handler: &H,
        shutdown: &CancellationToken,
    ) -> SessionEnd {
        let (mut sink, mut stream) = ws.split();

        let mut ping_interval = tokio::time::interval(self.config.ping_interval);
        ping_interval.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    let _ = sink.close().await;
                    return SessionEnd::Shutdown;
                }

                _ = ping_interval.tick() => {
                    if sink.send(Message::Text("ping".into())).await.is_err() {
                        tracing::warn!("Live ping failed, disconnecting");
                        return SessionEnd::Lost;
                    }
                }

                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<LiveMessage>(text.as_str()) {
                                Ok(message) => {
                                    if let LiveMessage::ConnectionEstablished { restaurant_id, .. } = &message {
                                        let rid = *restaurant_id;
                                        self.update(|s| s.restaurant_id = Some(rid));
                                    }
                                    handler.on_message(message).await;
                                }
                                Err(e) => tracing::debug!("Ignoring undecodable live message: {e}"),
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => return SessionEnd::Lost,
                        Some(Err(e)) => {
                            tracing::warn!("Live WS receive error: {e}");
                            return SessionEnd::Lost;
                        }
                        // Pings are answered by tungstenite
                        _ => {}
                    }
                }
            }
        }
    }
}
