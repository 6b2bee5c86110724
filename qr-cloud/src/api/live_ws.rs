//! Live order WebSocket endpoint
//!
//! GET /api/ws/orders/live?token=<JWT>
//! Auth: JWT in the query string (browser WebSocket cannot set headers)
//!
//! Protocol:
//! - Server → Dashboard: LiveMessage (connection_established, order_created,
//!   order_status_changed, pong)
//! - Dashboard → Server: text `ping` or `{"type":"ping"}`

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::live::{LiveCommand, LiveMessage};
use tokio::time::Duration;
use uuid::Uuid;

use super::extract::AppQuery;
use crate::auth::OwnerIdentity;
use crate::auth::token::verify_token;
use crate::state::AppState;

pub const SERVER_PING_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct WsAuthQuery {
    token: Option<String>,
}

/// Restaurant of a verified `?token=` JWT
///
/// Runs before `WebSocketUpgrade` so bad credentials get a 401 envelope
/// instead of an upgrade error.
pub struct LiveAuth {
    pub restaurant_id: Uuid,
}

impl FromRequestParts<AppState> for LiveAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AppQuery(query) = AppQuery::<WsAuthQuery>::from_request_parts(parts, state).await?;
        let token = query
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::with_message(ErrorCode::NotAuthenticated, "Missing token"))?;

        let claims = verify_token(&token, &state.jwt_secret).inspect_err(|e| {
            tracing::debug!("Live WS JWT validation failed: {e}");
        })?;

        Ok(Self {
            restaurant_id: claims.restaurant_id,
        })
    }
}

/// GET /api/ws/orders/live?token=<JWT>
pub async fn handle_live_ws(
    State(state): State<AppState>,
    auth: LiveAuth,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let restaurant_id = auth.restaurant_id;
    ws.on_upgrade(move |socket| live_ws_session(socket, state, restaurant_id))
}

async fn live_ws_session(socket: WebSocket, state: AppState, restaurant_id: Uuid) {
    let (mut sink, mut stream) = socket.split();

    let (connection_id, mut outbound) = state.connections.connect(restaurant_id);
    state
        .connections
        .send_personal(connection_id, &LiveMessage::connection_established(restaurant_id));

    let mut ping_interval = tokio::time::interval(SERVER_PING_INTERVAL);
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }

            payload = outbound.recv() => {
                match payload {
                    Some(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    // Pruned by the manager (slow consumer)
                    None => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match LiveCommand::parse(text.as_str()) {
                        Some(LiveCommand::Ping) => {
                            state.connections.send_personal(connection_id, &LiveMessage::pong());
                        }
                        None => {
                            tracing::debug!(connection_id, "Ignoring unknown live command");
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(connection_id, "Live WS receive error: {e}");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.connections.disconnect(connection_id);
}

#[derive(Debug, Serialize)]
pub struct LiveStatus {
    pub restaurant_id: Uuid,
    pub active_connections: usize,
    pub realtime_service_running: bool,
    pub total_system_connections: usize,
}

/// GET /api/ws/orders/live/status
pub async fn live_status(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
) -> Json<LiveStatus> {
    Json(LiveStatus {
        restaurant_id: identity.restaurant_id,
        active_connections: state.connections.connection_count(identity.restaurant_id),
        realtime_service_running: true,
        total_system_connections: state.connections.total_connections(),
    })
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub running: bool,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStats {
    pub restaurant_connections: usize,
    pub connected_restaurants: usize,
    pub total_connections: usize,
    pub realtime_service_status: ServiceStatus,
}

/// GET /api/ws/orders/live/connections
pub async fn live_connections(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
) -> Json<ConnectionStats> {
    Json(ConnectionStats {
        restaurant_connections: state.connections.connection_count(identity.restaurant_id),
        connected_restaurants: state.connections.connected_restaurants(),
        total_connections: state.connections.total_connections(),
        realtime_service_status: ServiceStatus { running: true },
    })
}
