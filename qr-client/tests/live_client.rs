// qr-client/tests/live_client.rs
// Live client and REST client against an in-process axum server

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::SinkExt;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use chrono::Utc;
use qr_client::{ApiClient, ClientError, LiveClient, LiveClientConfig, LiveEventHandler, OrderQuery};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::live::LiveMessage;
use shared::models::{AuthResponse, Order, Token, User, UserRole};
use shared::order::{OrderStatus, PaymentMethod, PaymentStatus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const LIVE_PATH: &str = "/api/ws/orders/live";

#[derive(Debug, PartialEq)]
enum Event {
    Message(&'static str),
    Lost,
}

struct Recorder {
    tx: mpsc::UnboundedSender<Event>,
}

#[async_trait]
impl LiveEventHandler for Recorder {
    async fn on_message(&self, message: LiveMessage) {
        let _ = self.tx.send(Event::Message(message.kind()));
    }

    async fn on_connection_lost(&self) {
        let _ = self.tx.send(Event::Lost);
    }
}

fn sample_order(restaurant_id: Uuid) -> Order {
    let now = Utc::now();
    Order {
        id: Uuid::new_v4(),
        restaurant_id,
        order_number: "ORD-240501120000-AB12".into(),
        table_number: 7,
        customer_name: "Ana".into(),
        customer_phone: "+15551234567".into(),
        order_status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: PaymentMethod::Cash,
        total_price: Decimal::new(1999, 2),
        estimated_time: Some(12),
        created_at: now,
        updated_at: now,
        items: vec![],
    }
}

async fn spawn_server(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn fast_config(addr: SocketAddr) -> LiveClientConfig {
    LiveClientConfig::new(format!("http://{addr}"))
        .with_reconnect_delay(Duration::from_millis(10))
        .with_max_reconnect_delay(Duration::from_millis(20))
        .with_ping_interval(Duration::from_millis(50))
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for live event")
        .expect("handler dropped")
}

/// Sends the greeting and one order, answers the first client ping, then closes
async fn scripted_session(mut socket: WebSocket, restaurant_id: Uuid) {
    let greeting = serde_json::to_string(&LiveMessage::connection_established(restaurant_id)).unwrap();
    let created =
        serde_json::to_string(&LiveMessage::order_created(&sample_order(restaurant_id))).unwrap();
    socket.send(Message::Text(greeting.into())).await.unwrap();
    socket.send(Message::Text(created.into())).await.unwrap();

    while let Some(Ok(msg)) = socket.recv().await {
        if let Message::Text(text) = msg
            && text.as_str() == "ping"
        {
            let pong = serde_json::to_string(&LiveMessage::pong()).unwrap();
            let _ = socket.send(Message::Text(pong.into())).await;
            break;
        }
    }
    let _ = socket.close().await;
}

#[tokio::test]
async fn test_dispatches_events_then_reports_lost_connection() {
    let restaurant_id = Uuid::new_v4();
    let app = Router::new().route(
        LIVE_PATH,
        any(move |ws: WebSocketUpgrade| async move {
            ws.on_upgrade(move |socket| scripted_session(socket, restaurant_id))
        }),
    );
    let addr = spawn_server(app).await;

    // Long backoff so the test cancels while waiting to reconnect
    let config = fast_config(addr).with_reconnect_delay(Duration::from_secs(10));
    let client = Arc::new(LiveClient::new(config));
    let status = client.status();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();

    let task = {
        let client = client.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { client.run("tok", &Recorder { tx }, shutdown).await })
    };

    assert_eq!(next_event(&mut rx).await, Event::Message("connection_established"));
    assert_eq!(status.borrow().restaurant_id, Some(restaurant_id));
    assert!(status.borrow().has_auth);
    assert_eq!(next_event(&mut rx).await, Event::Message("order_created"));
    assert_eq!(next_event(&mut rx).await, Event::Message("pong"));
    assert_eq!(next_event(&mut rx).await, Event::Lost);

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert!(!status.borrow().is_connected);
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    // Nothing listens on this port once the listener is dropped
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LiveClient::new(fast_config(addr).with_max_reconnect_attempts(2));
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        client.run("tok", &Recorder { tx }, CancellationToken::new()),
    )
    .await
    .unwrap();

    assert!(matches!(
        result,
        Err(ClientError::ReconnectExhausted { attempts: 2 })
    ));
    let status = client.status();
    assert!(!status.borrow().is_connected);
    assert_eq!(status.borrow().reconnect_attempts, 2);
}

#[tokio::test]
async fn test_successful_connect_resets_attempt_counter() {
    let connections = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            LIVE_PATH,
            any(
                |State(count): State<Arc<AtomicUsize>>, ws: WebSocketUpgrade| async move {
                    count.fetch_add(1, Ordering::SeqCst);
                    ws.on_upgrade(|mut socket| async move {
                        let _ = socket.close().await;
                    })
                },
            ),
        )
        .with_state(connections.clone());
    let addr = spawn_server(app).await;

    // A budget of one would stop after the second drop without the reset
    let client = Arc::new(LiveClient::new(
        fast_config(addr).with_max_reconnect_attempts(1),
    ));
    let (tx, _rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let task = {
        let client = client.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { client.run("tok", &Recorder { tx }, shutdown).await })
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        while connections.load(Ordering::SeqCst) < 4 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("client stopped reconnecting");

    shutdown.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

// ========== REST ==========

fn auth_response() -> AuthResponse {
    let user_id = Uuid::new_v4();
    let restaurant_id = Uuid::new_v4();
    AuthResponse {
        message: "Login successful".into(),
        user: User {
            id: user_id,
            email: "owner@example.com".into(),
            restaurant_id: Some(restaurant_id),
            role: UserRole::Owner,
            is_active: true,
            created_at: Utc::now(),
        },
        token: Token {
            access_token: "issued-token".into(),
            token_type: "bearer".into(),
            expires_in: 1800,
            user_id,
            restaurant_id,
        },
    }
}

async fn orders_requiring_token(headers: HeaderMap) -> axum::response::Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer issued-token");
    if authorized {
        Json(vec![sample_order(Uuid::new_v4())]).into_response()
    } else {
        AppError::not_authenticated().into_response()
    }
}

#[tokio::test]
async fn test_api_client_login_then_list_orders() {
    let app = Router::new()
        .route("/api/auth/login", post(|| async { Json(auth_response()) }))
        .route("/api/orders", get(orders_requiring_token));
    let addr = spawn_server(app).await;

    let mut api = ApiClient::new(&LiveClientConfig::new(format!("http://{addr}"))).unwrap();

    let err = api.orders(&OrderQuery::default()).await.unwrap_err();
    match err {
        ClientError::Api { status, code, .. } => {
            assert_eq!(status, 401);
            assert_eq!(code, ErrorCode::NotAuthenticated.code());
        }
        other => panic!("unexpected error: {other}"),
    }

    let auth = api.login("owner@example.com", "Secret123").await.unwrap();
    assert_eq!(auth.token.access_token, "issued-token");
    assert_eq!(api.token(), Some("issued-token"));

    let orders = api.orders(&OrderQuery::default()).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_price, Decimal::new(1999, 2));
}

#[tokio::test]
async fn test_api_client_non_envelope_error() {
    let app = Router::new().route(
        "/api/orders",
        get(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
    );
    let addr = spawn_server(app).await;

    let api = ApiClient::new(&LiveClientConfig::new(format!("http://{addr}")))
        .unwrap()
        .with_token("t");
    let err = api.orders(&OrderQuery::default()).await.unwrap_err();
    match err {
        ClientError::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 502);
            assert_eq!(code, 0);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected error: {other}"),
    }
}
