//! QR Client - dashboard-side client for qr-cloud
//!
//! - [`ApiClient`]: REST calls (auth, orders)
//! - [`LiveClient`]: reconnecting live order WebSocket
//! - [`DashboardFeed`]: recent orders and counters fed by live events

pub mod client;
pub mod config;
pub mod error;
pub mod feed;
pub mod http;

pub use client::{ConnectionStatus, LiveClient, LiveEventHandler};
pub use config::LiveClientConfig;
pub use error::{ClientError, ClientResult};
pub use feed::{DashboardFeed, OrderSummary, SharedFeed};
pub use http::{ApiClient, OrderQuery};

// Re-export the wire protocol for handlers
pub use shared::live::LiveMessage;
