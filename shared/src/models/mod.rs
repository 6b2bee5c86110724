//! Data models
//!
//! Shared between qr-cloud and qr-client (via the HTTP API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDs; money is `Decimal` serialized as a JSON number.

pub mod analytics;
pub mod auth;
pub mod customer;
pub mod menu_item;
pub mod order;
pub mod restaurant;
pub mod user;

// Re-exports
pub use analytics::*;
pub use auth::*;
pub use customer::*;
pub use menu_item::*;
pub use order::*;
pub use restaurant::*;
pub use user::*;
