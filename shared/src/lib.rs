//! Shared types for the QR-ordering platform
//!
//! Common types used by the API server and the dashboard client:
//! error codes and envelope, domain models, order lifecycle rules and
//! the live WebSocket protocol.

pub mod error;
pub mod live;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode, ErrorResponse};
pub use http;
pub use serde::{Deserialize, Serialize};
