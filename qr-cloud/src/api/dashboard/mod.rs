//! Owner dashboard endpoints (JWT authenticated)

pub mod analytics;
pub mod menu;
