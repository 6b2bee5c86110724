//! Customer Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Guest who ordered at least once, unique per (restaurant, phone)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CustomerProfile {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub phone_number: String,
    pub name: String,
    pub last_order_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
