//! Live order WebSocket protocol
//!
//! Server → Dashboard: [`LiveMessage`]
//! Dashboard → Server: [`LiveCommand`] (or the bare text `ping`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Order;

pub const CONNECTED_MESSAGE: &str = "Connected to real-time order updates";
pub const PONG_MESSAGE: &str = "Connection is alive";

/// Server → Dashboard push
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// Sent once right after the upgrade
    ConnectionEstablished { restaurant_id: Uuid, message: String },

    /// A customer placed a new order
    OrderCreated {
        order: Box<Order>,
        timestamp: DateTime<Utc>,
    },

    /// Order or payment status changed from the dashboard
    OrderStatusChanged {
        order: Box<Order>,
        timestamp: DateTime<Utc>,
    },

    /// Reply to a client ping
    Pong { message: String },
}

impl LiveMessage {
    pub fn connection_established(restaurant_id: Uuid) -> Self {
        Self::ConnectionEstablished {
            restaurant_id,
            message: CONNECTED_MESSAGE.to_string(),
        }
    }

    pub fn order_created(order: &Order) -> Self {
        Self::OrderCreated {
            timestamp: order.last_changed_at(),
            order: Box::new(order.clone()),
        }
    }

    pub fn order_status_changed(order: &Order) -> Self {
        Self::OrderStatusChanged {
            timestamp: order.last_changed_at(),
            order: Box::new(order.clone()),
        }
    }

    pub fn pong() -> Self {
        Self::Pong {
            message: PONG_MESSAGE.to_string(),
        }
    }

    /// Wire name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionEstablished { .. } => "connection_established",
            Self::OrderCreated { .. } => "order_created",
            Self::OrderStatusChanged { .. } => "order_status_changed",
            Self::Pong { .. } => "pong",
        }
    }
}

/// Dashboard → Server command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveCommand {
    Ping,
}

impl LiveCommand {
    /// Accepts the bare text `ping` as well as the JSON form
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().eq_ignore_ascii_case("ping") {
            return Some(Self::Ping);
        }
        serde_json::from_str(text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderStatus, PaymentMethod, PaymentStatus};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn sample_order() -> Order {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Order {
            id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            order_number: "ORD-240501120000-AB12".into(),
            table_number: 4,
            customer_name: "Ana".into(),
            customer_phone: "+15551234567".into(),
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cash,
            total_price: Decimal::new(2198, 2),
            estimated_time: Some(14),
            created_at: created,
            updated_at: created + chrono::Duration::minutes(3),
            items: vec![],
        }
    }

    #[test]
    fn test_order_created_envelope() {
        let order = sample_order();
        let json = serde_json::to_value(LiveMessage::order_created(&order)).unwrap();

        assert_eq!(json["type"], "order_created");
        assert_eq!(json["order"]["order_status"], "pending");
        assert_eq!(json["order"]["payment_method"], "cash");
        assert_eq!(json["order"]["total_price"], 21.98);
        assert_eq!(
            json["timestamp"],
            serde_json::to_value(order.updated_at).unwrap()
        );
    }

    #[test]
    fn test_round_trip_status_changed() {
        let order = sample_order();
        let text = serde_json::to_string(&LiveMessage::order_status_changed(&order)).unwrap();
        let back: LiveMessage = serde_json::from_str(&text).unwrap();
        match back {
            LiveMessage::OrderStatusChanged { order: o, .. } => assert_eq!(o.id, order.id),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn test_connection_established_shape() {
        let rid = Uuid::new_v4();
        let json = serde_json::to_value(LiveMessage::connection_established(rid)).unwrap();
        assert_eq!(json["type"], "connection_established");
        assert_eq!(json["restaurant_id"], rid.to_string());
        assert_eq!(json["message"], CONNECTED_MESSAGE);
    }

    #[test]
    fn test_ping_forms() {
        assert!(matches!(LiveCommand::parse("ping"), Some(LiveCommand::Ping)));
        assert!(matches!(
            LiveCommand::parse(r#"{"type":"ping"}"#),
            Some(LiveCommand::Ping)
        ));
        assert!(LiveCommand::parse("hello").is_none());
    }
}
