//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::order::{OrderStatus, PaymentMethod, PaymentStatus};

pub const ORDER_CONFIRMATION_MESSAGE: &str =
    "Your order has been sent to the kitchen and is being prepared!";
pub const ORDER_PAYMENT_MESSAGE: &str =
    "Payment will be collected by our staff when your order is ready. We accept cash payments.";

/// Order entity with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub order_number: String,
    pub table_number: i32,
    pub customer_name: String,
    pub customer_phone: String,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub order_status: OrderStatus,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_status: PaymentStatus,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
    pub estimated_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Timestamp of the last change, used to stamp live events
    pub fn last_changed_at(&self) -> DateTime<Utc> {
        self.updated_at.max(self.created_at)
    }

    pub fn items_count(&self) -> i32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// Order line with the unit price captured at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Line of a customer order
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemCreate {
    pub menu_item_id: Uuid,
    #[validate(range(min = 1, max = 99))]
    pub quantity: i32,
}

/// Customer order submitted from the table QR page
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub restaurant_id: Uuid,
    #[validate(range(min = 1, max = 999))]
    pub table_number: i32,
    #[validate(length(min = 2, max = 100))]
    pub customer_name: String,
    pub customer_phone: String,
    #[validate(length(min = 1, max = 50), nested)]
    pub items: Vec<OrderItemCreate>,
    pub total_price: Decimal,
}

/// Dashboard order update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// Response to a successful customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmation {
    #[serde(flatten)]
    pub order: Order,
    pub confirmation_message: String,
    pub payment_message: String,
    pub kitchen_notification_sent: bool,
}

impl OrderConfirmation {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            confirmation_message: ORDER_CONFIRMATION_MESSAGE.to_string(),
            payment_message: ORDER_PAYMENT_MESSAGE.to_string(),
            kitchen_notification_sent: true,
        }
    }
}
