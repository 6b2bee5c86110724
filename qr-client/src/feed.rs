//! Dashboard feed: recent orders and running counters kept from live events

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::live::LiveMessage;
use shared::models::Order;
use shared::order::{OrderStatus, PaymentStatus};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::LiveEventHandler;

/// Number of orders kept in the recent list
pub const RECENT_ORDERS_LIMIT: usize = 10;

/// Row of the recent orders list
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub table_number: i32,
    pub customer_name: String,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub total_price: Decimal,
    pub items_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            table_number: order.table_number,
            customer_name: order.customer_name.clone(),
            order_status: order.order_status,
            payment_status: order.payment_status,
            total_price: order.total_price,
            items_count: order.items_count(),
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardFeed {
    pub restaurant_id: Option<Uuid>,
    /// Newest first
    pub recent_orders: VecDeque<OrderSummary>,
    pub total_orders: u64,
    pub total_revenue: Decimal,
    pub last_message_at: Option<DateTime<Utc>>,
}

impl DashboardFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one live event received at `now`
    pub fn apply(&mut self, message: &LiveMessage, now: DateTime<Utc>) {
        self.last_message_at = Some(now);

        match message {
            LiveMessage::ConnectionEstablished { restaurant_id, .. } => {
                self.restaurant_id = Some(*restaurant_id);
            }
            LiveMessage::OrderCreated { order, .. } => {
                // Already listed
                if self.recent_orders.iter().any(|o| o.id == order.id) {
                    return;
                }
                self.recent_orders.push_front(OrderSummary::from(order.as_ref()));
                self.recent_orders.truncate(RECENT_ORDERS_LIMIT);
                self.total_orders += 1;
                self.total_revenue += order.total_price;
            }
            LiveMessage::OrderStatusChanged { order, .. } => {
                if let Some(entry) = self.recent_orders.iter_mut().find(|o| o.id == order.id) {
                    entry.order_status = order.order_status;
                    entry.payment_status = order.payment_status;
                }
            }
            LiveMessage::Pong { .. } => {}
        }
    }

    /// Orders that still need kitchen attention
    pub fn active_orders(&self) -> impl Iterator<Item = &OrderSummary> {
        self.recent_orders
            .iter()
            .filter(|o| o.order_status.is_active())
    }
}

/// [`DashboardFeed`] shared between the live client task and the UI
#[derive(Debug, Clone, Default)]
pub struct SharedFeed {
    inner: Arc<RwLock<DashboardFeed>>,
}

impl SharedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current feed state
    pub async fn snapshot(&self) -> DashboardFeed {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl LiveEventHandler for SharedFeed {
    async fn on_message(&self, message: LiveMessage) {
        tracing::debug!(kind = message.kind(), "Live event");
        self.inner.write().await.apply(&message, Utc::now());
    }
}
