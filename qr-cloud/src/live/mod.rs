//! ConnectionManager: live order fan-out
//!
//! Tracks open dashboard sockets per restaurant and pushes order events to
//! them. All data is strictly isolated by restaurant.
//!
//! ```text
//! Order handlers (create / status update)
//!       │ LiveMessage
//!       ▼
//! ConnectionManager
//!   └── restaurants: restaurant_id → (connection_id → mpsc::Sender<String>)
//!         │ serialized once, try_send to each member
//!         ▼
//!   Live WS session (one writer per socket, FIFO)
//! ```

use dashmap::DashMap;
use shared::live::LiveMessage;
use shared::models::Order;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Per-connection outbound queue capacity; a full queue marks a slow consumer
pub const CONNECTION_QUEUE_CAPACITY: usize = 64;

pub type ConnectionId = u64;

#[derive(Clone, Default)]
pub struct ConnectionManager {
    /// restaurant_id → (connection_id → outbound queue)
    restaurants: Arc<DashMap<Uuid, HashMap<ConnectionId, mpsc::Sender<String>>>>,
    /// connection_id → restaurant_id, for disconnect without a restaurant hint
    owners: Arc<DashMap<ConnectionId, Uuid>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket; the receiver feeds that socket's writer
    pub fn connect(&self, restaurant_id: Uuid) -> (ConnectionId, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::channel(CONNECTION_QUEUE_CAPACITY);

        self.restaurants
            .entry(restaurant_id)
            .or_default()
            .insert(id, tx);
        self.owners.insert(id, restaurant_id);

        tracing::info!(
            restaurant_id = %restaurant_id,
            connection_id = id,
            total = self.connection_count(restaurant_id),
            "Live connection registered"
        );
        (id, rx)
    }

    /// Remove a connection from whichever restaurant holds it
    pub fn disconnect(&self, connection_id: ConnectionId) {
        let Some((_, restaurant_id)) = self.owners.remove(&connection_id) else {
            return;
        };
        self.restaurants
            .remove_if_mut(&restaurant_id, |_, members| {
                members.remove(&connection_id);
                members.is_empty()
            });
        tracing::info!(
            restaurant_id = %restaurant_id,
            connection_id,
            "Live connection removed"
        );
    }

    /// Send to every socket of `restaurant_id`; returns the delivered count
    ///
    /// Members whose queue is closed or full are pruned. No retry.
    pub fn broadcast(&self, restaurant_id: Uuid, message: &LiveMessage) -> usize {
        let payload = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize live message: {e}");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut dead = Vec::new();

        if let Some(members) = self.restaurants.get(&restaurant_id) {
            for (id, tx) in members.iter() {
                match tx.try_send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            restaurant_id = %restaurant_id,
                            connection_id = *id,
                            "Dropping live connection: {e}"
                        );
                        dead.push(*id);
                    }
                }
            }
        }

        // Read guard released above; prune needs the write lock
        for id in dead {
            self.disconnect(id);
        }

        tracing::debug!(
            restaurant_id = %restaurant_id,
            kind = message.kind(),
            delivered,
            "Live message broadcast"
        );
        delivered
    }

    /// Send to a single connection; `false` if it is gone or stalled
    pub fn send_personal(&self, connection_id: ConnectionId, message: &LiveMessage) -> bool {
        let Some(restaurant_id) = self.owners.get(&connection_id).map(|r| *r) else {
            return false;
        };
        let Ok(payload) = serde_json::to_string(message) else {
            return false;
        };
        let sent = self
            .restaurants
            .get(&restaurant_id)
            .and_then(|members| members.get(&connection_id).map(|tx| tx.try_send(payload).is_ok()))
            .unwrap_or(false);
        if !sent {
            self.disconnect(connection_id);
        }
        sent
    }

    pub fn broadcast_order_created(&self, order: &Order) -> usize {
        self.broadcast(order.restaurant_id, &LiveMessage::order_created(order))
    }

    pub fn broadcast_order_status_changed(&self, order: &Order) -> usize {
        self.broadcast(order.restaurant_id, &LiveMessage::order_status_changed(order))
    }

    pub fn connection_count(&self, restaurant_id: Uuid) -> usize {
        self.restaurants
            .get(&restaurant_id)
            .map_or(0, |members| members.len())
    }

    pub fn total_connections(&self) -> usize {
        self.owners.len()
    }

    pub fn connected_restaurants(&self) -> usize {
        self.restaurants.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use shared::order::{OrderStatus, PaymentMethod, PaymentStatus};

    pub(crate) fn order_for(restaurant_id: Uuid) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            restaurant_id,
            order_number: "ORD-260101120000-AB12".to_string(),
            table_number: 4,
            customer_name: "Ana".to_string(),
            customer_phone: "+15550001111".to_string(),
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cash,
            total_price: Decimal::new(1299, 2),
            estimated_time: Some(12),
            created_at: now,
            updated_at: now,
            items: vec![],
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_only_target_restaurant() {
        let manager = ConnectionManager::new();
        let r1 = Uuid::new_v4();
        let r2 = Uuid::new_v4();

        let (_a, mut rx_a) = manager.connect(r1);
        let (_b, mut rx_b) = manager.connect(r1);
        let (_c, mut rx_c) = manager.connect(r2);

        let delivered = manager.broadcast_order_created(&order_for(r1));
        assert_eq!(delivered, 2);

        let payload = rx_a.recv().await.unwrap();
        let msg: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(msg["type"], "order_created");
        assert_eq!(msg["order"]["table_number"], 4);
        assert_eq!(rx_b.recv().await.unwrap(), payload);
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_receivers_are_pruned() {
        let manager = ConnectionManager::new();
        let r1 = Uuid::new_v4();

        let (_a, rx_a) = manager.connect(r1);
        let (_b, mut rx_b) = manager.connect(r1);
        drop(rx_a);

        let delivered = manager.broadcast(r1, &LiveMessage::pong());
        assert_eq!(delivered, 1);
        assert_eq!(manager.connection_count(r1), 1);
        assert!(rx_b.recv().await.is_some());
    }

    #[tokio::test]
    async fn full_queue_counts_as_failed_send() {
        let manager = ConnectionManager::new();
        let r1 = Uuid::new_v4();
        let (_id, _rx) = manager.connect(r1);

        for _ in 0..CONNECTION_QUEUE_CAPACITY {
            assert_eq!(manager.broadcast(r1, &LiveMessage::pong()), 1);
        }
        assert_eq!(manager.broadcast(r1, &LiveMessage::pong()), 0);
        assert_eq!(manager.connection_count(r1), 0);
    }

    #[test]
    fn disconnect_drops_empty_restaurant() {
        let manager = ConnectionManager::new();
        let r1 = Uuid::new_v4();
        let r2 = Uuid::new_v4();
        let (a, _rx_a) = manager.connect(r1);
        let (b, _rx_b) = manager.connect(r2);
        assert_eq!(manager.total_connections(), 2);
        assert_eq!(manager.connected_restaurants(), 2);

        manager.disconnect(a);
        assert_eq!(manager.connection_count(r1), 0);
        assert_eq!(manager.connected_restaurants(), 1);

        // Unknown or repeated ids are ignored
        manager.disconnect(a);
        manager.disconnect(999);
        assert_eq!(manager.total_connections(), 1);

        manager.disconnect(b);
        assert_eq!(manager.connected_restaurants(), 0);
    }

    #[tokio::test]
    async fn send_personal_targets_one_socket() {
        let manager = ConnectionManager::new();
        let r1 = Uuid::new_v4();
        let (a, mut rx_a) = manager.connect(r1);
        let (_b, mut rx_b) = manager.connect(r1);

        assert!(manager.send_personal(a, &LiveMessage::connection_established(r1)));
        let msg: serde_json::Value = serde_json::from_str(&rx_a.recv().await.unwrap()).unwrap();
        assert_eq!(msg["type"], "connection_established");
        assert!(rx_b.try_recv().is_err());
        assert!(!manager.send_personal(12345, &LiveMessage::pong()));
    }
}
