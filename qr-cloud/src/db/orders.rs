use chrono::{DateTime, Utc};
use shared::models::{Order, OrderItem};
use shared::order::{OrderStatus, PaymentStatus};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

const COLUMNS: &str = "id, restaurant_id, order_number, table_number, customer_name, \
                       customer_phone, order_status, payment_status, payment_method, \
                       total_price, estimated_time, created_at, updated_at";

/// Persist an order and its lines in one transaction
pub async fn insert(pool: &PgPool, order: &Order) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, restaurant_id, order_number, table_number, customer_name,
             customer_phone, order_status, payment_status, payment_method, total_price,
             estimated_time, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(order.id)
    .bind(order.restaurant_id)
    .bind(&order.order_number)
    .bind(order.table_number)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(order.order_status.as_str())
    .bind(order.payment_status.as_str())
    .bind(order.payment_method.as_str())
    .bind(order.total_price)
    .bind(order.estimated_time)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    for item in &order.items {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, menu_item_id, quantity, unit_price)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Single order with items, scoped to the restaurant
pub async fn find(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: Uuid,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = $1 AND restaurant_id = $2"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await?;

    match order {
        Some(order) => {
            let mut orders = vec![order];
            attach_items(pool, &mut orders).await?;
            Ok(orders.pop())
        }
        None => Ok(None),
    }
}

/// Newest first
pub async fn list(
    pool: &PgPool,
    restaurant_id: Uuid,
    status: Option<OrderStatus>,
    skip: i64,
    limit: i64,
    include_items: bool,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders
         WHERE restaurant_id = $1 AND ($2::TEXT IS NULL OR order_status = $2)
         ORDER BY created_at DESC
         OFFSET $3 LIMIT $4"
    ))
    .bind(restaurant_id)
    .bind(status.map(|s| s.as_str()))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    if include_items {
        attach_items(pool, &mut orders).await?;
    }
    Ok(orders)
}

/// Orders for one table, optionally only those still in the kitchen flow
pub async fn list_for_table(
    pool: &PgPool,
    restaurant_id: Uuid,
    table_number: i32,
    active_only: bool,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders
         WHERE restaurant_id = $1 AND table_number = $2
           AND (NOT $3 OR order_status NOT IN ('completed', 'canceled'))
         ORDER BY created_at DESC"
    ))
    .bind(restaurant_id)
    .bind(table_number)
    .bind(active_only)
    .fetch_all(pool)
    .await?;

    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

/// Orders created in `[start, end)`, with items
pub async fn list_between(
    pool: &PgPool,
    restaurant_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut orders: Vec<Order> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM orders
         WHERE restaurant_id = $1 AND created_at >= $2 AND created_at < $3
         ORDER BY created_at"
    ))
    .bind(restaurant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

/// Apply status changes if the order is still in `expected` status
///
/// Returns `None` when the order is missing or was changed concurrently.
pub async fn update_status(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: Uuid,
    expected: OrderStatus,
    order_status: Option<OrderStatus>,
    payment_status: Option<PaymentStatus>,
) -> Result<Option<Order>, sqlx::Error> {
    let updated: Option<Order> = sqlx::query_as(&format!(
        "UPDATE orders SET
             order_status = COALESCE($4, order_status),
             payment_status = COALESCE($5, payment_status),
             updated_at = NOW()
         WHERE id = $1 AND restaurant_id = $2 AND order_status = $3
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(restaurant_id)
    .bind(expected.as_str())
    .bind(order_status.map(|s| s.as_str()))
    .bind(payment_status.map(|s| s.as_str()))
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(order) => {
            let mut orders = vec![order];
            attach_items(pool, &mut orders).await?;
            Ok(orders.pop())
        }
        None => Ok(None),
    }
}

/// Load lines for all `orders` with one query
async fn attach_items(pool: &PgPool, orders: &mut [Order]) -> Result<(), sqlx::Error> {
    if orders.is_empty() {
        return Ok(());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let items: Vec<OrderItem> = sqlx::query_as(
        "SELECT id, order_id, menu_item_id, quantity, unit_price
         FROM order_items WHERE order_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in orders.iter_mut() {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}
