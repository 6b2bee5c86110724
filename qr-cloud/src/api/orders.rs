//! Order endpoints: /api/orders
//!
//! Customers place orders without authentication; everything else is scoped
//! to the authenticated owner's restaurant.

use axum::extract::State;
use axum::{Extension, Json, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderConfirmation, OrderCreate, OrderUpdate};
use shared::order::OrderStatus;
use uuid::Uuid;

use super::ApiResult;
use super::extract::{AppJson, AppPath, AppQuery};
use crate::auth::OwnerIdentity;
use crate::db;
use crate::error::ServiceError;
use crate::services::orders::{build_order, check_total, price_lines};
use crate::state::AppState;
use crate::validation::{self, validate_table_number};

pub const DEFAULT_ORDER_LIMIT: i64 = 100;
pub const MAX_ORDER_LIMIT: i64 = 100;

/// POST /api/orders (public)
pub async fn create_order(
    State(state): State<AppState>,
    AppJson(mut req): AppJson<OrderCreate>,
) -> Result<(StatusCode, Json<OrderConfirmation>), ServiceError> {
    validation::check_order_create(&mut req)?;

    if !db::restaurants::exists(&state.pool, req.restaurant_id).await? {
        return Err(AppError::new(ErrorCode::RestaurantNotFound).into());
    }

    let ids: Vec<Uuid> = req.items.iter().map(|i| i.menu_item_id).collect();
    let menu = db::menu_items::find_many(&state.pool, req.restaurant_id, &ids).await?;

    let (lines, total) = price_lines(&req, &menu)?;
    check_total(total, req.total_price)?;

    let now = Utc::now();

    // The profile only feeds repeat-customer data; the order goes through regardless
    if let Err(e) = db::customers::upsert(
        &state.pool,
        req.restaurant_id,
        &req.customer_phone,
        &req.customer_name,
        now,
    )
    .await
    {
        tracing::warn!(restaurant_id = %req.restaurant_id, "Customer profile upsert failed: {e}");
    }

    let order = build_order(&req, lines, total, now);
    db::orders::insert(&state.pool, &order).await?;

    let delivered = state.connections.broadcast_order_created(&order);
    tracing::info!(
        restaurant_id = %order.restaurant_id,
        order_id = %order.id,
        order_number = %order.order_number,
        table_number = order.table_number,
        delivered,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(OrderConfirmation::new(order))))
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status_filter: Option<OrderStatus>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub include_items: Option<bool>,
}

/// GET /api/orders (newest first)
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppQuery(query): AppQuery<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_ORDER_LIMIT)
        .clamp(1, MAX_ORDER_LIMIT);
    let skip = query.skip.unwrap_or(0).max(0);

    let orders = db::orders::list(
        &state.pool,
        identity.restaurant_id,
        query.status_filter,
        skip,
        limit,
        query.include_items.unwrap_or(true),
    )
    .await?;
    Ok(Json(orders))
}

/// GET /api/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(order_id): AppPath<Uuid>,
) -> ApiResult<Order> {
    let order = db::orders::find(&state.pool, identity.restaurant_id, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    Ok(Json(order))
}

/// PUT /api/orders/{order_id}
pub async fn update_order(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(order_id): AppPath<Uuid>,
    AppJson(update): AppJson<OrderUpdate>,
) -> ApiResult<Order> {
    if update.order_status.is_none() && update.payment_status.is_none() {
        return Err(AppError::validation("No fields to update").into());
    }

    let current = db::orders::find(&state.pool, identity.restaurant_id, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    if let Some(to) = update.order_status {
        state.transitions.check(current.order_status, to)?;
    }

    let updated = db::orders::update_status(
        &state.pool,
        identity.restaurant_id,
        order_id,
        current.order_status,
        update.order_status,
        update.payment_status,
    )
    .await?
    .ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Order status changed concurrently, reload and retry",
        )
    })?;

    let delivered = state.connections.broadcast_order_status_changed(&updated);
    tracing::info!(
        restaurant_id = %identity.restaurant_id,
        order_id = %order_id,
        from = %current.order_status,
        to = %updated.order_status,
        payment_status = %updated.payment_status,
        delivered,
        "Order updated"
    );

    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub active_only: Option<bool>,
}

/// GET /api/orders/table/{table_number}
pub async fn get_table_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(table_number): AppPath<i32>,
    AppQuery(query): AppQuery<TableQuery>,
) -> ApiResult<Vec<Order>> {
    validate_table_number(table_number)?;

    let orders = db::orders::list_for_table(
        &state.pool,
        identity.restaurant_id,
        table_number,
        query.active_only.unwrap_or(true),
    )
    .await?;
    Ok(Json(orders))
}
