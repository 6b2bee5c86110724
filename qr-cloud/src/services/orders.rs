//! Order pricing and construction

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, Order, OrderCreate, OrderItem};
use shared::order::{
    OrderStatus, PaymentMethod, PaymentStatus, estimated_time_minutes, generate_order_number,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Largest accepted gap between submitted and computed totals
pub const PRICE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One order line priced from the database
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub menu_item_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Price every requested line against the restaurant's menu
///
/// `menu` holds the restaurant's items among those referenced. A missing id or
/// an unavailable item rejects the whole order.
pub fn price_lines(
    order: &OrderCreate,
    menu: &[MenuItem],
) -> Result<(Vec<PricedLine>, Decimal), AppError> {
    let by_id: HashMap<Uuid, &MenuItem> = menu.iter().map(|m| (m.id, m)).collect();

    let mut lines = Vec::with_capacity(order.items.len());
    let mut total = Decimal::ZERO;

    for line in &order.items {
        let item = by_id.get(&line.menu_item_id).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderItemInvalid,
                format!("Menu item {} not found", line.menu_item_id),
            )
            .with_detail("menu_item_id", line.menu_item_id.to_string())
        })?;

        if !item.is_available {
            return Err(AppError::with_message(
                ErrorCode::MenuItemUnavailable,
                format!("Menu item '{}' is not available", item.name),
            )
            .with_detail("menu_item_id", item.id.to_string()));
        }

        total += item.price * Decimal::from(line.quantity);
        lines.push(PricedLine {
            menu_item_id: item.id,
            quantity: line.quantity,
            unit_price: item.price,
        });
    }

    Ok((lines, total))
}

/// Reject a submitted total that differs from the computed one by more than one cent
pub fn check_total(computed: Decimal, submitted: Decimal) -> Result<(), AppError> {
    if (computed - submitted).abs() > PRICE_TOLERANCE {
        return Err(AppError::with_message(
            ErrorCode::PriceMismatch,
            format!("Price mismatch. Expected: {computed}, Received: {submitted}"),
        )
        .with_detail("expected", computed.to_string())
        .with_detail("received", submitted.to_string()));
    }
    Ok(())
}

/// Assemble a new pending cash order; the computed total is authoritative
pub fn build_order(
    req: &OrderCreate,
    lines: Vec<PricedLine>,
    total: Decimal,
    now: DateTime<Utc>,
) -> Order {
    let id = Uuid::new_v4();
    let line_count = lines.len();
    let items = lines
        .into_iter()
        .map(|l| OrderItem {
            id: Uuid::new_v4(),
            order_id: id,
            menu_item_id: l.menu_item_id,
            quantity: l.quantity,
            unit_price: l.unit_price,
        })
        .collect();

    Order {
        id,
        restaurant_id: req.restaurant_id,
        order_number: generate_order_number(now),
        table_number: req.table_number,
        customer_name: req.customer_name.clone(),
        customer_phone: req.customer_phone.clone(),
        order_status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: PaymentMethod::Cash,
        total_price: total.round_dp(2),
        estimated_time: Some(estimated_time_minutes(line_count)),
        created_at: now,
        updated_at: now,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::menu::tests::item;
    use shared::models::OrderItemCreate;

    fn request(items: &[(Uuid, i32)], total: Decimal) -> OrderCreate {
        OrderCreate {
            restaurant_id: Uuid::nil(),
            table_number: 7,
            customer_name: "Ana".into(),
            customer_phone: "+15550001111".into(),
            items: items
                .iter()
                .map(|(id, q)| OrderItemCreate {
                    menu_item_id: *id,
                    quantity: *q,
                })
                .collect(),
            total_price: total,
        }
    }

    #[test]
    fn prices_lines_from_menu() {
        let tacos = item("Tacos", "Mains", true); // 9.95
        let soda = item("Soda", "Drinks", true);
        let req = request(&[(tacos.id, 2), (soda.id, 1)], Decimal::new(2985, 2));

        let (lines, total) = price_lines(&req, &[tacos.clone(), soda]).unwrap();
        assert_eq!(total, Decimal::new(2985, 2));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].unit_price, tacos.price);
        check_total(total, req.total_price).unwrap();
    }

    #[test]
    fn missing_or_unavailable_items_rejected() {
        let off = item("Burger", "Mains", false);
        let req = request(&[(Uuid::new_v4(), 1)], Decimal::ONE);
        let err = price_lines(&req, &[off.clone()]).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderItemInvalid);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);

        let req = request(&[(off.id, 1)], Decimal::ONE);
        let err = price_lines(&req, &[off]).unwrap_err();
        assert_eq!(err.code, ErrorCode::MenuItemUnavailable);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn total_tolerance_is_one_cent() {
        let computed = Decimal::new(2000, 2);
        assert!(check_total(computed, Decimal::new(2001, 2)).is_ok());
        assert!(check_total(computed, Decimal::new(1999, 2)).is_ok());
        let err = check_total(computed, Decimal::new(2002, 2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PriceMismatch);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn build_order_snapshots_prices() {
        let tacos = item("Tacos", "Mains", true);
        let req = request(&[(tacos.id, 3)], Decimal::new(2985, 2));
        let (lines, total) = price_lines(&req, &[tacos]).unwrap();
        let now = Utc::now();

        let order = build_order(&req, lines, total, now);
        assert!(order.order_number.starts_with("ORD-"));
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        // one line, whatever its quantity
        assert_eq!(order.estimated_time, Some(12));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].order_id, order.id);
        assert_eq!(order.items[0].unit_price, Decimal::new(995, 2));
        assert_eq!(order.total_price, Decimal::new(2985, 2));
        assert_eq!(order.created_at, now);
    }

    #[test]
    fn estimate_counts_lines_not_units() {
        let tacos = item("Tacos", "Mains", true);
        let soda = item("Soda", "Drinks", true);
        let req = request(&[(tacos.id, 10), (soda.id, 10)], Decimal::new(19900, 2));
        let (lines, total) = price_lines(&req, &[tacos, soda]).unwrap();

        let order = build_order(&req, lines, total, Utc::now());
        assert_eq!(order.estimated_time, Some(14));
    }
}
