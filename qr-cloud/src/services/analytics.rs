//! Sales analytics over a period's orders

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Timelike, Utc};
use rust_decimal::Decimal;
use shared::error::AppError;
use shared::models::{
    AnalyticsReport, AnalyticsRequest, BestSellersReport, BestSellingItem, DailyRevenue,
    DateRange, HourlyOrders, Order, QuickMetrics, RevenuePeriod, RevenueSummary,
};
use shared::order::{OrderStatus, PaymentStatus};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::validation::validate_date_range;

pub const DEFAULT_RANGE_DAYS: u64 = 30;
pub const BEST_SELLER_COUNT: usize = 10;
pub const DEFAULT_QUICK_METRICS_DAYS: i64 = 7;
pub const MAX_QUICK_METRICS_DAYS: i64 = 90;
const UNKNOWN_ITEM: &str = "Unknown item";
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

fn out_of_range(field: &str) -> AppError {
    AppError::validation("Date is outside the supported range")
        .with_field_error(field, "date is outside the supported range")
}

fn check_supported(date: NaiveDate, field: &str) -> Result<(), AppError> {
    if SUPPORTED_YEARS.contains(&date.year()) {
        Ok(())
    } else {
        Err(out_of_range(field))
    }
}

/// Fill defaults (end = today, start = end - 30 days) and validate
pub fn resolve_range(req: &AnalyticsRequest, today: NaiveDate) -> Result<DateRange, AppError> {
    let end_date = req.end_date.unwrap_or(today);
    check_supported(end_date, "end_date")?;
    let start_date = match req.start_date {
        Some(start) => start,
        None => end_date
            .checked_sub_days(Days::new(DEFAULT_RANGE_DAYS))
            .ok_or_else(|| out_of_range("end_date"))?,
    };
    check_supported(start_date, "start_date")?;
    validate_date_range(start_date, end_date)?;
    let range = DateRange {
        start_date,
        end_date,
    };
    // The day after `end_date` must exist for the query bounds
    range_bounds(&range)?;
    Ok(range)
}

/// The last `days` days up to and including `today`
pub fn trailing_range(today: NaiveDate, days: u64) -> Result<DateRange, AppError> {
    let start_date = today
        .checked_sub_days(Days::new(days))
        .ok_or_else(|| out_of_range("days"))?;
    resolve_range(
        &AnalyticsRequest {
            start_date: Some(start_date),
            end_date: Some(today),
        },
        today,
    )
}

/// Half-open UTC bounds covering every day of the range
pub fn range_bounds(range: &DateRange) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    let start = range.start_date.and_time(NaiveTime::MIN).and_utc();
    let end = range
        .end_date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| out_of_range("end_date"))?
        .and_time(NaiveTime::MIN)
        .and_utc();
    Ok((start, end))
}

fn average(total: Decimal, count: i64) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(count)).round_dp(2)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Default)]
struct ItemTally {
    quantity: i64,
    revenue: Decimal,
    orders: HashSet<Uuid>,
}

/// Items ranked by quantity sold, then revenue, then name
pub fn best_sellers(
    orders: &[Order],
    item_names: &HashMap<Uuid, String>,
    limit: usize,
) -> Vec<BestSellingItem> {
    let mut tallies: HashMap<Uuid, ItemTally> = HashMap::new();
    for order in orders {
        for line in &order.items {
            let tally = tallies.entry(line.menu_item_id).or_default();
            tally.quantity += i64::from(line.quantity);
            tally.revenue += line.unit_price * Decimal::from(line.quantity);
            tally.orders.insert(order.id);
        }
    }

    let mut items: Vec<BestSellingItem> = tallies
        .into_iter()
        .map(|(menu_item_id, tally)| {
            let order_count = tally.orders.len() as i64;
            BestSellingItem {
                menu_item_id,
                menu_item_name: item_names
                    .get(&menu_item_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_ITEM.to_string()),
                total_quantity_sold: tally.quantity,
                total_revenue: tally.revenue.round_dp(2),
                order_count,
                average_quantity_per_order: round2(tally.quantity as f64 / order_count as f64),
            }
        })
        .collect();

    items.sort_by(|a, b| {
        b.total_quantity_sold
            .cmp(&a.total_quantity_sold)
            .then_with(|| b.total_revenue.cmp(&a.total_revenue))
            .then_with(|| a.menu_item_name.cmp(&b.menu_item_name))
    });
    items.truncate(limit);
    items
}

fn orders_by_hour(orders: &[Order]) -> Vec<HourlyOrders> {
    let mut buckets: Vec<HourlyOrders> = (0..24)
        .map(|hour| HourlyOrders {
            hour,
            order_count: 0,
            revenue: Decimal::ZERO,
        })
        .collect();
    for order in orders {
        let bucket = &mut buckets[order.created_at.hour() as usize];
        bucket.order_count += 1;
        bucket.revenue += order.total_price;
    }
    buckets
}

fn revenue_by_day(orders: &[Order], range: &DateRange) -> Vec<DailyRevenue> {
    let mut per_day: HashMap<NaiveDate, (Decimal, i64)> = HashMap::new();
    for order in orders {
        let entry = per_day.entry(order.created_at.date_naive()).or_default();
        entry.0 += order.total_price;
        entry.1 += 1;
    }

    range
        .start_date
        .iter_days()
        .take_while(|d| *d <= range.end_date)
        .map(|date| {
            let (revenue, order_count) = per_day.get(&date).copied().unwrap_or_default();
            DailyRevenue {
                date,
                revenue,
                order_count,
                average_order_value: average(revenue, order_count),
            }
        })
        .collect()
}

/// Build the full report from the orders created within `range`
pub fn build_report(
    orders: &[Order],
    item_names: &HashMap<Uuid, String>,
    range: DateRange,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let total_orders = orders.len() as i64;
    let total_revenue: Decimal = orders.iter().map(|o| o.total_price).sum();

    let mut order_status_breakdown: BTreeMap<String, i64> = OrderStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut payment_status_breakdown: BTreeMap<String, i64> = PaymentStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    for order in orders {
        *order_status_breakdown
            .entry(order.order_status.as_str().to_string())
            .or_default() += 1;
        *payment_status_breakdown
            .entry(order.payment_status.as_str().to_string())
            .or_default() += 1;
    }

    AnalyticsReport {
        total_orders,
        total_revenue: total_revenue.round_dp(2),
        average_order_value: average(total_revenue, total_orders),
        best_selling_items: best_sellers(orders, item_names, BEST_SELLER_COUNT),
        orders_by_hour: orders_by_hour(orders),
        revenue_by_day: revenue_by_day(orders, &range),
        order_status_breakdown,
        payment_status_breakdown,
        date_range: range,
        generated_at: now,
    }
}

/// Header figures for the last `days` days
pub fn quick_metrics(orders: &[Order], days: i64) -> QuickMetrics {
    let total_orders = orders.len() as i64;
    let total_revenue: Decimal = orders.iter().map(|o| o.total_price).sum();
    let completed = orders
        .iter()
        .filter(|o| o.order_status == OrderStatus::Completed)
        .count();

    let completion_rate = if total_orders == 0 {
        0.0
    } else {
        ((completed as f64 / total_orders as f64) * 1000.0).round() / 10.0
    };

    QuickMetrics {
        total_orders,
        total_revenue: total_revenue.round_dp(2),
        average_order_value: average(total_revenue, total_orders),
        completion_rate,
        period_days: days,
    }
}

/// Revenue-only view of a preset period
pub fn revenue_summary(orders: &[Order], range: DateRange, period: RevenuePeriod) -> RevenueSummary {
    let total_orders = orders.len() as i64;
    let total_revenue: Decimal = orders.iter().map(|o| o.total_price).sum();
    RevenueSummary {
        period,
        total_revenue: total_revenue.round_dp(2),
        total_orders,
        average_order_value: average(total_revenue, total_orders),
        revenue_by_day: revenue_by_day(orders, &range),
        date_range: range,
    }
}

pub fn best_sellers_report(
    orders: &[Order],
    item_names: &HashMap<Uuid, String>,
    limit: usize,
    range: DateRange,
    days: i64,
) -> BestSellersReport {
    BestSellersReport {
        best_selling_items: best_sellers(orders, item_names, limit),
        period_days: days,
        date_range: range,
    }
}
