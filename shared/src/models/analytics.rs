//! Analytics report types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Optional reporting window; both ends inclusive
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestSellingItem {
    pub menu_item_id: Uuid,
    pub menu_item_name: String,
    pub total_quantity_sold: i64,
    pub total_revenue: Decimal,
    pub order_count: i64,
    pub average_quantity_per_order: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyOrders {
    pub hour: u32,
    pub order_count: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub order_count: i64,
    pub average_order_value: Decimal,
}

/// Full report for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub best_selling_items: Vec<BestSellingItem>,
    pub orders_by_hour: Vec<HourlyOrders>,
    pub revenue_by_day: Vec<DailyRevenue>,
    pub order_status_breakdown: BTreeMap<String, i64>,
    pub payment_status_breakdown: BTreeMap<String, i64>,
    pub date_range: DateRange,
    pub generated_at: DateTime<Utc>,
}

/// Dashboard header figures for the last N days
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickMetrics {
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    /// Percentage of completed orders, one decimal
    pub completion_rate: f64,
    pub period_days: i64,
}

/// Preset window of the revenue summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevenuePeriod {
    #[serde(rename = "7d")]
    Week,
    #[default]
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl RevenuePeriod {
    /// Days looked back from today
    pub fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }
}

/// Revenue figures for a preset period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub period: RevenuePeriod,
    pub total_revenue: Decimal,
    pub total_orders: i64,
    pub average_order_value: Decimal,
    pub revenue_by_day: Vec<DailyRevenue>,
    pub date_range: DateRange,
}

/// Top menu items over the last N days
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestSellersReport {
    pub best_selling_items: Vec<BestSellingItem>,
    pub period_days: i64,
    pub date_range: DateRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_period_wire_names() {
        let period: RevenuePeriod = serde_json::from_str("\"1y\"").unwrap();
        assert_eq!(period, RevenuePeriod::Year);
        assert_eq!(period.days(), 365);
        assert_eq!(serde_json::to_string(&RevenuePeriod::Week).unwrap(), "\"7d\"");
        assert_eq!(RevenuePeriod::default().days(), 30);
        assert!(serde_json::from_str::<RevenuePeriod>("\"2w\"").is_err());
    }
}
