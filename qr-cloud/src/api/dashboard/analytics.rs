//! Sales analytics: /api/dashboard/analytics

use axum::extract::State;
use axum::{Extension, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use shared::error::AppError;
use shared::models::{
    AnalyticsReport, AnalyticsRequest, BestSellersReport, QuickMetrics, RevenuePeriod, RevenueSummary,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::api::ApiResult;
use crate::api::extract::{AppJson, AppQuery};
use crate::auth::OwnerIdentity;
use crate::db;
use crate::error::ServiceResult;
use crate::services::analytics::{
    self, DEFAULT_QUICK_METRICS_DAYS, MAX_QUICK_METRICS_DAYS, range_bounds, resolve_range,
    trailing_range,
};
use crate::state::AppState;
use crate::validation::validate_best_sellers;

async fn item_names(state: &AppState, restaurant_id: Uuid) -> ServiceResult<HashMap<Uuid, String>> {
    Ok(db::menu_items::list_all(&state.pool, restaurant_id)
        .await?
        .into_iter()
        .map(|item| (item.id, item.name))
        .collect())
}

async fn build(
    state: &AppState,
    identity: &OwnerIdentity,
    req: AnalyticsRequest,
) -> ServiceResult<AnalyticsReport> {
    let now = Utc::now();
    let range = resolve_range(&req, now.date_naive())?;
    let (start, end) = range_bounds(&range)?;

    let orders = db::orders::list_between(&state.pool, identity.restaurant_id, start, end).await?;
    let names = item_names(state, identity.restaurant_id).await?;

    let report = analytics::build_report(&orders, &names, range, now);
    tracing::info!(
        restaurant_id = %identity.restaurant_id,
        start = %range.start_date,
        end = %range.end_date,
        orders = report.total_orders,
        "Analytics report generated"
    );
    Ok(report)
}

/// GET /api/dashboard/analytics?start_date=&end_date=
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppQuery(req): AppQuery<AnalyticsRequest>,
) -> ApiResult<AnalyticsReport> {
    Ok(Json(build(&state, &identity, req).await?))
}

/// POST /api/dashboard/analytics
pub async fn post_analytics(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppJson(req): AppJson<AnalyticsRequest>,
) -> ApiResult<AnalyticsReport> {
    Ok(Json(build(&state, &identity, req).await?))
}

#[derive(Debug, Deserialize)]
pub struct QuickMetricsQuery {
    pub days: Option<i64>,
}

/// GET /api/dashboard/analytics/quick-metrics?days=
pub async fn get_quick_metrics(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppQuery(query): AppQuery<QuickMetricsQuery>,
) -> ApiResult<QuickMetrics> {
    let days = query.days.unwrap_or(DEFAULT_QUICK_METRICS_DAYS);
    if !(1..=MAX_QUICK_METRICS_DAYS).contains(&days) {
        return Err(AppError::validation("days must be between 1 and 90")
            .with_field_error("days", "must be between 1 and 90")
            .into());
    }

    let end = Utc::now();
    let start = end - Duration::days(days);
    let orders = db::orders::list_between(&state.pool, identity.restaurant_id, start, end).await?;
    Ok(Json(analytics::quick_metrics(&orders, days)))
}

#[derive(Debug, Deserialize)]
pub struct RevenueSummaryQuery {
    pub period: Option<RevenuePeriod>,
}

/// GET /api/dashboard/analytics/revenue-summary?period=7d|30d|90d|1y
pub async fn get_revenue_summary(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppQuery(query): AppQuery<RevenueSummaryQuery>,
) -> ApiResult<RevenueSummary> {
    let period = query.period.unwrap_or_default();
    let range = trailing_range(Utc::now().date_naive(), period.days().unsigned_abs())?;
    let (start, end) = range_bounds(&range)?;

    let orders = db::orders::list_between(&state.pool, identity.restaurant_id, start, end).await?;
    Ok(Json(analytics::revenue_summary(&orders, range, period)))
}

#[derive(Debug, Deserialize)]
pub struct BestSellersQuery {
    pub limit: Option<i64>,
    pub days: Option<i64>,
}

/// GET /api/dashboard/analytics/best-sellers?limit=&days=
pub async fn get_best_sellers(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppQuery(query): AppQuery<BestSellersQuery>,
) -> ApiResult<BestSellersReport> {
    let (limit, days) = validate_best_sellers(query.limit, query.days)?;
    let range = trailing_range(Utc::now().date_naive(), days)?;
    let (start, end) = range_bounds(&range)?;

    let orders = db::orders::list_between(&state.pool, identity.restaurant_id, start, end).await?;
    let names = item_names(&state, identity.restaurant_id).await?;
    Ok(Json(analytics::best_sellers_report(
        &orders,
        &names,
        limit,
        range,
        days as i64,
    )))
}
