//! Error monitoring endpoints: /api/monitoring/*

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::error::AppError;

use super::extract::AppQuery;
use crate::monitor::{ErrorSummary, ErrorTrends, RETENTION_DAYS};
use crate::state::AppState;

const DEFAULT_SUMMARY_HOURS: i64 = 24;
const MAX_SUMMARY_HOURS: i64 = RETENTION_DAYS * 24;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub hours: Option<i64>,
}

/// GET /api/monitoring/errors?hours=
pub async fn error_summary(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SummaryQuery>,
) -> Result<Json<ErrorSummary>, AppError> {
    let hours = query.hours.unwrap_or(DEFAULT_SUMMARY_HOURS);
    if !(1..=MAX_SUMMARY_HOURS).contains(&hours) {
        return Err(AppError::validation(format!(
            "hours must be between 1 and {MAX_SUMMARY_HOURS}"
        ))
        .with_field_error("hours", format!("must be between 1 and {MAX_SUMMARY_HOURS}")));
    }
    Ok(Json(state.monitor.summary(hours).await))
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub days: Option<i64>,
}

/// GET /api/monitoring/trends?days=
pub async fn error_trends(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TrendsQuery>,
) -> Result<Json<ErrorTrends>, AppError> {
    let days = query.days.unwrap_or(RETENTION_DAYS);
    if !(1..=RETENTION_DAYS).contains(&days) {
        return Err(AppError::validation(format!(
            "days must be between 1 and {RETENTION_DAYS}"
        ))
        .with_field_error("days", format!("must be between 1 and {RETENTION_DAYS}")));
    }
    Ok(Json(state.monitor.trends(days).await))
}
