//! In-memory error monitoring
//!
//! Every error response passes through [`ErrorMonitor::record`]. The monitor
//! keeps per-key metrics, a bounded ring of recent events and time-bucketed
//! counters, and logs a warning when errors spike.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;
use shared::error::AppError;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const MAX_RECENT_ERRORS: usize = 10_000;
pub const RETENTION_DAYS: i64 = 7;
const ALERT_WINDOW_MINUTES: i64 = 5;
const ALERT_THRESHOLD: usize = 10;
const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity by error family (`ErrorCode::error_type`)
    pub fn for_error_type(error_type: &str) -> Self {
        match error_type {
            "validation" | "business_logic" | "not_found" | "conflict" => Severity::Low,
            "authentication" | "authorization" | "rate_limit" => Severity::Medium,
            "database" | "external_service" | "maintenance" => Severity::High,
            _ => Severity::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub timestamp: DateTime<Utc>,
    pub error_code: u16,
    pub error_type: &'static str,
    pub category: &'static str,
    pub message: String,
    pub endpoint: String,
    pub restaurant_id: Option<Uuid>,
    pub severity: Severity,
}

impl ErrorEvent {
    fn key(&self) -> String {
        format!("{}:{}:{}", self.category, self.error_code, self.endpoint)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorMetric {
    pub error_type: &'static str,
    pub error_code: u16,
    pub endpoint: String,
    pub count: u64,
    pub first_occurrence: DateTime<Utc>,
    pub last_occurrence: DateTime<Utc>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrequentError {
    pub key: String,
    pub error_code: u16,
    pub error_type: &'static str,
    pub endpoint: String,
    pub count: u64,
    pub severity: Severity,
    pub last_occurrence: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSummary {
    pub period_hours: i64,
    pub total_errors: u64,
    pub error_rate_per_hour: f64,
    pub error_types: BTreeMap<String, u64>,
    pub severity_distribution: BTreeMap<String, u64>,
    pub top_error_endpoints: Vec<EndpointCount>,
    pub most_frequent_errors: Vec<FrequentError>,
    pub current_minute_errors: u64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorTrends {
    pub daily: Vec<TrendPoint>,
    pub hourly: Vec<TrendPoint>,
}

#[derive(Default)]
struct MonitorState {
    metrics: HashMap<String, ErrorMetric>,
    recent: VecDeque<ErrorEvent>,
    /// Unix minute → count
    per_minute: BTreeMap<i64, u64>,
    /// Unix hour → count
    per_hour: BTreeMap<i64, u64>,
    per_day: BTreeMap<NaiveDate, u64>,
    last_alert: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct ErrorMonitor {
    inner: Arc<Mutex<MonitorState>>,
}

fn minute_bucket(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(60)
}

fn hour_bucket(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(3600)
}

impl ErrorMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, err: &AppError, endpoint: &str, restaurant_id: Option<Uuid>) {
        self.record_at(err, endpoint, restaurant_id, Utc::now()).await;
    }

    pub async fn record_at(
        &self,
        err: &AppError,
        endpoint: &str,
        restaurant_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) {
        let error_type = err.code.error_type();
        let event = ErrorEvent {
            timestamp: now,
            error_code: err.code.code(),
            error_type,
            category: err.code.category().name(),
            message: err.message.clone(),
            endpoint: endpoint.to_string(),
            restaurant_id,
            severity: Severity::for_error_type(error_type),
        };

        let mut state = self.inner.lock().await;

        state
            .metrics
            .entry(event.key())
            .and_modify(|m| {
                m.count += 1;
                m.last_occurrence = now;
            })
            .or_insert_with(|| ErrorMetric {
                error_type,
                error_code: event.error_code,
                endpoint: event.endpoint.clone(),
                count: 1,
                first_occurrence: now,
                last_occurrence: now,
                severity: event.severity,
            });

        *state.per_minute.entry(minute_bucket(now)).or_default() += 1;
        *state.per_hour.entry(hour_bucket(now)).or_default() += 1;
        *state.per_day.entry(now.date_naive()).or_default() += 1;

        if state.recent.len() >= MAX_RECENT_ERRORS {
            state.recent.pop_front();
        }
        state.recent.push_back(event);

        Self::check_spike(&mut state, now);
    }

    /// Warn once per window when errors exceed the threshold
    fn check_spike(state: &mut MonitorState, now: DateTime<Utc>) {
        let window_start = now - Duration::minutes(ALERT_WINDOW_MINUTES);
        if state.last_alert.is_some_and(|t| t > window_start) {
            return;
        }
        let in_window = state
            .recent
            .iter()
            .rev()
            .take_while(|e| e.timestamp > window_start)
            .count();
        if in_window > ALERT_THRESHOLD {
            tracing::warn!(
                errors = in_window,
                window_minutes = ALERT_WINDOW_MINUTES,
                "High error rate detected"
            );
            state.last_alert = Some(now);
        }
    }

    pub async fn summary(&self, hours: i64) -> ErrorSummary {
        self.summary_at(hours, Utc::now()).await
    }

    pub async fn summary_at(&self, hours: i64, now: DateTime<Utc>) -> ErrorSummary {
        let hours = hours.max(1);
        let cutoff = now - Duration::hours(hours);
        let state = self.inner.lock().await;

        let mut total = 0u64;
        let mut error_types: BTreeMap<String, u64> = BTreeMap::new();
        let mut severity_distribution: BTreeMap<String, u64> = BTreeMap::new();
        let mut endpoints: HashMap<&str, u64> = HashMap::new();
        let mut frequent: HashMap<String, FrequentError> = HashMap::new();

        for event in state.recent.iter().filter(|e| e.timestamp >= cutoff) {
            total += 1;
            *error_types.entry(event.error_type.to_string()).or_default() += 1;
            *severity_distribution
                .entry(event.severity.as_str().to_string())
                .or_default() += 1;
            *endpoints.entry(event.endpoint.as_str()).or_default() += 1;

            let key = event.key();
            frequent
                .entry(key.clone())
                .and_modify(|f| {
                    f.count += 1;
                    f.last_occurrence = f.last_occurrence.max(event.timestamp);
                })
                .or_insert_with(|| FrequentError {
                    key,
                    error_code: event.error_code,
                    error_type: event.error_type,
                    endpoint: event.endpoint.clone(),
                    count: 1,
                    severity: event.severity,
                    last_occurrence: event.timestamp,
                });
        }

        let mut top_error_endpoints: Vec<EndpointCount> = endpoints
            .into_iter()
            .map(|(endpoint, count)| EndpointCount {
                endpoint: endpoint.to_string(),
                count,
            })
            .collect();
        top_error_endpoints.sort_by(|a, b| b.count.cmp(&a.count).then(a.endpoint.cmp(&b.endpoint)));
        top_error_endpoints.truncate(TOP_N);

        let mut most_frequent_errors: Vec<FrequentError> = frequent.into_values().collect();
        most_frequent_errors.sort_by(|a, b| b.count.cmp(&a.count).then(a.key.cmp(&b.key)));
        most_frequent_errors.truncate(TOP_N);

        ErrorSummary {
            period_hours: hours,
            total_errors: total,
            error_rate_per_hour: total as f64 / hours as f64,
            error_types,
            severity_distribution,
            top_error_endpoints,
            most_frequent_errors,
            current_minute_errors: state
                .per_minute
                .get(&minute_bucket(now))
                .copied()
                .unwrap_or(0),
            generated_at: now,
        }
    }

    pub async fn trends(&self, days: i64) -> ErrorTrends {
        self.trends_at(days, Utc::now()).await
    }

    /// Daily counts for the last `days` days and hourly counts for the last 24 hours, oldest first
    pub async fn trends_at(&self, days: i64, now: DateTime<Utc>) -> ErrorTrends {
        let days = days.clamp(1, RETENTION_DAYS);
        let state = self.inner.lock().await;

        let today = now.date_naive();
        let daily = (0..days)
            .rev()
            .map(|offset| {
                let day = today - Duration::days(offset);
                TrendPoint {
                    period: day.to_string(),
                    count: state.per_day.get(&day).copied().unwrap_or(0),
                }
            })
            .collect();

        let current_hour = hour_bucket(now);
        let hourly = (0..24)
            .rev()
            .map(|offset| {
                let bucket = current_hour - offset;
                let label = DateTime::<Utc>::from_timestamp(bucket * 3600, 0)
                    .map(|t| format!("{}T{:02}:00", t.date_naive(), t.hour()))
                    .unwrap_or_default();
                TrendPoint {
                    period: label,
                    count: state.per_hour.get(&bucket).copied().unwrap_or(0),
                }
            })
            .collect();

        ErrorTrends { daily, hourly }
    }

    /// Drop data older than the retention window
    pub async fn prune(&self) {
        self.prune_at(Utc::now()).await;
    }

    pub async fn prune_at(&self, now: DateTime<Utc>) {
        let cutoff = now - Duration::days(RETENTION_DAYS);
        let mut state = self.inner.lock().await;

        let minute_cutoff = minute_bucket(now - Duration::hours(24));
        state.per_minute.retain(|bucket, _| *bucket >= minute_cutoff);
        let hour_cutoff = hour_bucket(cutoff);
        state.per_hour.retain(|bucket, _| *bucket >= hour_cutoff);
        let day_cutoff = cutoff.date_naive();
        state.per_day.retain(|day, _| *day >= day_cutoff);

        state.metrics.retain(|_, m| m.last_occurrence >= cutoff);
        while state.recent.front().is_some_and(|e| e.timestamp < cutoff) {
            state.recent.pop_front();
        }
    }

    #[cfg(test)]
    async fn metric_count(&self) -> usize {
        self.inner.lock().await.metrics.len()
    }

    #[cfg(test)]
    async fn recent_len(&self) -> usize {
        self.inner.lock().await.recent.len()
    }
}
