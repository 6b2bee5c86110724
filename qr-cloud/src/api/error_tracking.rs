//! Error envelope finishing and error tracking
//!
//! Handlers return `AppError`, whose response carries the error in its
//! extensions. This middleware stamps the request id into the envelope,
//! hides internal details unless debugging, and records the error.

use axum::Json;
use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use shared::error::{AppError, ErrorResponse};

use crate::auth::OwnerIdentity;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Metric key for requests that matched no route
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

pub async fn track_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    // Route template, so ids in the path share one metric
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;

    let Some(err) = response.extensions_mut().remove::<AppError>() else {
        return response;
    };
    let restaurant_id = response
        .extensions()
        .get::<OwnerIdentity>()
        .map(|identity| identity.restaurant_id);

    state.monitor.record(&err, &endpoint, restaurant_id).await;

    let status = response.status();
    let mut body = ErrorResponse::from_error(&err, request_id);
    if status.is_server_error() && !state.debug {
        body.details = None;
    }
    (status, Json(body)).into_response()
}
