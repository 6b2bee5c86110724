//! Service info and health check endpoints

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::db;
use crate::state::AppState;

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "QR Restaurant Ordering API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// GET /health
///
/// Always 200; a DB failure is reported in the body.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match db::ping(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!("Health check database probe failed: {e}");
            "unavailable"
        }
    };

    Json(json!({
        "status": "healthy",
        "service": "qr-cloud",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
        "supabase": if state.supabase_configured { "configured" } else { "not_configured" },
        "connections": state.connections.total_connections(),
    }))
}
