//! Application state for qr-cloud

use chrono::Duration;
use shared::order::TransitionTable;
use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::RateLimiter;
use crate::config::Config;
use crate::live::ConnectionManager;
use crate::monitor::ErrorMonitor;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// JWT secret for owner authentication
    pub jwt_secret: String,
    /// Access token lifetime
    pub token_ttl: Duration,
    /// Allowed order status transitions
    pub transitions: Arc<TransitionTable>,
    /// Live dashboard sockets per restaurant
    pub connections: ConnectionManager,
    /// Rate limiter for login/registration routes
    pub rate_limiter: RateLimiter,
    /// Error counters behind /api/monitoring
    pub monitor: ErrorMonitor,
    /// Include internal details in 5xx envelopes
    pub debug: bool,
    /// Hosted database credentials present (reported by /health)
    pub supabase_configured: bool,
}

impl AppState {
    /// Connect, run migrations and build the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::from_pool(pool, config))
    }

    /// Build the state around an existing pool
    pub fn from_pool(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            jwt_secret: config.secret_key.clone(),
            token_ttl: Duration::minutes(config.access_token_expire_minutes),
            transitions: Arc::new(config.transitions.clone()),
            connections: ConnectionManager::new(),
            rate_limiter: RateLimiter::new(),
            monitor: ErrorMonitor::new(),
            debug: config.debug,
            supabase_configured: config.supabase_configured(),
        }
    }
}
