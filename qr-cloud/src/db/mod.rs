//! Database access layer
//!
//! Free functions over `&PgPool` returning `sqlx::Error`; callers map errors
//! through `ServiceError`.

pub mod customers;
pub mod menu_items;
pub mod orders;
pub mod restaurants;
pub mod users;

use sqlx::PgPool;

/// Connectivity probe used by `/health`
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
