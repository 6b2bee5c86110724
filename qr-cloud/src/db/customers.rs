use chrono::{DateTime, Utc};
use shared::models::CustomerProfile;
use sqlx::PgPool;
use uuid::Uuid;

/// Insert or refresh the profile for (restaurant, phone)
pub async fn upsert(
    pool: &PgPool,
    restaurant_id: Uuid,
    phone_number: &str,
    name: &str,
    ordered_at: DateTime<Utc>,
) -> Result<CustomerProfile, sqlx::Error> {
    sqlx::query_as(
        "INSERT INTO customer_profiles (id, restaurant_id, phone_number, name, last_order_at)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (restaurant_id, phone_number)
         DO UPDATE SET name = EXCLUDED.name, last_order_at = EXCLUDED.last_order_at
         RETURNING id, restaurant_id, phone_number, name, last_order_at, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(restaurant_id)
    .bind(phone_number)
    .bind(name)
    .bind(ordered_at)
    .fetch_one(pool)
    .await
}
