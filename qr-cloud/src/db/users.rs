use shared::models::{Restaurant, User};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, restaurant_id, role, is_active, created_at";

/// User row including the argon2 hash (never serialized)
#[derive(sqlx::FromRow)]
pub struct UserWithHash {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserWithHash>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create an owner account and its restaurant atomically
///
/// The user row is inserted first (restaurants reference their owner), then
/// linked back to the new restaurant. A duplicate email surfaces as a unique
/// violation on the first insert.
pub async fn create_owner_with_restaurant(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    restaurant_name: &str,
) -> Result<(User, Restaurant), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let user_id = Uuid::new_v4();
    let restaurant_id = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, 'owner')")
        .bind(user_id)
        .bind(email)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

    let restaurant: Restaurant = sqlx::query_as(
        "INSERT INTO restaurants (id, name, owner_id) VALUES ($1, $2, $3)
         RETURNING id, name, owner_id, created_at, updated_at",
    )
    .bind(restaurant_id)
    .bind(restaurant_name)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    let user: User = sqlx::query_as(&format!(
        "UPDATE users SET restaurant_id = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
    ))
    .bind(restaurant_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((user, restaurant))
}
