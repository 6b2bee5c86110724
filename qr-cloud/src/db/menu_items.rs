use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, restaurant_id, name, description, price, category, image_url, \
                       is_available, created_at, updated_at";

/// Every item of the restaurant, ordered by category then name
///
/// Public/owner visibility and paging are applied by `services::menu`.
pub async fn list_all(pool: &PgPool, restaurant_id: Uuid) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM menu_items WHERE restaurant_id = $1 ORDER BY category, name"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn find(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: Uuid,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM menu_items WHERE id = $1 AND restaurant_id = $2"
    ))
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Items of one restaurant among `ids`; foreign ids are silently absent
pub async fn find_many(
    pool: &PgPool,
    restaurant_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM menu_items WHERE restaurant_id = $1 AND id = ANY($2)"
    ))
    .bind(restaurant_id)
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    item: &MenuItemCreate,
) -> Result<MenuItem, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO menu_items
             (id, restaurant_id, name, description, price, category, image_url, is_available)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(restaurant_id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.category)
    .bind(&item.image_url)
    .bind(item.is_available.unwrap_or(true))
    .fetch_one(pool)
    .await
}

/// Partial update; absent fields keep their stored value
pub async fn update(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: Uuid,
    patch: &MenuItemUpdate,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE menu_items SET
             name = COALESCE($3, name),
             description = COALESCE($4, description),
             price = COALESCE($5, price),
             category = COALESCE($6, category),
             image_url = COALESCE($7, image_url),
             is_available = COALESCE($8, is_available),
             updated_at = NOW()
         WHERE id = $1 AND restaurant_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(restaurant_id)
    .bind(&patch.name)
    .bind(&patch.description)
    .bind(patch.price)
    .bind(&patch.category)
    .bind(&patch.image_url)
    .bind(patch.is_available)
    .fetch_optional(pool)
    .await
}

pub async fn set_availability(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: Uuid,
    is_available: bool,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE menu_items SET is_available = $3, updated_at = NOW()
         WHERE id = $1 AND restaurant_id = $2
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(restaurant_id)
    .bind(is_available)
    .fetch_optional(pool)
    .await
}

/// Returns `false` when no row matched
pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM menu_items WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
