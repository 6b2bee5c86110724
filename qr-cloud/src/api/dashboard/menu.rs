//! Owner menu management: /api/dashboard/menu

use axum::extract::State;
use axum::{Extension, Json, http::StatusCode};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use uuid::Uuid;

use crate::api::ApiResult;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::auth::OwnerIdentity;
use crate::db;
use crate::error::{ServiceError, foreign_key_violation_as};
use crate::services::menu::{self, DEFAULT_OWNER_LIMIT, OwnerFilter};
use crate::state::AppState;
use crate::validation;

fn item_not_found() -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound)
}

#[derive(Debug, Deserialize)]
pub struct OwnerMenuQuery {
    pub include_unavailable: Option<bool>,
    pub category: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/dashboard/menu
pub async fn list_menu_items(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppQuery(query): AppQuery<OwnerMenuQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let filter = OwnerFilter {
        include_unavailable: query.include_unavailable.unwrap_or(true),
        category: query.category,
        skip: query.skip.unwrap_or(0),
        limit: query.limit.unwrap_or(DEFAULT_OWNER_LIMIT),
    };
    let items = db::menu_items::list_all(&state.pool, identity.restaurant_id).await?;
    Ok(Json(menu::owner_items(items, &filter)))
}

/// POST /api/dashboard/menu
pub async fn create_menu_item(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppJson(mut item): AppJson<MenuItemCreate>,
) -> Result<(StatusCode, Json<MenuItem>), ServiceError> {
    validation::check_menu_item_create(&mut item)?;

    let created = db::menu_items::create(&state.pool, identity.restaurant_id, &item).await?;
    tracing::info!(
        restaurant_id = %identity.restaurant_id,
        menu_item_id = %created.id,
        name = %created.name,
        "Menu item created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/dashboard/menu/{item_id}
pub async fn get_menu_item(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(item_id): AppPath<Uuid>,
) -> ApiResult<MenuItem> {
    let item = db::menu_items::find(&state.pool, identity.restaurant_id, item_id)
        .await?
        .ok_or_else(item_not_found)?;
    Ok(Json(item))
}

/// PUT /api/dashboard/menu/{item_id}
pub async fn update_menu_item(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(item_id): AppPath<Uuid>,
    AppJson(mut patch): AppJson<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    validation::check_menu_item_update(&mut patch)?;

    let item = db::menu_items::update(&state.pool, identity.restaurant_id, item_id, &patch)
        .await?
        .ok_or_else(item_not_found)?;
    tracing::info!(
        restaurant_id = %identity.restaurant_id,
        menu_item_id = %item_id,
        "Menu item updated"
    );
    Ok(Json(item))
}

/// DELETE /api/dashboard/menu/{item_id}
///
/// Items referenced by past orders cannot be deleted; mark them unavailable.
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(item_id): AppPath<Uuid>,
) -> Result<StatusCode, ServiceError> {
    let deleted = db::menu_items::delete(&state.pool, identity.restaurant_id, item_id)
        .await
        .map_err(|e| {
            foreign_key_violation_as(
                e,
                AppError::business_rule(
                    "Menu item is referenced by existing orders; mark it unavailable instead",
                ),
            )
        })?;

    if !deleted {
        return Err(item_not_found().into());
    }
    tracing::info!(
        restaurant_id = %identity.restaurant_id,
        menu_item_id = %item_id,
        "Menu item deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub is_available: bool,
}

/// PATCH /api/dashboard/menu/{item_id}/availability?is_available=
pub async fn set_availability(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
    AppPath(item_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> ApiResult<MenuItem> {
    let item = db::menu_items::set_availability(
        &state.pool,
        identity.restaurant_id,
        item_id,
        query.is_available,
    )
    .await?
    .ok_or_else(item_not_found)?;
    Ok(Json(item))
}

/// GET /api/dashboard/menu/categories/list
///
/// Includes categories whose items are all unavailable.
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
) -> ApiResult<Vec<String>> {
    let items = db::menu_items::list_all(&state.pool, identity.restaurant_id).await?;
    Ok(Json(menu::categories(&items)))
}
