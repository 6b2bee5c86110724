//! Public menu endpoints: /api/menus/{restaurant_id}
//!
//! No authentication; only available items are ever returned.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuCategoryGroup, MenuItem, PublicMenu, Restaurant};
use uuid::Uuid;

use super::ApiResult;
use super::extract::{AppPath, AppQuery};
use crate::db;
use crate::error::ServiceResult;
use crate::services::menu;
use crate::state::AppState;
use crate::validation::validate_search;

async fn load_restaurant(state: &AppState, restaurant_id: Uuid) -> ServiceResult<Restaurant> {
    let restaurant = db::restaurants::find_by_id(&state.pool, restaurant_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RestaurantNotFound))?;
    Ok(restaurant)
}

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
}

/// GET /api/menus/{restaurant_id}
pub async fn get_menu(
    State(state): State<AppState>,
    AppPath(restaurant_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<MenuQuery>,
) -> ApiResult<PublicMenu> {
    let restaurant = load_restaurant(&state, restaurant_id).await?;
    let items = db::menu_items::list_all(&state.pool, restaurant_id).await?;
    Ok(Json(menu::public_menu(
        &restaurant,
        items,
        query.category.as_deref(),
    )))
}

/// GET /api/menus/{restaurant_id}/by-category
pub async fn get_menu_by_category(
    State(state): State<AppState>,
    AppPath(restaurant_id): AppPath<Uuid>,
) -> ApiResult<Vec<MenuCategoryGroup>> {
    load_restaurant(&state, restaurant_id).await?;
    let items = db::menu_items::list_all(&state.pool, restaurant_id).await?;
    Ok(Json(menu::group_by_category(items)))
}

/// GET /api/menus/{restaurant_id}/categories
pub async fn get_categories(
    State(state): State<AppState>,
    AppPath(restaurant_id): AppPath<Uuid>,
) -> ApiResult<Vec<String>> {
    load_restaurant(&state, restaurant_id).await?;
    let items = db::menu_items::list_all(&state.pool, restaurant_id).await?;
    Ok(Json(menu::categories(&menu::public_items(items, None))))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/menus/{restaurant_id}/search?q=&category=&limit=
pub async fn search_menu(
    State(state): State<AppState>,
    AppPath(restaurant_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<SearchQuery>,
) -> ApiResult<Vec<MenuItem>> {
    let (q, limit) = validate_search(&query.q, query.limit)?;
    load_restaurant(&state, restaurant_id).await?;
    let items = db::menu_items::list_all(&state.pool, restaurant_id).await?;
    Ok(Json(menu::search(
        items,
        &q,
        query.category.as_deref(),
        limit,
    )))
}
