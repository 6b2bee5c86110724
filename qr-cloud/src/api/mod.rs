//! API routes for qr-cloud

pub mod auth;
pub mod dashboard;
pub mod error_tracking;
pub mod extract;
pub mod health;
pub mod live_ws;
pub mod menus;
pub mod monitoring;
pub mod orders;

use axum::routing::{get, patch, post};
use axum::{Json, Router, middleware};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::owner_auth_middleware;
use crate::auth::rate_limit::{login_rate_limit, register_rate_limit};
use crate::error::ServiceError;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, ServiceError>;

/// Create the combined router
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let owner_auth = || middleware::from_fn_with_state(state.clone(), owner_auth_middleware);

    // Public registration / login (rate limited per IP)
    let auth_public = Router::new()
        .route(
            "/api/auth/register",
            post(auth::register).route_layer(middleware::from_fn_with_state(
                state.clone(),
                register_rate_limit,
            )),
        )
        .route(
            "/api/auth/login",
            post(auth::login).route_layer(middleware::from_fn_with_state(
                state.clone(),
                login_rate_limit,
            )),
        );

    // Public menu (no auth)
    let menus = Router::new()
        .route("/api/menus/{restaurant_id}", get(menus::get_menu))
        .route(
            "/api/menus/{restaurant_id}/by-category",
            get(menus::get_menu_by_category),
        )
        .route(
            "/api/menus/{restaurant_id}/categories",
            get(menus::get_categories),
        )
        .route("/api/menus/{restaurant_id}/search", get(menus::search_menu));

    // Orders: customers create without auth, owners manage with JWT
    let orders = Router::new()
        .route(
            "/api/orders",
            post(orders::create_order).merge(get(orders::list_orders).route_layer(owner_auth())),
        )
        .route(
            "/api/orders/{order_id}",
            get(orders::get_order)
                .put(orders::update_order)
                .route_layer(owner_auth()),
        )
        .route(
            "/api/orders/table/{table_number}",
            get(orders::get_table_orders).route_layer(owner_auth()),
        );

    // Live WS authenticates via query token before the upgrade
    let live = Router::new().route("/api/ws/orders/live", get(live_ws::handle_live_ws));

    // Owner-only routes (JWT authenticated)
    let owner = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/verify-token", post(auth::verify_token))
        .route(
            "/api/dashboard/menu",
            get(dashboard::menu::list_menu_items).post(dashboard::menu::create_menu_item),
        )
        .route(
            "/api/dashboard/menu/categories/list",
            get(dashboard::menu::list_categories),
        )
        .route(
            "/api/dashboard/menu/{item_id}",
            get(dashboard::menu::get_menu_item)
                .put(dashboard::menu::update_menu_item)
                .delete(dashboard::menu::delete_menu_item),
        )
        .route(
            "/api/dashboard/menu/{item_id}/availability",
            patch(dashboard::menu::set_availability),
        )
        .route(
            "/api/dashboard/analytics",
            get(dashboard::analytics::get_analytics).post(dashboard::analytics::post_analytics),
        )
        .route(
            "/api/dashboard/analytics/quick-metrics",
            get(dashboard::analytics::get_quick_metrics),
        )
        .route(
            "/api/dashboard/analytics/revenue-summary",
            get(dashboard::analytics::get_revenue_summary),
        )
        .route(
            "/api/dashboard/analytics/best-sellers",
            get(dashboard::analytics::get_best_sellers),
        )
        .route("/api/ws/orders/live/status", get(live_ws::live_status))
        .route(
            "/api/ws/orders/live/connections",
            get(live_ws::live_connections),
        )
        .route("/api/monitoring/errors", get(monitoring::error_summary))
        .route("/api/monitoring/trends", get(monitoring::error_trends))
        .route_layer(owner_auth());

    let x_request_id = HeaderName::from_static(error_tracking::REQUEST_ID_HEADER);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .merge(auth_public)
        .merge(menus)
        .merge(orders)
        .merge(live)
        .merge(owner)
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_tracking::track_errors,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(cors_layer(allowed_origins)),
        )
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route")
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
