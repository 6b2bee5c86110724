//! Owner authentication endpoints: /api/auth/*

use axum::extract::State;
use axum::{Extension, Json, http::StatusCode};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AuthResponse, LoginRequest, MeResponse, MessageResponse, RegisterRequest, Token, User,
    VerifyTokenResponse,
};
use shared::util::normalize_email;
use uuid::Uuid;
use validator::Validate;

use super::ApiResult;
use super::extract::AppJson;
use crate::auth::OwnerIdentity;
use crate::auth::token::create_token;
use crate::db;
use crate::error::{ServiceError, unique_violation_as};
use crate::state::AppState;
use crate::util::{hash_password, verify_password, verify_password_against_dummy};
use crate::validation::{self, FieldChecker};

fn issue_token(state: &AppState, user: &User, restaurant_id: Uuid) -> Result<Token, AppError> {
    create_token(
        user.id,
        restaurant_id,
        &user.email,
        &state.jwt_secret,
        state.token_ttl,
    )
    .map_err(|e| {
        tracing::error!("JWT creation failed: {e}");
        AppError::internal("Failed to create access token")
    })
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    AppJson(mut req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ServiceError> {
    validation::check_register(&mut req)?;

    if db::users::find_by_email(&state.pool, &req.email)
        .await?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!("Password hashing failed: {e}");
        AppError::internal("Failed to process password")
    })?;

    // A concurrent registration can still race past the lookup above
    let (user, restaurant) = db::users::create_owner_with_restaurant(
        &state.pool,
        &req.email,
        &password_hash,
        &req.restaurant_name,
    )
    .await
    .map_err(|e| unique_violation_as(e, AppError::new(ErrorCode::EmailAlreadyRegistered)))?;

    let token = issue_token(&state, &user, restaurant.id)?;

    tracing::info!(
        user_id = %user.id,
        restaurant_id = %restaurant.id,
        "Owner registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            user,
            token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    AppJson(mut req): AppJson<LoginRequest>,
) -> ApiResult<AuthResponse> {
    req.email = normalize_email(&req.email);
    FieldChecker::from_derive(req.validate()).finish()?;

    let Some(found) = db::users::find_by_email(&state.pool, &req.email).await? else {
        verify_password_against_dummy(&req.password);
        tracing::info!(email = %req.email, "Login failed: unknown email");
        return Err(AppError::invalid_credentials().into());
    };

    if !verify_password(&req.password, &found.password_hash) {
        tracing::info!(email = %req.email, "Login failed: wrong password");
        return Err(AppError::invalid_credentials().into());
    }

    let user = found.user;
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled).into());
    }

    let restaurant_id = user.restaurant_id.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::RestaurantNotLinked,
            "No restaurant found for this account",
        )
    })?;

    let token = issue_token(&state, &user, restaurant_id)?;

    tracing::info!(user_id = %user.id, restaurant_id = %restaurant_id, "Owner logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        token,
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client drops its copy.
pub async fn logout(Extension(identity): Extension<OwnerIdentity>) -> Json<MessageResponse> {
    tracing::info!(user_id = %identity.user_id, "Owner logged out");
    Json(MessageResponse::new("Logout successful"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(identity): Extension<OwnerIdentity>,
) -> ApiResult<MeResponse> {
    let user = db::users::find_by_id(&state.pool, identity.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    Ok(Json(MeResponse {
        user,
        restaurant_id: identity.restaurant_id,
        authenticated: true,
    }))
}

/// POST /api/auth/verify-token
pub async fn verify_token(
    Extension(identity): Extension<OwnerIdentity>,
) -> Json<VerifyTokenResponse> {
    Json(VerifyTokenResponse {
        valid: true,
        user_id: identity.user_id,
        restaurant_id: identity.restaurant_id,
        message: "Token is valid".to_string(),
    })
}
