//! Owner JWT issuance, verification and the dashboard auth middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Token;
use uuid::Uuid;

use crate::db;
use crate::state::AppState;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const BEARER: &str = "bearer";

/// JWT claims for restaurant owners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerClaims {
    /// User ID
    pub sub: Uuid,
    pub restaurant_id: Uuid,
    pub email: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: i64,
    /// Issued at (Unix timestamp seconds)
    pub iat: i64,
    pub token_type: String,
}

/// Authenticated owner, inserted as a request extension
#[derive(Debug, Clone)]
pub struct OwnerIdentity {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub email: String,
}

impl From<OwnerClaims> for OwnerIdentity {
    fn from(claims: OwnerClaims) -> Self {
        Self {
            user_id: claims.sub,
            restaurant_id: claims.restaurant_id,
            email: claims.email,
        }
    }
}

/// Sign an access token valid for `ttl`
pub fn create_token(
    user_id: Uuid,
    restaurant_id: Uuid,
    email: &str,
    secret: &str,
    ttl: Duration,
) -> Result<Token, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = OwnerClaims {
        sub: user_id,
        restaurant_id,
        email: email.to_string(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        token_type: TOKEN_TYPE_ACCESS.to_string(),
    };

    let access_token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(Token {
        access_token,
        token_type: BEARER.to_string(),
        expires_in: ttl.num_seconds(),
        user_id,
        restaurant_id,
    })
}

/// Check signature and expiry (no leeway)
///
/// An expired token yields `TokenExpired`; every other failure `TokenInvalid`.
pub fn verify_token(token: &str, secret: &str) -> Result<OwnerClaims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let data = jsonwebtoken::decode::<OwnerClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::token_expired(),
            _ => AppError::invalid_token("Could not validate credentials"),
        }
    })?;

    if data.claims.token_type != TOKEN_TYPE_ACCESS {
        return Err(AppError::invalid_token("Invalid token type"));
    }
    Ok(data.claims)
}

/// Extracts the token from `Authorization: Bearer <jwt>`
pub fn bearer_token(request: &Request) -> Result<&str, AppError> {
    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotAuthenticated, "Missing Authorization header")
        })?;

    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotAuthenticated, "Invalid Authorization format")
        })
}

/// Middleware that verifies the owner JWT and the restaurant ownership
pub async fn owner_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = verify_token(bearer_token(&request)?, &state.jwt_secret)?;

    let restaurant = db::restaurants::find_by_id(&state.pool, claims.restaurant_id)
        .await
        .map_err(|e| {
            tracing::error!("Restaurant lookup during auth failed: {e}");
            AppError::database("A database error occurred")
        })?;

    match restaurant {
        Some(r) if r.owner_id == claims.sub => {}
        Some(_) => {
            tracing::warn!(
                user_id = %claims.sub,
                restaurant_id = %claims.restaurant_id,
                "Token owner does not own restaurant"
            );
            return Err(AppError::new(ErrorCode::RestaurantAccessDenied));
        }
        None => {
            return Err(AppError::with_message(
                ErrorCode::RestaurantAccessDenied,
                "Restaurant not found for user",
            ));
        }
    }

    let identity = OwnerIdentity::from(claims);
    request.extensions_mut().insert(identity.clone());
    let mut response = next.run(request).await;
    // Lets the error tracker attribute failures to a restaurant
    response.extensions_mut().insert(identity);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn create_then_verify() {
        let user_id = Uuid::new_v4();
        let restaurant_id = Uuid::new_v4();
        let token = create_token(
            user_id,
            restaurant_id,
            "owner@example.com",
            SECRET,
            Duration::minutes(30),
        )
        .unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 1800);

        let claims = verify_token(&token.access_token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.restaurant_id, restaurant_id);
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = create_token(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "owner@example.com",
            SECRET,
            Duration::seconds(-5),
        )
        .unwrap();

        let err = verify_token(&token.access_token, SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenExpired);
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn wrong_secret_or_garbage_is_invalid() {
        let token = create_token(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "owner@example.com",
            SECRET,
            Duration::minutes(5),
        )
        .unwrap();

        let err = verify_token(&token.access_token, "other-secret").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);

        let err = verify_token("not.a.jwt", SECRET).unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
    }

    #[test]
    fn bearer_header_parsing() {
        let request = Request::builder()
            .header("Authorization", "Bearer abc.def")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request).unwrap(), "abc.def");

        let request = Request::builder()
            .header("Authorization", "Basic xyz")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(
            bearer_token(&request).unwrap_err().code,
            ErrorCode::NotAuthenticated
        );

        let request = Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert!(bearer_token(&request).is_err());
    }
}
