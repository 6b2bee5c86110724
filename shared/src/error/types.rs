//! Error types and the JSON error envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Field name → list of messages for that field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Application error with structured error code and details
///
/// The primary error type of the platform:
/// - Standardized error codes via [`ErrorCode`]
/// - Human-readable messages
/// - Optional structured details and per-field validation messages
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional additional context (`from`/`to` of a transition, resource name, ...)
    pub details: Option<HashMap<String, Value>>,
    /// Optional field-level validation messages
    pub field_errors: Option<FieldErrors>,
}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.message().to_string(),
            code,
            details: None,
            field_errors: None,
        }
    }

    /// Create a new error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            field_errors: None,
        }
    }

    /// Add a detail entry to this error
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Add a message for a single field
    pub fn with_field_error(mut self, field: impl Into<String>, msg: impl Into<String>) -> Self {
        self.field_errors
            .get_or_insert_with(BTreeMap::new)
            .entry(field.into())
            .or_default()
            .push(msg.into());
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a validation error carrying per-field messages
    pub fn validation_fields(field_errors: FieldErrors) -> Self {
        let mut err = Self::new(ErrorCode::ValidationFailed);
        if !field_errors.is_empty() {
            err.field_errors = Some(field_errors);
        }
        err
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        let r = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", r))
            .with_detail("resource", r)
    }

    /// Create a not authenticated error
    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create an invalid token error
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    /// Create a business rule error (400)
    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::BusinessRuleViolation, msg)
    }

    /// Create a rate limited error
    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::RateLimited)
    }
}

/// Uniform JSON body returned for every failed request
///
/// `error_code` stays a raw `u16` so older clients can decode codes they
/// do not know yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: bool,
    pub error_code: u16,
    pub error_type: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// Build the envelope for an error, optionally tagged with a request id
    pub fn from_error(err: &AppError, request_id: Option<String>) -> Self {
        Self {
            error: true,
            error_code: err.code.code(),
            error_type: err.code.error_type().to_string(),
            message: err.message.clone(),
            details: err.details.clone(),
            field_errors: err.field_errors.clone(),
            timestamp: Utc::now(),
            request_id,
        }
    }

    /// Known error code, if the server sent one this build understands
    pub fn code(&self) -> Option<ErrorCode> {
        ErrorCode::try_from(self.error_code).ok()
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();
        let body = ErrorResponse::from_error(&self, None);

        // Log system errors
        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.message,
                "System error occurred"
            );
        }

        let mut response = (status, Json(body)).into_response();
        // Downstream middleware re-reads the error to tag and record it
        response.extensions_mut().insert(self);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_new() {
        let err = AppError::new(ErrorCode::NotFound);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Resource not found");
        assert!(err.details.is_none());
        assert!(err.field_errors.is_none());
    }

    #[test]
    fn test_app_error_with_detail() {
        let err = AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Invalid status transition from completed to pending",
        )
        .with_detail("from", "completed")
        .with_detail("to", "pending");

        let details = err.details.unwrap();
        assert_eq!(details.get("from").unwrap(), "completed");
        assert_eq!(details.get("to").unwrap(), "pending");
    }

    #[test]
    fn test_field_errors_accumulate() {
        let err = AppError::validation("Invalid payload")
            .with_field_error("price", "too many decimal places")
            .with_field_error("price", "must be positive")
            .with_field_error("name", "required");

        let fields = err.field_errors.unwrap();
        assert_eq!(fields["price"].len(), 2);
        assert_eq!(fields["name"], vec!["required".to_string()]);
    }

    #[test]
    fn test_validation_fields_empty_map_is_none() {
        let err = AppError::validation_fields(FieldErrors::new());
        assert!(err.field_errors.is_none());
        assert_eq!(err.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_app_error_convenience_constructors() {
        let err = AppError::not_found("Menu item");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Menu item not found");
        assert!(err.details.as_ref().unwrap().contains_key("resource"));

        assert_eq!(
            AppError::business_rule("nope").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::rate_limited().http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::token_expired().http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_envelope_shape() {
        let err = AppError::token_expired();
        let body = ErrorResponse::from_error(&err, Some("req-1".into()));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"], true);
        assert_eq!(json["error_code"], 1003);
        assert_eq!(json["error_type"], "authentication");
        assert_eq!(json["message"], "Token has expired");
        assert_eq!(json["request_id"], "req-1");
        assert!(json.get("details").is_none());
        assert!(json.get("field_errors").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_envelope_decodes_unknown_code() {
        let json = r#"{"error":true,"error_code":4242,"error_type":"internal",
            "message":"x","timestamp":"2024-01-01T00:00:00Z"}"#;
        let body: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.error_code, 4242);
        assert!(body.code().is_none());
    }

    #[test]
    fn test_into_response_keeps_error_in_extensions() {
        let response = AppError::new(ErrorCode::EmailAlreadyRegistered).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let err = response.extensions().get::<AppError>().unwrap();
        assert_eq!(err.code, ErrorCode::EmailAlreadyRegistered);
    }
}
