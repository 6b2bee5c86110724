//! Unified error codes for the QR-ordering platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Restaurant errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors (reserved)
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 8xxx: Service availability errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare u16 so dashboards and the live client can match on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Business rule violated
    BusinessRuleViolation = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Email is already registered
    EmailAlreadyRegistered = 1008,
    /// Password does not meet strength requirements
    WeakPassword = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Caller does not own the restaurant
    RestaurantAccessDenied = 2002,

    // ==================== 3xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 3001,
    /// User has no restaurant attached
    RestaurantNotLinked = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status change not allowed by the lifecycle table
    InvalidStatusTransition = 4002,
    /// Submitted total does not match menu prices
    PriceMismatch = 4003,
    /// Order has no items
    OrderEmpty = 4004,
    /// Order has too many line items
    TooManyOrderItems = 4005,
    /// Order references a menu item that does not exist
    OrderItemInvalid = 4006,


    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item is currently unavailable
    MenuItemUnavailable = 6002,
    /// Price is outside the accepted range or precision
    InvalidPrice = 6003,

    // ==================== 7xxx: Table ====================
    /// Table number outside 1..=999
    InvalidTableNumber = 7001,

    // ==================== 8xxx: Service ====================
    /// Too many requests
    RateLimited = 8001,
    /// Service is in maintenance mode
    MaintenanceMode = 8002,
    /// Upstream service failed
    ExternalServiceError = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::BusinessRuleViolation => "Business rule violation",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::EmailAlreadyRegistered => "Email is already registered",
            ErrorCode::WeakPassword => "Password does not meet requirements",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RestaurantAccessDenied => "User does not have access to this restaurant",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantNotLinked => "No restaurant associated with user",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidStatusTransition => "Invalid order status transition",
            ErrorCode::PriceMismatch => "Submitted total does not match menu prices",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::TooManyOrderItems => "Order contains too many items",
            ErrorCode::OrderItemInvalid => "Menu item not found or not available",


            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::MenuItemUnavailable => "Menu item is currently unavailable",
            ErrorCode::InvalidPrice => "Invalid price",

            // Table
            ErrorCode::InvalidTableNumber => "Table number must be between 1 and 999",

            // Service
            ErrorCode::RateLimited => "Too many requests, try again later",
            ErrorCode::MaintenanceMode => "Service is under maintenance",
            ErrorCode::ExternalServiceError => "External service error",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::BusinessRuleViolation),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::EmailAlreadyRegistered),
            1009 => Ok(ErrorCode::WeakPassword),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RestaurantAccessDenied),

            // Restaurant
            3001 => Ok(ErrorCode::RestaurantNotFound),
            3002 => Ok(ErrorCode::RestaurantNotLinked),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidStatusTransition),
            4003 => Ok(ErrorCode::PriceMismatch),
            4004 => Ok(ErrorCode::OrderEmpty),
            4005 => Ok(ErrorCode::TooManyOrderItems),
            4006 => Ok(ErrorCode::OrderItemInvalid),


            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::MenuItemUnavailable),
            6003 => Ok(ErrorCode::InvalidPrice),

            // Table
            7001 => Ok(ErrorCode::InvalidTableNumber),

            // Service
            8001 => Ok(ErrorCode::RateLimited),
            8002 => Ok(ErrorCode::MaintenanceMode),
            8003 => Ok(ErrorCode::ExternalServiceError),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::EmailAlreadyRegistered.code(), 1008);
        assert_eq!(ErrorCode::RestaurantAccessDenied.code(), 2002);
        assert_eq!(ErrorCode::RestaurantNotFound.code(), 3001);
        assert_eq!(ErrorCode::InvalidStatusTransition.code(), 4002);
        assert_eq!(ErrorCode::PriceMismatch.code(), 4003);
        assert_eq!(ErrorCode::MenuItemUnavailable.code(), 6002);
        assert_eq!(ErrorCode::InvalidTableNumber.code(), 7001);
        assert_eq!(ErrorCode::RateLimited.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_matches_code() {
        let all = [
            ErrorCode::ValidationFailed,
            ErrorCode::BusinessRuleViolation,
            ErrorCode::WeakPassword,
            ErrorCode::RestaurantNotLinked,
            ErrorCode::OrderEmpty,
            ErrorCode::TooManyOrderItems,
            ErrorCode::OrderItemInvalid,
            ErrorCode::InvalidPrice,
            ErrorCode::ExternalServiceError,
            ErrorCode::DatabaseError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(5001), Err(InvalidErrorCode(5001)));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");

        let code: ErrorCode = serde_json::from_str("1003").unwrap();
        assert_eq!(code, ErrorCode::TokenExpired);

        assert!(serde_json::from_str::<ErrorCode>("4242").is_err());
    }
}
