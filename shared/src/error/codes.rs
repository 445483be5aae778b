//! Unified error codes for the storefront backend
//!
//! Error codes are shared between the server and the desktop client and are
//! organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Address errors
//! - 8xxx: Booking errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes are represented as u16 values for efficient serialization and
/// cross-language compatibility (Rust, TypeScript).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

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
    AccountDisabled = 1005,
    /// Email address has not been verified
    EmailNotVerified = 1006,
    /// Email address is already registered
    EmailInUse = 1007,
    /// Permission denied (authenticated but not allowed)
    PermissionDenied = 1008,

    // ==================== 4xxx: Orders ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order cannot be cancelled in its current status
    OrderNotCancellable = 4002,

    // ==================== 5xxx: Payment ====================
    /// Payment initialization with the gateway failed
    PaymentInitFailed = 5001,
    /// Payment verification with the gateway failed
    PaymentVerifyFailed = 5002,
    /// Webhook signature did not match
    InvalidSignature = 5003,
    /// Verified amount does not match the expected amount
    AmountMismatch = 5004,

    // ==================== 6xxx: Catalog ====================
    /// Item not found
    ItemNotFound = 6001,
    /// Requested quantity exceeds available stock
    InsufficientStock = 6002,
    /// Category not found
    CategoryNotFound = 6003,

    // ==================== 7xxx: Addresses ====================
    /// Delivery address not found (or not owned by the caller)
    AddressNotFound = 7001,

    // ==================== 8xxx: Bookings ====================
    /// Consultancy booking not found
    BookingNotFound = 8001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// External service error (gateway, email)
    ExternalServiceError = 9003,
}

impl ErrorCode {
    /// Default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",

            Self::NotAuthenticated => "Authentication required",
            Self::InvalidCredentials => "Invalid email or password",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Invalid token",
            Self::AccountDisabled => "Account is disabled. Please contact support.",
            Self::EmailNotVerified => "Please verify your email before logging in",
            Self::EmailInUse => "Email already in use",
            Self::PermissionDenied => "Permission denied",

            Self::OrderNotFound => "Order not found",
            Self::OrderNotCancellable => "Only pending orders can be cancelled",

            Self::PaymentInitFailed => "Failed to initialize payment transaction",
            Self::PaymentVerifyFailed => "Payment verification failed",
            Self::InvalidSignature => "Invalid signature",
            Self::AmountMismatch => "Amount mismatch",

            Self::ItemNotFound => "Item not found",
            Self::InsufficientStock => "Insufficient stock",
            Self::CategoryNotFound => "Category not found",

            Self::AddressNotFound => "Delivery address not found",

            Self::BookingNotFound => "Booking not found",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::ExternalServiceError => "External service error",
        }
    }

    /// HTTP status code this error maps to at the request boundary
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::ItemNotFound
            | Self::CategoryNotFound
            | Self::AddressNotFound
            | Self::BookingNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailInUse
            | Self::OrderNotCancellable
            | Self::InsufficientStock => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::AccountDisabled | Self::EmailNotVerified | Self::PermissionDenied => {
                StatusCode::FORBIDDEN
            }

            // 400 Bad Request
            Self::Unknown
            | Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidSignature
            | Self::AmountMismatch
            | Self::PaymentVerifyFailed => StatusCode::BAD_REQUEST,

            // 500 Internal Server Error
            Self::PaymentInitFailed
            | Self::InternalError
            | Self::DatabaseError
            | Self::ExternalServiceError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Error returned when deserializing an unknown error code value
#[derive(Debug, Clone)]
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
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,
            1005 => Self::AccountDisabled,
            1006 => Self::EmailNotVerified,
            1007 => Self::EmailInUse,
            1008 => Self::PermissionDenied,
            4001 => Self::OrderNotFound,
            4002 => Self::OrderNotCancellable,
            5001 => Self::PaymentInitFailed,
            5002 => Self::PaymentVerifyFailed,
            5003 => Self::InvalidSignature,
            5004 => Self::AmountMismatch,
            6001 => Self::ItemNotFound,
            6002 => Self::InsufficientStock,
            6003 => Self::CategoryNotFound,
            7001 => Self::AddressNotFound,
            8001 => Self::BookingNotFound,
            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::ExternalServiceError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in [
            ErrorCode::InsufficientStock,
            ErrorCode::AmountMismatch,
            ErrorCode::OrderNotCancellable,
            ErrorCode::InvalidSignature,
        ] {
            let raw: u16 = code.into();
            assert_eq!(ErrorCode::try_from(raw).unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!(ErrorCode::try_from(4242).is_err());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            ErrorCode::OrderNotCancellable.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::InvalidSignature.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::ExternalServiceError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
