//! Unified error system
//!
//! - [`ErrorCode`]: standardized error codes shared with the desktop client
//! - [`AppError`]: error type carrying a code and message
//! - [`ApiResponse`]: unified API response envelope
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Address errors
//! - 8xxx: Booking errors
//! - 9xxx: System errors

mod codes;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
