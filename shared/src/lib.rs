//! Shared types for the storefront backend and its desktop client
//!
//! # Contents
//!
//! - [`error`]: unified error codes, `AppError`, and the API response envelope
//! - [`models`]: data models and boundary DTOs
//! - [`notification`]: real-time event payloads (`new_online_order`)
//! - [`util`]: ID and timestamp helpers

pub mod error;
pub mod models;
pub mod notification;
pub mod util;

// Re-export the types almost every consumer needs
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use notification::{NEW_ONLINE_ORDER, OrderNotification};
