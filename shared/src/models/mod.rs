//! Data models
//!
//! Shared between the server and the desktop notification client.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUIDv4 strings; timestamps are epoch milliseconds.

pub mod address;
pub mod booking;
pub mod category;
pub mod item;
pub mod order;
pub mod user;

// Re-exports
pub use address::*;
pub use booking::*;
pub use category::*;
pub use item::*;
pub use order::*;
pub use user::*;
