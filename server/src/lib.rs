//! Storefront server — restaurant e-commerce backend
//!
//! # Architecture
//!
//! - **Catalog** (`db::items`, `api::products`): read-mostly product and
//!   category access supplying price and stock snapshots.
//! - **Orders** (`orders`): pending-order creation against live stock, the
//!   payment reconciliation engine, cancellation.
//! - **Bookings** (`bookings`): the stockless sibling for consultancy
//!   sessions.
//! - **Payments** (`paystack`): REST adapter for the gateway plus webhook
//!   signature verification.
//! - **Notifications** (`notify`): socket.io broadcast of confirmed orders
//!   to desktop clients, injected as a capability.
//! - **Accounts** (`auth`, `api::auth`, `email`): JWT auth, Argon2
//!   passwords, verification/reset emails via SES.
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── api/        # HTTP routes and handlers
//! ├── auth/       # JWT, password hashing, middleware
//! ├── bookings/   # booking lifecycle
//! ├── db/         # SQLite pool, migrations, repositories
//! ├── email/      # SES senders
//! ├── notify/     # real-time publisher capability
//! ├── orders/     # order lifecycle and reconciliation
//! ├── paystack/   # payment gateway adapter
//! ├── config.rs   # environment configuration
//! ├── money.rs    # decimal arithmetic and unit conversion
//! └── state.rs    # shared application state
//! ```

pub mod api;
pub mod auth;
pub mod bookings;
pub mod config;
pub mod db;
pub mod email;
pub mod money;
pub mod notify;
pub mod orders;
pub mod paystack;
pub mod state;

pub use config::Config;
pub use state::AppState;
