//! API routes
//!
//! # Structure
//!
//! - [`health`] - health check
//! - [`auth`] - registration, login, email verification, password reset
//! - [`users`] - profile and delivery addresses
//! - [`products`] / [`categories`] - catalog read access
//! - [`orders`] - order initialization, webhook, verify, detail, cancel
//! - [`consultancy`] - booking mirror of the order endpoints

pub mod auth;
pub mod categories;
pub mod consultancy;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public surface: catalog reads, account entry points, and the
    // signature-verified webhooks (which must stay outside bearer auth).
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh-token", post(auth::refresh_token))
        .route("/api/v1/auth/forgot-password", post(auth::forgot_password))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .route("/api/v1/auth/verify-email/{token}", get(auth::verify_email))
        .route(
            "/api/v1/auth/resend-verification",
            post(auth::resend_verification),
        )
        .route("/api/v1/auth/change-email", post(auth::change_email))
        .route("/api/v1/products", get(products::list))
        .route("/api/v1/products/{id}", get(products::get_by_id))
        .route("/api/v1/categories", get(categories::list))
        .route(
            "/api/v1/orders/webhook/paystack",
            post(orders::paystack_webhook),
        )
        .route(
            "/api/v1/consultancy/webhook",
            post(consultancy::paystack_webhook),
        );

    let protected = Router::new()
        .route("/api/v1/auth/validate-token", get(auth::validate_token))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/users/profile", put(users::update_profile))
        .route("/api/v1/users/addresses", post(users::create_address))
        .route("/api/v1/users/addresses/{id}", put(users::update_address))
        .route("/api/v1/orders", get(orders::list))
        .route("/api/v1/orders/initialize", post(orders::initialize))
        .route("/api/v1/orders/verify/{reference}", get(orders::verify))
        .route("/api/v1/orders/{id}", get(orders::get_by_id))
        .route("/api/v1/orders/{id}/cancel", put(orders::cancel))
        .route(
            "/api/v1/consultancy/initialize",
            post(consultancy::initialize),
        )
        .route(
            "/api/v1/consultancy/verify-payment",
            get(consultancy::verify),
        )
        .route("/api/v1/consultancy/bookings", get(consultancy::list))
        .route(
            "/api/v1/consultancy/bookings/{id}",
            get(consultancy::get_by_id),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
