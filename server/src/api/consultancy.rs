//! Consultancy booking API handlers
//!
//! Mirror of the order endpoints without stock effects; the webhook carries
//! the same signature scheme and error semantics.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};

use shared::models::ConsultancyBooking;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::bookings as booking_service;
use crate::db::{bookings, users};
use crate::money;
use crate::paystack;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-paystack-signature";

#[derive(Debug, Deserialize)]
pub struct InitializeBookingRequest {
    pub consultancy_type: String,
    pub custom_type: Option<String>,
    pub description: String,
    pub preferred_date: String,
    pub preferred_time: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub reference: String,
}

/// POST /api/v1/consultancy/initialize
pub async fn initialize(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<InitializeBookingRequest>,
) -> AppResult<Json<ApiResponse<booking_service::InitializedBooking>>> {
    if req.consultancy_type.is_empty()
        || req.description.is_empty()
        || req.preferred_date.is_empty()
        || req.preferred_time.is_empty()
    {
        return Err(AppError::validation("Missing required fields"));
    }

    // "other" carries the caller-provided type text
    let consultancy_type = if req.consultancy_type == "other" {
        match req.custom_type.as_deref() {
            Some(custom) if !custom.is_empty() => custom.to_string(),
            _ => return Err(AppError::validation("custom_type is required for type 'other'")),
        }
    } else {
        req.consultancy_type.clone()
    };

    let session_datetime =
        booking_service::parse_session_datetime(&req.preferred_date, &req.preferred_time)?;

    let user = users::find_by_id(&state.pool, &current.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    let initialized = booking_service::initialize(
        &state,
        &user,
        &consultancy_type,
        &req.description,
        session_datetime,
    )
    .await?;

    Ok(Json(ApiResponse::ok_with_message(
        "Consultancy booking initialized successfully",
        initialized,
    )))
}

/// POST /api/v1/consultancy/webhook — signature-verified, no auth
pub async fn paystack_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Webhook missing signature header");
        return AppError::new(ErrorCode::InvalidSignature).into_response();
    };
    if let Err(e) =
        paystack::verify_webhook_signature(&body, signature, &state.paystack_secret_key)
    {
        tracing::warn!(error = e, "Webhook signature verification failed");
        return AppError::new(ErrorCode::InvalidSignature).into_response();
    }

    let event: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse webhook JSON");
            return AppError::validation("Invalid webhook payload").into_response();
        }
    };

    let event_type = event["event"].as_str().unwrap_or("");
    if event_type != "charge.success" {
        tracing::debug!(event_type, "Ignoring webhook event");
        return Json(ApiResponse::message("Event ignored")).into_response();
    }

    let Some(reference) = event["data"]["reference"].as_str() else {
        tracing::warn!("Webhook event missing reference");
        return AppError::validation("Webhook event missing reference").into_response();
    };

    match booking_service::handle_charge_success(&state, reference).await {
        Ok(_) => Json(ApiResponse::message("Webhook processed")).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/v1/consultancy/verify-payment?reference=...
pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let verified = booking_service::verify_payment(&state, &query.reference).await?;

    if !verified.is_success() {
        return Err(AppError::new(ErrorCode::PaymentVerifyFailed));
    }

    let booking = bookings::find_by_reference(&state.pool, &verified.reference).await?;
    Ok(Json(ApiResponse::ok(json!({
        "status": verified.status,
        "reference": verified.reference,
        "amount": money::from_minor_units(verified.amount_minor),
        "booking": booking,
    }))))
}

/// GET /api/v1/consultancy/bookings
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<ConsultancyBooking>>>> {
    let rows = bookings::list_for_user(&state.pool, &current.id).await?;
    Ok(Json(ApiResponse::ok(rows)))
}

/// GET /api/v1/consultancy/bookings/{id} — owner-only
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ConsultancyBooking>>> {
    let booking = bookings::find_for_user(&state.pool, &id, &current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    Ok(Json(ApiResponse::ok(booking)))
}
