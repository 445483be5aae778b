//! Order API handlers
//!
//! The webhook handler answers 4xx for handled business conditions (bad
//! signature, unknown order, amount mismatch) so the gateway stops
//! retrying them, 200 for success and duplicates, and 5xx only for genuine
//! failures the gateway's retry policy should recover.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use shared::models::{CartLine, OrderType};
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::auth::CurrentUser;
use crate::db::orders::OrderListFilter;
use crate::db::users;
use crate::money;
use crate::orders as order_service;
use crate::paystack;
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "x-paystack-signature";

#[derive(Debug, Deserialize, Validate)]
pub struct InitializeOrderRequest {
    #[validate(length(min = 1, message = "items must not be empty"))]
    pub items: Vec<CartLine>,
    pub order_type: OrderType,
    pub delivery_address_id: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

/// POST /api/v1/orders/initialize
pub async fn initialize(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<InitializeOrderRequest>,
) -> AppResult<Json<ApiResponse<order_service::InitializedOrder>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = users::find_by_id(&state.pool, &current.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    let initialized = order_service::initialize(
        &state,
        &user,
        &req.items,
        req.order_type,
        req.delivery_address_id.as_deref(),
        req.special_requests,
    )
    .await?;

    Ok(Json(ApiResponse::ok(initialized)))
}

/// POST /api/v1/orders/webhook/paystack — signature-verified, no auth
pub async fn paystack_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // 1. Signature over the raw, unparsed body bytes
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

    // 2. Parse and dispatch
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

    match order_service::handle_charge_success(&state, reference).await {
        Ok(_) => Json(ApiResponse::message("Webhook processed")).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/v1/orders/verify/{reference}
pub async fn verify(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let verified = order_service::verify_payment(&state, &reference).await?;
    Ok(Json(ApiResponse::ok(json!({
        "status": verified.status,
        "reference": verified.reference,
        "amount": money::from_minor_units(verified.amount_minor),
    }))))
}

/// GET /api/v1/orders — the caller's orders, paginated
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListOrdersQuery>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let filter = OrderListFilter {
        status: query.status,
        payment_status: query.payment_status,
        search: query.search,
        limit,
        offset: (page - 1) * limit,
    };

    let (rows, total) = order_service::list(&state, &current.id, &filter).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(Json(ApiResponse::ok(json!({
        "orders": rows,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total_pages,
        },
    }))))
}

/// GET /api/v1/orders/{id} — owner-only detail
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Value>>> {
    if uuid::Uuid::parse_str(&id).is_err() {
        return Err(AppError::validation("Invalid order ID format"));
    }

    let order = crate::db::orders::find_for_user(&state.pool, &id, &current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;

    let detail = order_service::detail(&state.pool, order).await?;
    Ok(Json(ApiResponse::ok(json!({ "order": detail }))))
}

/// PUT /api/v1/orders/{id}/cancel — owner-only, pending-only
pub async fn cancel(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    body: Option<Json<CancelOrderRequest>>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let reason = body.and_then(|Json(req)| req.reason);
    let order = order_service::cancel(&state, &current.id, &id, reason.as_deref()).await?;
    Ok(Json(ApiResponse::ok_with_message(
        "Order cancelled successfully",
        json!({ "order": order }),
    )))
}
