//! Consultancy booking lifecycle
//!
//! Structurally identical to the order engine without the stock step: a
//! pending booking plus a payment session, confirmed exactly once by either
//! the webhook or the manual-verify call. The amount is a fixed constant, so
//! the reconciliation guard compares against it rather than a computed sum.

use chrono::NaiveDateTime;
use serde_json::json;
use shared::error::ErrorCode;
use shared::models::{BookingPaymentStatus, BookingStatus, ConsultancyBooking, User};
use shared::{AppError, AppResult};

use crate::db::bookings::{self, ConfirmOutcome};
use crate::money;
use crate::paystack::VerifiedTransaction;
use crate::state::AppState;

/// Fixed consultancy session fee, major units
pub const CONSULTANCY_AMOUNT: f64 = 20_000.0;

/// Result of a successful initialization
#[derive(Debug, Clone, serde::Serialize)]
pub struct InitializedBooking {
    pub booking_id: String,
    pub payment_url: String,
    pub reference: String,
    pub amount: f64,
}

/// Result of a reconciliation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Confirmed,
    AlreadyPaid,
}

pub fn payment_reference(booking_id: &str, now: i64) -> String {
    format!("CONS-{booking_id}-{now}")
}

/// Parse the requested session slot (`YYYY-MM-DD` + `HH:MM`) into epoch
/// milliseconds, treated as UTC.
pub fn parse_session_datetime(date: &str, time: &str) -> AppResult<i64> {
    let parsed = NaiveDateTime::parse_from_str(&format!("{date}T{time}"), "%Y-%m-%dT%H:%M")
        .map_err(|_| AppError::validation("Invalid preferred_date or preferred_time"))?;
    Ok(parsed.and_utc().timestamp_millis())
}

/// Create a pending booking and open a payment session for it.
pub async fn initialize(
    state: &AppState,
    user: &User,
    consultancy_type: &str,
    description: &str,
    session_datetime: i64,
) -> AppResult<InitializedBooking> {
    let now = shared::util::now_millis();
    let booking = ConsultancyBooking {
        id: shared::util::new_id(),
        user_id: user.id.clone(),
        consultancy_type: consultancy_type.to_string(),
        description: description.to_string(),
        session_datetime,
        amount: CONSULTANCY_AMOUNT,
        status: BookingStatus::Pending.as_str().to_string(),
        payment_status: BookingPaymentStatus::Pending.as_str().to_string(),
        payment_reference: None,
        created_at: now,
        updated_at: now,
    };
    bookings::create_pending(&state.pool, &booking).await?;

    let reference = payment_reference(&booking.id, now);
    let callback_url = format!("{}/checkout/callback?type=consultation", state.frontend_url);
    let metadata = json!({
        "booking_id": booking.id,
        "user_id": user.id,
        "consultancy_type": booking.consultancy_type,
        "custom_fields": [
            {
                "display_name": "Booking ID",
                "variable_name": "booking_id",
                "value": booking.id,
            },
            {
                "display_name": "Consultancy Type",
                "variable_name": "consultancy_type",
                "value": booking.consultancy_type,
            },
        ],
    });

    let session = state
        .paystack
        .initialize_transaction(
            &user.email,
            money::to_minor_units(CONSULTANCY_AMOUNT),
            &reference,
            &callback_url,
            metadata,
        )
        .await
        .map_err(|e| {
            tracing::error!(booking_id = %booking.id, error = %e, "Paystack initialization failed");
            AppError::new(ErrorCode::PaymentInitFailed)
        })?;

    bookings::set_reference(&state.pool, &booking.id, &reference, now).await?;

    Ok(InitializedBooking {
        booking_id: booking.id,
        payment_url: session.authorization_url,
        reference,
        amount: CONSULTANCY_AMOUNT,
    })
}

/// Apply a verified payment to the booking it references. The amount guard
/// compares against the fixed constant carried by the booking row.
pub async fn reconcile(
    state: &AppState,
    verified: &VerifiedTransaction,
) -> AppResult<ReconcileOutcome> {
    let booking = bookings::find_by_reference(&state.pool, &verified.reference)
        .await?
        .ok_or_else(|| {
            tracing::warn!(reference = %verified.reference, "No booking for payment reference");
            AppError::new(ErrorCode::BookingNotFound)
        })?;

    if !money::amounts_match(booking.amount, verified.amount_minor) {
        tracing::warn!(
            booking_id = %booking.id,
            expected = money::to_minor_units(booking.amount),
            paid = verified.amount_minor,
            "Amount mismatch, leaving booking pending"
        );
        return Err(AppError::new(ErrorCode::AmountMismatch));
    }

    let now = shared::util::now_millis();
    match bookings::confirm_paid(&state.pool, &booking.id, now).await? {
        ConfirmOutcome::AlreadyPaid => {
            tracing::info!(booking_id = %booking.id, "Booking payment already reconciled, skipping");
            Ok(ReconcileOutcome::AlreadyPaid)
        }
        ConfirmOutcome::Applied => {
            tracing::info!(booking_id = %booking.id, "Booking payment confirmed");
            Ok(ReconcileOutcome::Confirmed)
        }
    }
}

/// Webhook entry: re-verify against the gateway before touching state.
pub async fn handle_charge_success(
    state: &AppState,
    reference: &str,
) -> AppResult<ReconcileOutcome> {
    let verified = state
        .paystack
        .verify_transaction(reference)
        .await
        .map_err(|e| {
            tracing::error!(reference, error = %e, "Gateway verification failed");
            AppError::new(ErrorCode::ExternalServiceError)
        })?;

    if !verified.is_success() {
        tracing::warn!(reference, status = %verified.status, "Transaction not successful");
        return Err(AppError::new(ErrorCode::PaymentVerifyFailed));
    }

    reconcile(state, &verified).await
}

/// Manual-verify entry.
pub async fn verify_payment(state: &AppState, reference: &str) -> AppResult<VerifiedTransaction> {
    let verified = state
        .paystack
        .verify_transaction(reference)
        .await
        .map_err(|e| {
            tracing::error!(reference, error = %e, "Gateway verification failed");
            AppError::new(ErrorCode::ExternalServiceError)
        })?;

    if verified.is_success() {
        reconcile(state, &verified).await?;
    }

    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_reference_format() {
        assert_eq!(
            payment_reference("b-1", 1_700_000_000_000),
            "CONS-b-1-1700000000000"
        );
    }

    #[test]
    fn test_session_datetime_parsing() {
        let millis = parse_session_datetime("2024-06-01", "14:30").unwrap();
        assert_eq!(millis, 1_717_252_200_000);
        assert!(parse_session_datetime("june first", "2pm").is_err());
    }
}
