//! Booking lifecycle tests: the stockless sibling of order reconciliation
//! with a fixed session fee.

mod common;

use common::{GatewayStub, seed_user, test_state};
use storefront_server::bookings::{self, CONSULTANCY_AMOUNT, ReconcileOutcome};
use storefront_server::db::bookings as bookings_db;
use storefront_server::money;

#[tokio::test]
async fn initialize_creates_pending_booking_with_fixed_amount() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;

    let session = bookings::parse_session_datetime("2024-06-01", "14:30").unwrap();
    let initialized = bookings::initialize(&state, &user, "catering", "Office lunch", session)
        .await
        .unwrap();

    assert_eq!(initialized.amount, CONSULTANCY_AMOUNT);
    assert!(initialized.reference.starts_with("CONS-"));

    let booking = bookings_db::find_by_reference(&state.pool, &initialized.reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, "pending");
    assert_eq!(booking.payment_status, "pending");
    assert_eq!(booking.amount, CONSULTANCY_AMOUNT);
    assert_eq!(booking.session_datetime, session);
}

#[tokio::test]
async fn confirmation_is_idempotent() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;

    let session = bookings::parse_session_datetime("2024-06-01", "14:30").unwrap();
    let initialized = bookings::initialize(&state, &user, "catering", "Office lunch", session)
        .await
        .unwrap();

    let outcome = bookings::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Confirmed);

    let outcome = bookings::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::AlreadyPaid);

    let booking = bookings_db::find_by_reference(&state.pool, &initialized.reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, "confirmed");
    assert_eq!(booking.payment_status, "paid");
}

#[tokio::test]
async fn mismatched_amount_leaves_booking_pending() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;

    let session = bookings::parse_session_datetime("2024-06-01", "14:30").unwrap();
    let initialized = bookings::initialize(&state, &user, "catering", "Office lunch", session)
        .await
        .unwrap();

    // Gateway reports half the fixed fee
    stub.set_amount(
        &initialized.reference,
        money::to_minor_units(CONSULTANCY_AMOUNT / 2.0),
    );

    let err = bookings::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::AmountMismatch);

    let booking = bookings_db::find_by_reference(&state.pool, &initialized.reference)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, "pending");
    assert_eq!(booking.payment_status, "pending");
}

#[tokio::test]
async fn unknown_reference_is_a_handled_not_found() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    seed_user(&state).await;

    stub.set_amount("CONS-ghost-1", money::to_minor_units(CONSULTANCY_AMOUNT));
    let err = bookings::handle_charge_success(&state, "CONS-ghost-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::BookingNotFound);
}
