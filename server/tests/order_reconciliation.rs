//! Order lifecycle tests against an in-memory database and a loopback
//! Paystack stub: initialization totals, idempotent confirmation, stock
//! deltas, amount guard, cancellation guard, webhook signature handling.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tower::ServiceExt;

use common::{GatewayStub, seed_item, seed_user, test_state};
use shared::models::{CartLine, OrderType};
use storefront_server::db::{items, orders as orders_db};
use storefront_server::orders::{self, ReconcileOutcome};
use storefront_server::{api, money};

fn lines(items: &[(&str, i64)]) -> Vec<CartLine> {
    items
        .iter()
        .map(|(id, quantity)| CartLine {
            item_id: id.to_string(),
            quantity: *quantity,
        })
        .collect()
}

#[tokio::test]
async fn initialize_computes_total_from_catalog_prices() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;
    let drink = seed_item(&state, "Chapman", 500.0, 5).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 3), (&drink.id, 1)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    assert_eq!(initialized.amount, 2900.0);
    assert!(initialized.reference.starts_with("ORD-"));
    assert_eq!(initialized.payment_url, "https://checkout.example/redirect");

    let order = orders_db::find_by_id(&state.pool, &initialized.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, "pending");
    assert_eq!(order.payment_status, "pending");
    assert_eq!(order.total_amount, 2900.0);
    assert_eq!(order.payment_reference.as_deref(), Some(initialized.reference.as_str()));

    // Sum of line subtotals equals the stored total
    let order_lines = orders_db::items_of(&state.pool, &order.id).await.unwrap();
    let sum: f64 = order_lines.iter().map(|l| l.subtotal).sum();
    assert_eq!(sum, order.total_amount);

    // Initialization validates stock but never reserves it
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(10));
    assert_eq!(items::stock_of(&state.pool, &drink.id).await.unwrap(), Some(5));
}

#[tokio::test]
async fn initialize_rejects_insufficient_stock_and_unknown_items() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 2).await;

    let err = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 3)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::InsufficientStock);

    let err = orders::initialize(
        &state,
        &user,
        &lines(&[("no-such-item", 1)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::ItemNotFound);
}

#[tokio::test]
async fn webhook_confirmation_decrements_stock_exactly_once() {
    let stub = GatewayStub::default();
    let (state, notifier) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;
    let drink = seed_item(&state, "Chapman", 500.0, 5).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 3), (&drink.id, 1)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    // First delivery applies the transition
    let outcome = orders::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::Confirmed);
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(7));
    assert_eq!(items::stock_of(&state.pool, &drink.id).await.unwrap(), Some(4));

    // Re-delivery is a no-op: no second decrement, no second notification
    let outcome = orders::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::AlreadyCompleted);
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(7));
    assert_eq!(items::stock_of(&state.pool, &drink.id).await.unwrap(), Some(4));

    let order = orders_db::find_by_id(&state.pool, &initialized.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, "confirmed");
    assert_eq!(order.payment_status, "completed");
    assert!(order.paid_at.is_some());

    // Exactly one notification, carrying the full order detail
    let events = notifier.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].total_amount, 2900.0);
    assert_eq!(events[0].customer_name, "Ada Obi");
    assert_eq!(events[0].items.len(), 2);
}

#[tokio::test]
async fn manual_verify_and_webhook_converge_on_one_transition() {
    let stub = GatewayStub::default();
    let (state, notifier) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 2)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    // Client-initiated verify lands first
    let verified = orders::verify_payment(&state, &initialized.reference)
        .await
        .unwrap();
    assert!(verified.is_success());
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(8));

    // Webhook arrives later and observes the idempotency gate
    let outcome = orders::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();
    assert_eq!(outcome, ReconcileOutcome::AlreadyCompleted);
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(8));
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn amount_mismatch_aborts_the_transition() {
    let stub = GatewayStub::default();
    let (state, notifier) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let platter = seed_item(&state, "Party Platter", 5000.0, 4).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&platter.id, 1)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    // Gateway reports 4000 against an expected 5000
    stub.set_amount(&initialized.reference, money::to_minor_units(4000.0));

    let err = orders::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::AmountMismatch);

    let order = orders_db::find_by_id(&state.pool, &initialized.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.status, "pending");
    assert_eq!(order.payment_status, "pending");
    assert_eq!(items::stock_of(&state.pool, &platter.id).await.unwrap(), Some(4));
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn total_amount_is_frozen_at_creation() {
    let stub = GatewayStub::default();
    let (state, notifier) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 2)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    // Catalog price changes after the order was created
    sqlx::query("UPDATE items SET price = 999.0 WHERE id = ?")
        .bind(&rice.id)
        .execute(&state.pool)
        .await
        .unwrap();

    orders::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();

    let order = orders_db::find_by_id(&state.pool, &initialized.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.total_amount, 1600.0);

    let events = notifier.events.lock().unwrap();
    assert_eq!(events[0].total_amount, 1600.0);
    // Line prices are the frozen unit-price snapshot, not the new price
    assert_eq!(events[0].items[0].price, 800.0);
}

#[tokio::test]
async fn cancellation_is_pending_only_and_restores_stock() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 3)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    // Wrong owner cannot see the order at all
    let err = orders::cancel(&state, "someone-else", &initialized.order_id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::OrderNotFound);

    // Owner cancels the pending order; stock restoration rides along
    let cancelled = orders::cancel(&state, &user.id, &initialized.order_id, Some("changed my mind"))
        .await
        .unwrap();
    assert_eq!(cancelled.status, "cancelled");
    assert_eq!(
        cancelled.notes.as_deref(),
        Some("Cancellation reason: changed my mind")
    );
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(13));

    // A second cancel attempt hits the status guard
    let err = orders::cancel(&state, &user.id, &initialized.order_id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::OrderNotCancellable);
}

#[tokio::test]
async fn confirmed_order_cannot_be_cancelled() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 3)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();
    orders::handle_charge_success(&state, &initialized.reference)
        .await
        .unwrap();

    let err = orders::cancel(&state, &user.id, &initialized.order_id, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::OrderNotCancellable);

    // Stock stays at the post-confirmation level
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(7));
}

#[tokio::test]
async fn webhook_with_bad_signature_changes_nothing() {
    let stub = GatewayStub::default();
    let (state, notifier) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 1)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();
    let verify_calls_before = stub.verify_call_count();

    let payload = serde_json::json!({
        "event": "charge.success",
        "data": { "reference": initialized.reference },
    })
    .to_string();

    // Signature computed with the wrong secret
    let mut mac = Hmac::<Sha512>::new_from_slice(b"wrong-secret").unwrap();
    mac.update(payload.as_bytes());
    let bad_signature = hex::encode(mac.finalize().into_bytes());

    let app = api::create_router(state.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/orders/webhook/paystack")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-paystack-signature", bad_signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // No state change and no gateway re-verification call
    assert_eq!(stub.verify_call_count(), verify_calls_before);
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(10));
    let order = orders_db::find_by_id(&state.pool, &initialized.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(order.payment_status, "pending");
    assert_eq!(notifier.count(), 0);
}

#[tokio::test]
async fn webhook_with_valid_signature_confirms_end_to_end() {
    let stub = GatewayStub::default();
    let (state, notifier) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let initialized = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 2)]),
        OrderType::Pickup,
        None,
        None,
    )
    .await
    .unwrap();

    let payload = serde_json::json!({
        "event": "charge.success",
        "data": { "reference": initialized.reference },
    })
    .to_string();

    let mut mac = Hmac::<Sha512>::new_from_slice(state.paystack_secret_key.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let app = api::create_router(state.clone());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/orders/webhook/paystack")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-paystack-signature", signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(items::stock_of(&state.pool, &rice.id).await.unwrap(), Some(8));
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn unknown_reference_is_a_handled_not_found() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    seed_user(&state).await;

    // The stub knows the reference (so gateway verification passes) but no
    // order was ever created for it.
    stub.set_amount("ORD-ghost-1", 100_000);
    let err = orders::handle_charge_success(&state, "ORD-ghost-1")
        .await
        .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::OrderNotFound);
}

#[tokio::test]
async fn delivery_orders_require_an_owned_address() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;
    let user = seed_user(&state).await;
    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;

    let err = orders::initialize(
        &state,
        &user,
        &lines(&[(&rice.id, 1)]),
        OrderType::Delivery,
        Some("not-an-address"),
        None,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, shared::ErrorCode::AddressNotFound);
}
