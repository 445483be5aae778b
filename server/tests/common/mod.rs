//! Shared test fixtures: an in-memory state, a recording notifier, and a
//! local Paystack stub the reqwest client talks to over loopback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use shared::models::{Item, User};
use shared::notification::OrderNotification;
use shared::util::{new_id, now_millis};
use storefront_server::AppState;
use storefront_server::db::{items, users};
use storefront_server::notify::OrderNotifier;
use storefront_server::paystack::PaystackClient;

/// Captures emitted notifications instead of broadcasting them
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<OrderNotification>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderNotifier for RecordingNotifier {
    async fn notify_new_order(&self, notification: &OrderNotification) {
        self.events.lock().unwrap().push(notification.clone());
    }
}

/// In-process Paystack stub.
///
/// `initialize` records the amount per reference; `verify` echoes it back as
/// a successful charge. Tests override the recorded amount to simulate a
/// mismatched charge, and can count verify calls.
#[derive(Clone, Default)]
pub struct GatewayStub {
    amounts: Arc<Mutex<HashMap<String, i64>>>,
    verify_calls: Arc<AtomicUsize>,
}

impl GatewayStub {
    pub fn set_amount(&self, reference: &str, amount_minor: i64) {
        self.amounts
            .lock()
            .unwrap()
            .insert(reference.to_string(), amount_minor);
    }

    pub fn verify_call_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

async fn initialize_txn(
    State(stub): State<GatewayStub>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let reference = body["reference"].as_str().unwrap_or_default().to_string();
    let amount = body["amount"].as_i64().unwrap_or_default();
    stub.amounts.lock().unwrap().entry(reference).or_insert(amount);
    Json(json!({
        "status": true,
        "data": { "authorization_url": "https://checkout.example/redirect" },
    }))
}

async fn verify_txn(
    State(stub): State<GatewayStub>,
    Path(reference): Path<String>,
) -> Json<Value> {
    stub.verify_calls.fetch_add(1, Ordering::SeqCst);
    let amount = stub.amounts.lock().unwrap().get(&reference).copied();
    match amount {
        Some(amount) => Json(json!({
            "status": true,
            "data": { "status": "success", "amount": amount, "reference": reference },
        })),
        None => Json(json!({ "status": false, "message": "Transaction reference not found" })),
    }
}

/// Serve the stub on an ephemeral loopback port and return its base URL
pub async fn start_gateway(stub: GatewayStub) -> String {
    let app = Router::new()
        .route("/transaction/initialize", post(initialize_txn))
        .route("/transaction/verify/{reference}", get(verify_txn))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// In-memory state wired to the stub gateway and a recording notifier
pub async fn test_state(stub: &GatewayStub) -> (AppState, Arc<RecordingNotifier>) {
    let base_url = start_gateway(stub.clone()).await;
    let paystack = PaystackClient::with_base_url("sk_test_secret", base_url).unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::for_tests(paystack, notifier.clone())
        .await
        .unwrap();
    (state, notifier)
}

pub async fn seed_user(state: &AppState) -> User {
    let user = User {
        id: new_id(),
        first_name: "Ada".into(),
        last_name: "Obi".into(),
        email: "ada@example.com".into(),
        phone_number: Some("+2348012345678".into()),
        password_hash: "unused".into(),
        role: "customer".into(),
        is_email_verified: true,
        is_active: true,
        created_at: now_millis(),
    };
    users::create(&state.pool, &user).await.unwrap();
    user
}

pub async fn seed_item(state: &AppState, name: &str, price: f64, stock: i64) -> Item {
    let now = now_millis();
    let item = Item {
        id: new_id(),
        category_id: None,
        name: name.into(),
        description: None,
        price,
        image_url: None,
        stock_quantity: stock,
        low_stock_threshold: 2,
        is_available: true,
        created_at: now,
        updated_at: now,
    };
    items::create(&state.pool, &item).await.unwrap();
    item
}
