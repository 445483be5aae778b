//! Order lifecycle: initialization, payment reconciliation, cancellation
//!
//! Reconciliation has two entry points that race freely: the Paystack
//! webhook and the client-initiated verify call. Both funnel into
//! [`reconcile`], and the only correctness mechanism is the conditional
//! UPDATE inside `db::orders::confirm_paid`: whichever path commits first
//! wins, the other observes `AlreadyCompleted` and does nothing.

use serde_json::json;
use shared::error::ErrorCode;
use shared::models::{
    CartLine, Order, OrderDetail, OrderItem, OrderStatus, OrderType, PaymentStatus, User,
};
use shared::notification::OrderNotification;
use shared::{AppError, AppResult};
use sqlx::SqlitePool;

use crate::db::orders::{CancelOutcome, ConfirmOutcome, OrderListFilter};
use crate::db::{addresses, items, orders, users};
use crate::money;
use crate::paystack::VerifiedTransaction;
use crate::state::AppState;

/// Result of a successful initialization
#[derive(Debug, Clone, serde::Serialize)]
pub struct InitializedOrder {
    pub order_id: String,
    pub payment_url: String,
    pub reference: String,
    pub amount: f64,
}

/// Result of a reconciliation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Transition applied; stock decremented and notification emitted
    Confirmed,
    /// Payment was already reconciled; treated as a successful no-op
    AlreadyCompleted,
}

/// Payment reference for an order: globally unique through the order id plus
/// the initialization timestamp.
pub fn payment_reference(order_id: &str, now: i64) -> String {
    format!("ORD-{order_id}-{now}")
}

/// Create a pending order against current catalog state and open a payment
/// session for it.
///
/// Stock is validated but not reserved; the window this opens is closed at
/// confirmation time by the reconciliation transaction, not here. If the
/// gateway call fails the order stays pending without a reference; callers
/// may retry by initializing a new order.
pub async fn initialize(
    state: &AppState,
    user: &User,
    lines: &[CartLine],
    order_type: OrderType,
    delivery_address_id: Option<&str>,
    special_requests: Option<String>,
) -> AppResult<InitializedOrder> {
    if lines.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }

    // Validate every line against the catalog and snapshot prices
    let mut total = rust_decimal::Decimal::ZERO;
    let mut validated = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::validation("Quantity must be greater than zero"));
        }
        let item = items::find_basic(&state.pool, &line.item_id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::ItemNotFound,
                    format!("Item with ID {} not found", line.item_id),
                )
            })?;
        if item.stock_quantity < line.quantity {
            return Err(AppError::with_message(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}. Available: {}, Requested: {}",
                    item.name, item.stock_quantity, line.quantity
                ),
            ));
        }
        total += money::to_decimal(item.price) * rust_decimal::Decimal::from(line.quantity);
        validated.push((item, line.quantity));
    }
    let total_amount = money::to_f64(total);

    // Delivery orders need an address owned by the caller
    let address_id = match order_type {
        OrderType::Delivery => {
            let id = delivery_address_id.ok_or_else(|| {
                AppError::validation("delivery_address_id is required for delivery orders")
            })?;
            let address = addresses::find_for_user(&state.pool, id, &user.id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::AddressNotFound))?;
            Some(address.id)
        }
        OrderType::Pickup => None,
    };

    let now = shared::util::now_millis();
    let order = Order {
        id: shared::util::new_id(),
        user_id: user.id.clone(),
        delivery_address_id: address_id,
        order_type: order_type.as_str().to_string(),
        status: OrderStatus::Pending.as_str().to_string(),
        payment_status: PaymentStatus::Pending.as_str().to_string(),
        payment_reference: None,
        total_amount,
        special_requests,
        notes: None,
        paid_at: None,
        created_at: now,
        updated_at: now,
    };
    let order_items: Vec<OrderItem> = validated
        .iter()
        .map(|(item, quantity)| OrderItem {
            id: shared::util::new_id(),
            order_id: order.id.clone(),
            item_id: item.id.clone(),
            quantity: *quantity,
            unit_price: item.price,
            subtotal: money::line_subtotal(item.price, *quantity),
        })
        .collect();

    orders::create_pending(&state.pool, &order, &order_items).await?;

    // Open the gateway session and persist the reference
    let reference = payment_reference(&order.id, now);
    let callback_url = format!("{}/checkout/callback?type=order", state.frontend_url);
    let metadata = json!({
        "order_id": order.id,
        "user_id": user.id,
        "custom_fields": [{
            "display_name": "Order ID",
            "variable_name": "order_id",
            "value": order.id,
        }],
    });

    let session = state
        .paystack
        .initialize_transaction(
            &user.email,
            money::to_minor_units(total_amount),
            &reference,
            &callback_url,
            metadata,
        )
        .await
        .map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "Paystack initialization failed");
            AppError::new(ErrorCode::PaymentInitFailed)
        })?;

    orders::set_reference(&state.pool, &order.id, &reference, now).await?;

    Ok(InitializedOrder {
        order_id: order.id,
        payment_url: session.authorization_url,
        reference,
        amount: total_amount,
    })
}

/// Apply a verified payment to the order it references.
///
/// Shared by the webhook and the manual-verify entry points so both enforce
/// the same amount guard and the same idempotency gate.
pub async fn reconcile(
    state: &AppState,
    verified: &VerifiedTransaction,
) -> AppResult<ReconcileOutcome> {
    let order = orders::find_by_reference(&state.pool, &verified.reference)
        .await?
        .ok_or_else(|| {
            tracing::warn!(reference = %verified.reference, "No order for payment reference");
            AppError::new(ErrorCode::OrderNotFound)
        })?;

    if !money::amounts_match(order.total_amount, verified.amount_minor) {
        tracing::warn!(
            order_id = %order.id,
            expected = money::to_minor_units(order.total_amount),
            paid = verified.amount_minor,
            "Amount mismatch, leaving order pending"
        );
        return Err(AppError::new(ErrorCode::AmountMismatch));
    }

    let now = shared::util::now_millis();
    match orders::confirm_paid(&state.pool, &order.id, now).await? {
        ConfirmOutcome::AlreadyCompleted => {
            tracing::info!(order_id = %order.id, "Payment already reconciled, skipping");
            Ok(ReconcileOutcome::AlreadyCompleted)
        }
        ConfirmOutcome::Applied => {
            tracing::info!(order_id = %order.id, "Payment confirmed");
            emit_confirmation(state, &order.id).await;
            Ok(ReconcileOutcome::Confirmed)
        }
    }
}

/// Webhook entry: re-verify the pushed reference against the gateway before
/// touching any state.
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

/// Manual-verify entry: query the gateway and, on success, apply the same
/// transition as the webhook.
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

/// Cancel a pending order (owner-only) and restore its stock.
pub async fn cancel(
    state: &AppState,
    user_id: &str,
    order_id: &str,
    reason: Option<&str>,
) -> AppResult<Order> {
    let now = shared::util::now_millis();
    match orders::cancel(&state.pool, order_id, user_id, reason, now).await? {
        CancelOutcome::NotFound => Err(AppError::new(ErrorCode::OrderNotFound)),
        CancelOutcome::NotCancellable => Err(AppError::new(ErrorCode::OrderNotCancellable)),
        CancelOutcome::Cancelled => {
            tracing::info!(order_id, "Order cancelled, stock restored");
            orders::find_by_id(&state.pool, order_id)
                .await?
                .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))
        }
    }
}

/// Assemble the full detail view of an order
pub async fn detail(pool: &SqlitePool, order: Order) -> AppResult<OrderDetail> {
    let order_items = orders::items_of(pool, &order.id).await?;
    let delivery_address = match &order.delivery_address_id {
        Some(id) => addresses::find_by_id(pool, id).await?.map(Into::into),
        None => None,
    };
    Ok(OrderDetail {
        order,
        items: order_items,
        delivery_address,
    })
}

/// Paginated listing of the caller's orders
pub async fn list(
    state: &AppState,
    user_id: &str,
    filter: &OrderListFilter,
) -> AppResult<(Vec<Order>, i64)> {
    Ok(orders::list_for_user(&state.pool, user_id, filter).await?)
}

/// Build the `new_online_order` payload for a confirmed order
pub async fn build_notification(
    pool: &SqlitePool,
    order_id: &str,
) -> AppResult<Option<OrderNotification>> {
    let Some(order) = orders::find_by_id(pool, order_id).await? else {
        return Ok(None);
    };
    let Some(user) = users::find_by_id(pool, &order.user_id).await? else {
        return Ok(None);
    };
    let order_items = orders::items_of(pool, order_id).await?;
    let delivery_address = match &order.delivery_address_id {
        Some(id) => addresses::find_by_id(pool, id).await?.map(Into::into),
        None => None,
    };

    Ok(Some(OrderNotification {
        order_id: order.id,
        customer_name: format!("{} {}", user.first_name, user.last_name),
        customer_email: user.email,
        customer_phone: user.phone_number,
        order_type: order.order_type,
        total_amount: order.total_amount,
        items: OrderNotification::items_from_details(&order_items),
        delivery_address,
        timestamp: shared::util::now_iso8601(),
        special_requests: order.special_requests,
    }))
}

/// Emit the confirmation notification. Failures are logged and swallowed;
/// they never roll back the payment.
async fn emit_confirmation(state: &AppState, order_id: &str) {
    match build_notification(&state.pool, order_id).await {
        Ok(Some(notification)) => state.notifier.notify_new_order(&notification).await,
        Ok(None) => {
            tracing::warn!(order_id, "Skipping notification, order or user missing");
        }
        Err(e) => {
            tracing::error!(order_id, error = %e, "Failed to build order notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_reference_format() {
        let reference = payment_reference("abc-123", 1_700_000_000_000);
        assert_eq!(reference, "ORD-abc-123-1700000000000");
        assert!(reference.starts_with("ORD-"));
    }
}
