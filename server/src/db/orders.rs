//! Order repository
//!
//! The confirmation and cancellation transactions live here. Both express
//! their state guard as a conditional UPDATE executed inside the transaction
//! (not a read followed by a write), so concurrent webhook and manual-verify
//! deliveries cannot both pass the gate. Stock mutations are relative deltas
//! applied at the storage layer.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderItem, OrderItemDetail};
use sqlx::SqlitePool;

/// Outcome of a confirmation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// Transition applied: status confirmed, stock decremented
    Applied,
    /// Payment was already reconciled; nothing changed
    AlreadyCompleted,
}

/// Outcome of a cancellation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Order cancelled, stock restored
    Cancelled,
    /// Order exists but is not pending
    NotCancellable,
    /// No such order for this user
    NotFound,
}

/// Listing filter for a user's orders
#[derive(Debug, Default, Clone)]
pub struct OrderListFilter {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Persist a pending order and all of its lines in one transaction; no
/// partial order/no-items state is ever observable.
pub async fn create_pending(
    pool: &SqlitePool,
    order: &Order,
    lines: &[OrderItem],
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, user_id, delivery_address_id, order_type, status, \
         payment_status, payment_reference, total_amount, special_requests, notes, paid_at, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
    )
    .bind(&order.id)
    .bind(&order.user_id)
    .bind(&order.delivery_address_id)
    .bind(&order.order_type)
    .bind(&order.status)
    .bind(&order.payment_status)
    .bind(&order.payment_reference)
    .bind(order.total_amount)
    .bind(&order.special_requests)
    .bind(&order.notes)
    .bind(order.paid_at)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *tx)
    .await?;

    for line in lines {
        sqlx::query(
            "INSERT INTO order_items (id, order_id, item_id, quantity, unit_price, subtotal) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.item_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.subtotal)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Store the gateway reference assigned at initialization
pub async fn set_reference(
    pool: &SqlitePool,
    order_id: &str,
    reference: &str,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET payment_reference = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(reference)
    .bind(now)
    .bind(order_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    }
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Order scoped to its owner
pub async fn find_for_user(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?1 AND user_id = ?2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_reference(pool: &SqlitePool, reference: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE payment_reference = ?")
        .bind(reference)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Lines of an order joined with the item name
pub async fn items_of(pool: &SqlitePool, order_id: &str) -> RepoResult<Vec<OrderItemDetail>> {
    let rows = sqlx::query_as::<_, OrderItemDetail>(
        "SELECT oi.id, oi.order_id, oi.item_id, i.name AS item_name, oi.quantity, \
         oi.unit_price, oi.subtotal \
         FROM order_items oi JOIN items i ON oi.item_id = i.id WHERE oi.order_id = ?",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Paginated listing of a user's orders, newest first
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    filter: &OrderListFilter,
) -> RepoResult<(Vec<Order>, i64)> {
    let mut where_clause = String::from("WHERE user_id = ?");
    if filter.status.is_some() {
        where_clause.push_str(" AND status = ?");
    }
    if filter.payment_status.is_some() {
        where_clause.push_str(" AND payment_status = ?");
    }
    if filter.search.is_some() {
        where_clause.push_str(" AND (id LIKE ? OR payment_reference LIKE ?)");
    }

    let count_sql = format!("SELECT COUNT(*) FROM orders {where_clause}");
    let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql).bind(user_id.to_string());
    let list_sql =
        format!("SELECT * FROM orders {where_clause} ORDER BY created_at DESC LIMIT ? OFFSET ?");
    let mut list_query = sqlx::query_as::<_, Order>(&list_sql).bind(user_id.to_string());

    if let Some(status) = &filter.status {
        count_query = count_query.bind(status.clone());
        list_query = list_query.bind(status.clone());
    }
    if let Some(payment_status) = &filter.payment_status {
        count_query = count_query.bind(payment_status.clone());
        list_query = list_query.bind(payment_status.clone());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        count_query = count_query.bind(pattern.clone()).bind(pattern.clone());
        list_query = list_query.bind(pattern.clone()).bind(pattern);
    }

    let (total,) = count_query.fetch_one(pool).await?;
    let rows = list_query
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

/// Apply the payment-confirmation transition exactly once.
///
/// The idempotency gate is the `payment_status <> 'completed'` predicate of
/// the first UPDATE, evaluated inside the transaction immediately before the
/// mutation. Re-delivered webhooks and webhook/verify races fall out as
/// [`ConfirmOutcome::AlreadyCompleted`] with no further effect.
///
/// Stock decrements ride in the same transaction: a crash between the status
/// flip and the stock writes cannot leave one without the other.
pub async fn confirm_paid(pool: &SqlitePool, order_id: &str, now: i64) -> RepoResult<ConfirmOutcome> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "UPDATE orders SET payment_status = 'completed', status = 'confirmed', \
         paid_at = ?1, updated_at = ?1 WHERE id = ?2 AND payment_status <> 'completed'",
    )
    .bind(now)
    .bind(order_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(ConfirmOutcome::AlreadyCompleted);
    }

    let lines: Vec<(String, i64)> =
        sqlx::query_as("SELECT item_id, quantity FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;

    for (item_id, quantity) in lines {
        // Relative delta at the storage layer; RETURNING makes oversell and
        // low stock observable without a separate read.
        let row: Option<(i64, i64)> = sqlx::query_as(
            "UPDATE items SET stock_quantity = stock_quantity - ?1, updated_at = ?2 \
             WHERE id = ?3 RETURNING stock_quantity, low_stock_threshold",
        )
        .bind(quantity)
        .bind(now)
        .bind(&item_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((stock, threshold)) = row {
            if stock < 0 {
                tracing::warn!(item_id = %item_id, stock, "Item oversold at confirmation");
            } else if stock <= threshold {
                tracing::warn!(item_id = %item_id, stock, threshold, "Item stock low");
            }
        }
    }

    tx.commit().await?;
    Ok(ConfirmOutcome::Applied)
}

/// Cancel a pending order and restore its stock, as one unit of work.
///
/// The `status = 'pending'` guard is part of the UPDATE itself, so a
/// concurrent confirmation cannot interleave between check and write.
pub async fn cancel(
    pool: &SqlitePool,
    order_id: &str,
    user_id: &str,
    reason: Option<&str>,
    now: i64,
) -> RepoResult<CancelOutcome> {
    let mut tx = pool.begin().await?;

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT status FROM orders WHERE id = ?1 AND user_id = ?2")
            .bind(order_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

    match existing.as_ref().map(|(status,)| status.as_str()) {
        None => {
            tx.rollback().await?;
            return Ok(CancelOutcome::NotFound);
        }
        Some(status) if status != "pending" => {
            tx.rollback().await?;
            return Ok(CancelOutcome::NotCancellable);
        }
        Some(_) => {}
    }

    let notes = match reason {
        Some(r) => format!("Cancellation reason: {r}"),
        None => "Order cancelled by user".to_string(),
    };

    let updated = sqlx::query(
        "UPDATE orders SET status = 'cancelled', notes = ?1, updated_at = ?2 \
         WHERE id = ?3 AND user_id = ?4 AND status = 'pending'",
    )
    .bind(&notes)
    .bind(now)
    .bind(order_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(CancelOutcome::NotCancellable);
    }

    let lines: Vec<(String, i64)> =
        sqlx::query_as("SELECT item_id, quantity FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;

    for (item_id, quantity) in lines {
        sqlx::query(
            "UPDATE items SET stock_quantity = stock_quantity + ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(quantity)
        .bind(now)
        .bind(&item_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(CancelOutcome::Cancelled)
}
