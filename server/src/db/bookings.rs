//! Consultancy booking repository
//!
//! Structural sibling of `db::orders` without the stock side effects.

use super::{RepoError, RepoResult};
use shared::models::ConsultancyBooking;
use sqlx::SqlitePool;

/// Outcome of a booking confirmation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Applied,
    AlreadyPaid,
}

pub async fn create_pending(pool: &SqlitePool, booking: &ConsultancyBooking) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO consultancy_bookings (id, user_id, consultancy_type, description, \
         session_datetime, amount, status, payment_status, payment_reference, created_at, \
         updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&booking.id)
    .bind(&booking.user_id)
    .bind(&booking.consultancy_type)
    .bind(&booking.description)
    .bind(booking.session_datetime)
    .bind(booking.amount)
    .bind(&booking.status)
    .bind(&booking.payment_status)
    .bind(&booking.payment_reference)
    .bind(booking.created_at)
    .bind(booking.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_reference(
    pool: &SqlitePool,
    booking_id: &str,
    reference: &str,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE consultancy_bookings SET payment_reference = ?1, updated_at = ?2 WHERE id = ?3",
    )
    .bind(reference)
    .bind(now)
    .bind(booking_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Booking {booking_id} not found")));
    }
    Ok(())
}

pub async fn find_by_reference(
    pool: &SqlitePool,
    reference: &str,
) -> RepoResult<Option<ConsultancyBooking>> {
    let row = sqlx::query_as::<_, ConsultancyBooking>(
        "SELECT * FROM consultancy_bookings WHERE payment_reference = ?",
    )
    .bind(reference)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Booking scoped to its owner
pub async fn find_for_user(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> RepoResult<Option<ConsultancyBooking>> {
    let row = sqlx::query_as::<_, ConsultancyBooking>(
        "SELECT * FROM consultancy_bookings WHERE id = ?1 AND user_id = ?2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> RepoResult<Vec<ConsultancyBooking>> {
    let rows = sqlx::query_as::<_, ConsultancyBooking>(
        "SELECT * FROM consultancy_bookings WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Apply the payment-confirmation transition exactly once.
///
/// Same conditional-update idempotency gate as `db::orders::confirm_paid`,
/// with no stock step.
pub async fn confirm_paid(
    pool: &SqlitePool,
    booking_id: &str,
    now: i64,
) -> RepoResult<ConfirmOutcome> {
    let updated = sqlx::query(
        "UPDATE consultancy_bookings SET payment_status = 'paid', status = 'confirmed', \
         updated_at = ?1 WHERE id = ?2 AND payment_status <> 'paid'",
    )
    .bind(now)
    .bind(booking_id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Ok(ConfirmOutcome::AlreadyPaid);
    }
    Ok(ConfirmOutcome::Applied)
}
