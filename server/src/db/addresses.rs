//! Delivery address repository
//!
//! Invariant: at most one primary address per user. Setting a new primary
//! clears the others inside the same transaction.

use super::{RepoError, RepoResult};
use shared::models::DeliveryAddress;
use sqlx::SqlitePool;

pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<DeliveryAddress>> {
    let rows = sqlx::query_as::<_, DeliveryAddress>(
        "SELECT * FROM delivery_addresses WHERE user_id = ? ORDER BY is_primary DESC, created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<DeliveryAddress>> {
    let row = sqlx::query_as::<_, DeliveryAddress>("SELECT * FROM delivery_addresses WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Address scoped to its owner; an id belonging to another user is treated
/// as absent.
pub async fn find_for_user(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> RepoResult<Option<DeliveryAddress>> {
    let row = sqlx::query_as::<_, DeliveryAddress>(
        "SELECT * FROM delivery_addresses WHERE id = ?1 AND user_id = ?2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, address: &DeliveryAddress) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    if address.is_primary {
        sqlx::query("UPDATE delivery_addresses SET is_primary = 0 WHERE user_id = ?")
            .bind(&address.user_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        "INSERT INTO delivery_addresses (id, user_id, address, city, state, postal_code, \
         phone_number, is_primary, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&address.id)
    .bind(&address.user_id)
    .bind(&address.address)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.phone_number)
    .bind(address.is_primary)
    .bind(address.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, address: &DeliveryAddress) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    if address.is_primary {
        sqlx::query(
            "UPDATE delivery_addresses SET is_primary = 0 WHERE user_id = ?1 AND id <> ?2",
        )
        .bind(&address.user_id)
        .bind(&address.id)
        .execute(&mut *tx)
        .await?;
    }

    let rows = sqlx::query(
        "UPDATE delivery_addresses SET address = ?1, city = ?2, state = ?3, postal_code = ?4, \
         phone_number = ?5, is_primary = ?6 WHERE id = ?7 AND user_id = ?8",
    )
    .bind(&address.address)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.phone_number)
    .bind(address.is_primary)
    .bind(&address.id)
    .bind(&address.user_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Address {} not found",
            address.id
        )));
    }

    tx.commit().await?;
    Ok(())
}
