//! User repository

use super::{RepoError, RepoResult, tokens::VerificationToken};
use shared::models::User;
use sqlx::SqlitePool;

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Create a user together with their email-verification token.
///
/// One transaction: a user without a pending verification token is never
/// observable.
pub async fn create_with_verification(
    pool: &SqlitePool,
    user: &User,
    token: &VerificationToken,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, first_name, last_name, email, phone_number, password_hash, \
         role, is_email_verified, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.phone_number)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(user.is_email_verified)
    .bind(user.is_active)
    .bind(user.created_at)
    .execute(&mut *tx)
    .await?;

    super::tokens::insert(&mut tx, token).await?;

    tx.commit().await?;
    Ok(())
}

/// Remove a user and any tokens (cleanup when the verification email could
/// not be sent).
pub async fn delete(pool: &SqlitePool, id: &str) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM verification_tokens WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone_number: Option<&str>,
) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE users SET first_name = COALESCE(?1, first_name), \
         last_name = COALESCE(?2, last_name), \
         phone_number = COALESCE(?3, phone_number) WHERE id = ?4",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(phone_number)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Change a user's email and drop their verified flag until the new address
/// is confirmed.
pub async fn change_email(pool: &SqlitePool, id: &str, new_email: &str) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE users SET email = ?1, is_email_verified = 0 WHERE id = ?2")
        .bind(new_email)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

/// Insert a user directly (tests and seed tooling)
pub async fn create(pool: &SqlitePool, user: &User) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO users (id, first_name, last_name, email, phone_number, password_hash, \
         role, is_email_verified, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.phone_number)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(user.is_email_verified)
    .bind(user.is_active)
    .bind(user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}
