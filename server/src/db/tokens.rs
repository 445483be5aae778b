//! Verification token repository
//!
//! Single-use, expiring tokens for email verification and password reset.

use super::RepoResult;
use sqlx::{Sqlite, SqlitePool, Transaction};

pub const PURPOSE_EMAIL_VERIFICATION: &str = "email_verification";
pub const PURPOSE_PASSWORD_RESET: &str = "password_reset";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VerificationToken {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub purpose: String,
    pub expires_at: i64,
    pub is_used: bool,
    pub created_at: i64,
}

pub async fn insert(tx: &mut Transaction<'_, Sqlite>, token: &VerificationToken) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO verification_tokens (id, user_id, token, purpose, expires_at, is_used, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&token.id)
    .bind(&token.user_id)
    .bind(&token.token)
    .bind(&token.purpose)
    .bind(token.expires_at)
    .bind(token.is_used)
    .bind(token.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn create(pool: &SqlitePool, token: &VerificationToken) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    insert(&mut tx, token).await?;
    tx.commit().await?;
    Ok(())
}

/// Find an unused token for the given purpose. The caller decides whether an
/// expired token is an error distinct from an unknown one.
pub async fn find_unused(
    pool: &SqlitePool,
    token: &str,
    purpose: &str,
) -> RepoResult<Option<VerificationToken>> {
    let row = sqlx::query_as::<_, VerificationToken>(
        "SELECT * FROM verification_tokens WHERE token = ?1 AND purpose = ?2 AND is_used = 0",
    )
    .bind(token)
    .bind(purpose)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Invalidate all outstanding tokens of a purpose for a user (before issuing
/// a replacement).
pub async fn invalidate_all(pool: &SqlitePool, user_id: &str, purpose: &str) -> RepoResult<()> {
    sqlx::query(
        "UPDATE verification_tokens SET is_used = 1 WHERE user_id = ?1 AND purpose = ?2 AND is_used = 0",
    )
    .bind(user_id)
    .bind(purpose)
    .execute(pool)
    .await?;
    Ok(())
}

/// Consume an email-verification token and mark the user verified, as one
/// unit of work.
pub async fn consume_and_verify_user(
    pool: &SqlitePool,
    token_id: &str,
    user_id: &str,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE verification_tokens SET is_used = 1 WHERE id = ?")
        .bind(token_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE users SET is_email_verified = 1 WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Consume a password-reset token and store the new password hash, as one
/// unit of work.
pub async fn consume_and_reset_password(
    pool: &SqlitePool,
    token_id: &str,
    user_id: &str,
    password_hash: &str,
) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE verification_tokens SET is_used = 1 WHERE id = ?")
        .bind(token_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE users SET password_hash = ?1 WHERE id = ?2")
        .bind(password_hash)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
