//! Authentication API handlers
//!
//! Registration, email verification, login, password reset, profile.
//! Password-reset requests always answer success so the endpoint cannot be
//! used to enumerate accounts; the true outcome is only logged.

use axum::extract::{Extension, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use shared::error::ErrorCode;
use shared::models::{User, UserProfile};
use shared::util::{new_id, now_millis};
use shared::{ApiResponse, AppError, AppResult};

use crate::auth::jwt::{self, CurrentUser, TOKEN_TYPE_REFRESH};
use crate::auth::password::{hash_password, verify_password};
use crate::db::tokens::{
    PURPOSE_EMAIL_VERIFICATION, PURPOSE_PASSWORD_RESET, VerificationToken,
};
use crate::db::{addresses, tokens, users};
use crate::email;
use crate::state::AppState;

const EMAIL_TOKEN_TTL_MS: i64 = 24 * 60 * 60 * 1000;
const RESET_TOKEN_TTL_MS: i64 = 60 * 60 * 1000;

/// Random, URL-safe, single-use token value
fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn hash_error(e: argon2::password_hash::Error) -> AppError {
    tracing::error!(error = %e, "Password hash error");
    AppError::internal("Password hash error")
}

// ── Request types ──

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone_number: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    pub old_email: String,
    pub new_email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

// ── Handlers ──

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    let email = req.email.trim().to_lowercase();

    if users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailInUse));
    }

    let now = now_millis();
    let user = User {
        id: new_id(),
        first_name: req.first_name,
        last_name: req.last_name,
        email: email.clone(),
        phone_number: req.phone_number,
        password_hash: hash_password(&req.password).map_err(hash_error)?,
        role: "customer".to_string(),
        is_email_verified: false,
        is_active: true,
        created_at: now,
    };
    let token = VerificationToken {
        id: new_id(),
        user_id: user.id.clone(),
        token: generate_token(),
        purpose: PURPOSE_EMAIL_VERIFICATION.to_string(),
        expires_at: now + EMAIL_TOKEN_TTL_MS,
        is_used: false,
        created_at: now,
    };

    users::create_with_verification(&state.pool, &user, &token).await?;

    // Send after the transaction; roll the account back if delivery fails so
    // the address can be registered again.
    let verify_url = format!("{}/verify-email/{}", state.frontend_url, token.token);
    if let Err(e) = email::send_verification_email(
        &state.ses,
        &state.ses_from_email,
        &email,
        &user.first_name,
        &verify_url,
    )
    .await
    {
        tracing::error!(error = %e, "Verification email failed, rolling back registration");
        if let Err(cleanup) = users::delete(&state.pool, &user.id).await {
            tracing::error!(error = %cleanup, user_id = %user.id, "Registration cleanup failed");
        }
        return Err(AppError::new(ErrorCode::ExternalServiceError));
    }

    Ok(Json(ApiResponse::message(
        "Registration successful. Please check your email to verify your account.",
    )))
}

/// GET /api/v1/auth/verify-email/{token}
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    let record = tokens::find_unused(&state.pool, &token, PURPOSE_EMAIL_VERIFICATION)
        .await?
        .ok_or_else(|| AppError::validation("Invalid verification link"))?;

    if record.expires_at < now_millis() {
        return Err(AppError::validation("Verification link has expired"));
    }

    tokens::consume_and_verify_user(&state.pool, &record.id, &record.user_id).await?;
    Ok(Json(ApiResponse::message("Email verified successfully")))
}

/// POST /api/v1/auth/resend-verification
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let email_addr = req.email.trim().to_lowercase();
    let user = users::find_by_email(&state.pool, &email_addr)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::NotFound, "No account found with this email"))?;

    if user.is_email_verified {
        return Err(AppError::validation("Email is already verified"));
    }

    tokens::invalidate_all(&state.pool, &user.id, PURPOSE_EMAIL_VERIFICATION).await?;

    let now = now_millis();
    let token = VerificationToken {
        id: new_id(),
        user_id: user.id.clone(),
        token: generate_token(),
        purpose: PURPOSE_EMAIL_VERIFICATION.to_string(),
        expires_at: now + EMAIL_TOKEN_TTL_MS,
        is_used: false,
        created_at: now,
    };
    tokens::create(&state.pool, &token).await?;

    let verify_url = format!("{}/verify-email/{}", state.frontend_url, token.token);
    email::send_verification_email(
        &state.ses,
        &state.ses_from_email,
        &user.email,
        &user.first_name,
        &verify_url,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to resend verification email");
        AppError::new(ErrorCode::ExternalServiceError)
    })?;

    Ok(Json(ApiResponse::message("Verification email sent successfully")))
}

/// POST /api/v1/auth/change-email
pub async fn change_email(
    State(state): State<AppState>,
    Json(req): Json<ChangeEmailRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let old_email = req.old_email.trim().to_lowercase();
    let new_email = req.new_email.trim().to_lowercase();
    if new_email.is_empty() || !new_email.contains('@') {
        return Err(AppError::validation("Invalid email"));
    }

    let user = users::find_by_email(&state.pool, &old_email)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::NotFound, "No account found with this email"))?;

    if users::find_by_email(&state.pool, &new_email).await?.is_some() {
        return Err(AppError::with_message(
            ErrorCode::EmailInUse,
            "This email is already in use by another account",
        ));
    }

    users::change_email(&state.pool, &user.id, &new_email).await?;
    tokens::invalidate_all(&state.pool, &user.id, PURPOSE_EMAIL_VERIFICATION).await?;

    let now = now_millis();
    let token = VerificationToken {
        id: new_id(),
        user_id: user.id.clone(),
        token: generate_token(),
        purpose: PURPOSE_EMAIL_VERIFICATION.to_string(),
        expires_at: now + EMAIL_TOKEN_TTL_MS,
        is_used: false,
        created_at: now,
    };
    tokens::create(&state.pool, &token).await?;

    let verify_url = format!("{}/verify-email/{}", state.frontend_url, token.token);
    if let Err(e) = email::send_verification_email(
        &state.ses,
        &state.ses_from_email,
        &new_email,
        &user.first_name,
        &verify_url,
    )
    .await
    {
        tracing::error!(error = %e, "Verification email for changed address failed");
    }

    Ok(Json(ApiResponse::message(
        "Email changed successfully. Please verify your new email.",
    )))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let email_addr = req.email.trim().to_lowercase();
    let user = users::find_by_email(&state.pool, &email_addr)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    if !verify_password(&req.password, &user.password_hash) {
        return Err(AppError::invalid_credentials());
    }
    if !user.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    if !user.is_email_verified {
        return Err(AppError::new(ErrorCode::EmailNotVerified));
    }

    let token = jwt::create_access_token(&user.id, &user.email, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;
    let refresh_token = jwt::create_refresh_token(&user.id, &user.email, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    Ok(Json(ApiResponse::ok_with_message(
        "Login successful",
        LoginResponse {
            token,
            refresh_token,
            user: UserProfile::from_user(&user, None),
        },
    )))
}

/// POST /api/v1/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let claims = jwt::validate_token(&req.refresh_token, TOKEN_TYPE_REFRESH, &state.jwt_secret)?;

    let user = users::find_by_id(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let token = jwt::create_access_token(&user.id, &user.email, &state.jwt_secret)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    Ok(Json(ApiResponse::ok(json!({ "token": token }))))
}

/// POST /api/v1/auth/forgot-password
///
/// Always reports success; the real outcome is only visible server-side.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Json<ApiResponse<()>> {
    let outcome = request_password_reset(&state, &req.email).await;
    if let Err(e) = outcome {
        tracing::error!(error = %e, "Password reset request failed");
    }
    Json(ApiResponse::message(
        "If your email exists in our system, you will receive a password reset link shortly",
    ))
}

async fn request_password_reset(state: &AppState, email_addr: &str) -> AppResult<()> {
    let email_addr = email_addr.trim().to_lowercase();
    let Some(user) = users::find_by_email(&state.pool, &email_addr).await? else {
        tracing::info!("Password reset requested for unknown email");
        return Ok(());
    };

    tokens::invalidate_all(&state.pool, &user.id, PURPOSE_PASSWORD_RESET).await?;

    let now = now_millis();
    let token = VerificationToken {
        id: new_id(),
        user_id: user.id.clone(),
        token: generate_token(),
        purpose: PURPOSE_PASSWORD_RESET.to_string(),
        expires_at: now + RESET_TOKEN_TTL_MS,
        is_used: false,
        created_at: now,
    };
    tokens::create(&state.pool, &token).await?;

    let reset_url = format!("{}/reset-password/{}", state.frontend_url, token.token);
    email::send_password_reset_email(
        &state.ses,
        &state.ses_from_email,
        &user.email,
        &user.first_name,
        &reset_url,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to send password reset email");
        AppError::new(ErrorCode::ExternalServiceError)
    })
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let record = tokens::find_unused(&state.pool, &req.token, PURPOSE_PASSWORD_RESET)
        .await?
        .ok_or_else(|| AppError::validation("The password reset link is invalid or has expired"))?;

    if record.expires_at < now_millis() {
        return Err(AppError::validation("The password reset link has expired"));
    }

    let password_hash = hash_password(&req.new_password).map_err(hash_error)?;
    tokens::consume_and_reset_password(&state.pool, &record.id, &record.user_id, &password_hash)
        .await?;

    Ok(Json(ApiResponse::message("Password has been reset successfully")))
}

/// GET /api/v1/auth/validate-token
pub async fn validate_token(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::ok_with_message(
        "Token is valid",
        json!({ "user": { "id": user.id, "email": user.email } }),
    ))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let user = users::find_by_id(&state.pool, &current.id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;
    let address_rows = addresses::list_for_user(&state.pool, &user.id).await?;
    let address_dtos = address_rows.into_iter().map(Into::into).collect();

    let profile = UserProfile::from_user(&user, Some(address_dtos));
    Ok(Json(ApiResponse::ok(json!({ "user": profile }))))
}
