//! Authentication middleware
//!
//! Validates the `Authorization: Bearer <token>` header and injects
//! [`CurrentUser`] into request extensions for downstream handlers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::AppError;

use super::jwt::{self, CurrentUser, TOKEN_TYPE_ACCESS};
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => jwt::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::debug!(uri = %req.uri(), "Missing Authorization header");
            return Err(AppError::unauthorized());
        }
    };

    let claims = jwt::validate_token(token, TOKEN_TYPE_ACCESS, &state.jwt_secret)?;
    req.extensions_mut().insert(CurrentUser::from(claims));
    Ok(next.run(req).await)
}
