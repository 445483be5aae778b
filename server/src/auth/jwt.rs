//! JWT issuing and validation for customer authentication

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::AppError;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

const ACCESS_EXPIRY_HOURS: i64 = 24;
const REFRESH_EXPIRY_DAYS: i64 = 7;

/// JWT claims for customer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User email
    pub email: String,
    /// `"access"` or `"refresh"`
    pub token_type: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Authenticated identity injected into request extensions by the auth
/// middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

fn create_token(
    user_id: &str,
    email: &str,
    token_type: &str,
    ttl: chrono::Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: token_type.to_string(),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn create_access_token(
    user_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(
        user_id,
        email,
        TOKEN_TYPE_ACCESS,
        chrono::Duration::hours(ACCESS_EXPIRY_HOURS),
        secret,
    )
}

pub fn create_refresh_token(
    user_id: &str,
    email: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(
        user_id,
        email,
        TOKEN_TYPE_REFRESH,
        chrono::Duration::days(REFRESH_EXPIRY_DAYS),
        secret,
    )
}

/// Validate a token of the expected type and return its claims
pub fn validate_token(token: &str, expected_type: &str, secret: &str) -> Result<Claims, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::token_expired(),
        _ => AppError::invalid_token("Invalid token"),
    })?
    .claims;

    if claims.token_type != expected_type {
        return Err(AppError::invalid_token("Wrong token type"));
    }
    Ok(claims)
}

/// Extract the bearer token from an Authorization header value
pub fn extract_from_header(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-at-least-32-characters!!";

    #[test]
    fn test_access_token_round_trip() {
        let token = create_access_token("user-1", "ada@example.com", SECRET).unwrap();
        let claims = validate_token(&token, TOKEN_TYPE_ACCESS, SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let token = create_refresh_token("user-1", "ada@example.com", SECRET).unwrap();
        let err = validate_token(&token, TOKEN_TYPE_ACCESS, SECRET).unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::TokenInvalid);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token("user-1", "ada@example.com", SECRET).unwrap();
        assert!(validate_token(&token, TOKEN_TYPE_ACCESS, "another-secret-value-entirely!!!").is_err());
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(extract_from_header("Basic abc"), None);
    }
}
