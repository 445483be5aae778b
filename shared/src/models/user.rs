//! User account model

use serde::{Deserialize, Serialize};

use super::address::AddressDto;

/// User row. Never serialized to the wire directly: the password hash must
/// not leave the server; use [`UserProfile`] for responses.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub created_at: i64,
}

/// Profile shape returned to the frontend (camelCase)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: String,
    pub is_email_verified: bool,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<AddressDto>>,
}

impl UserProfile {
    /// Build the profile DTO from a user row, optionally with addresses
    pub fn from_user(user: &User, addresses: Option<Vec<AddressDto>>) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role.clone(),
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
            addresses,
        }
    }

    /// Full customer name as shown in notifications
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
