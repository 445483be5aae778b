//! Delivery address model
//!
//! The storage schema and the frontend disagree on field names
//! (`address` vs `street_address`, `postal_code` vs `zip_code`,
//! `is_primary` vs `is_default`). The translation lives here, in one place,
//! instead of ad hoc renames in handlers.

use serde::{Deserialize, Serialize};

/// Delivery address row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DeliveryAddress {
    pub id: String,
    pub user_id: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub phone_number: Option<String>,
    pub is_primary: bool,
    pub created_at: i64,
}

/// Address shape expected by the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDto {
    pub id: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
    pub is_default: bool,
}

impl From<DeliveryAddress> for AddressDto {
    fn from(addr: DeliveryAddress) -> Self {
        Self {
            id: addr.id,
            street_address: addr.address,
            city: addr.city,
            state: addr.state,
            zip_code: addr.postal_code,
            phone_number: addr.phone_number,
            is_default: addr.is_primary,
        }
    }
}
