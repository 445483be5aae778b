//! Consultancy booking model
//!
//! Lifecycle mirrors orders (pending → confirmed, payment pending → paid)
//! but carries no stock side effects.

use serde::{Deserialize, Serialize};

/// Booking lifecycle status. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

/// Payment status of a booking. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingPaymentStatus {
    Pending,
    Paid,
}

impl BookingPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

/// Consultancy booking row. `amount` is a fixed constant set at creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ConsultancyBooking {
    pub id: String,
    pub user_id: String,
    pub consultancy_type: String,
    pub description: String,
    pub session_datetime: i64,
    pub amount: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
