//! Order and order-item models

use serde::{Deserialize, Serialize};

use super::address::AddressDto;

/// Order lifecycle status. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Payment status of an order. Stored as lowercase TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Order type (fulfilment mode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Pickup,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Delivery => "delivery",
        }
    }
}

/// Order row. Amounts are in major currency units.
///
/// `total_amount` is fixed at creation time (sum of line subtotals) and is
/// never recomputed, even if catalog prices change later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub delivery_address_id: Option<String>,
    pub order_type: String,
    pub status: String,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub total_amount: f64,
    pub special_requests: Option<String>,
    pub notes: Option<String>,
    pub paid_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line row. `unit_price` is a frozen snapshot of the item price at
/// order time, decoupled from later catalog price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Order line joined with the item name (detail views, notifications)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemDetail {
    pub id: String,
    pub order_id: String,
    pub item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Full order detail returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    pub delivery_address: Option<AddressDto>,
}

/// One requested line of a new order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub quantity: i64,
}
