//! Real-time notification payloads
//!
//! One event, `new_online_order`, is broadcast to every connected desktop
//! client when an order's payment is confirmed. The payload shape is part of
//! the desktop client contract, hence it lives in `shared`.

use serde::{Deserialize, Serialize};

use crate::models::{AddressDto, OrderItemDetail};

/// Socket.io event name for confirmed online orders
pub const NEW_ONLINE_ORDER: &str = "new_online_order";

/// One line of a notified order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationItem {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Payload of the `new_online_order` event (camelCase on the wire)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNotification {
    pub order_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub order_type: String,
    pub total_amount: f64,
    pub items: Vec<NotificationItem>,
    pub delivery_address: Option<AddressDto>,
    /// ISO-8601 confirmation time
    pub timestamp: String,
    pub special_requests: Option<String>,
}

impl OrderNotification {
    /// Map order lines into the notification item shape
    pub fn items_from_details(items: &[OrderItemDetail]) -> Vec<NotificationItem> {
        items
            .iter()
            .map(|line| NotificationItem {
                name: line.item_name.clone(),
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_camel_case() {
        let n = OrderNotification {
            order_id: "o-1".into(),
            customer_name: "Ada Obi".into(),
            customer_email: "ada@example.com".into(),
            customer_phone: None,
            order_type: "delivery".into(),
            total_amount: 2900.0,
            items: vec![],
            delivery_address: None,
            timestamp: "2024-05-01T12:00:00.000Z".into(),
            special_requests: None,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert!(json.get("orderId").is_some());
        assert!(json.get("totalAmount").is_some());
        assert!(json.get("order_id").is_none());
    }

    #[test]
    fn test_items_mapping_uses_unit_price() {
        let lines = vec![crate::models::OrderItemDetail {
            id: "l-1".into(),
            order_id: "o-1".into(),
            item_id: "i-1".into(),
            item_name: "Jollof Rice".into(),
            quantity: 3,
            unit_price: 800.0,
            subtotal: 2400.0,
        }];
        let items = OrderNotification::items_from_details(&lines);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].price, 800.0);
        assert_eq!(items[0].quantity, 3);
    }
}
