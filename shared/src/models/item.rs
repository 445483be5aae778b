//! Item (catalog product) model

use serde::{Deserialize, Serialize};

/// Catalog item. Prices are in major currency units.
///
/// `stock_quantity` is only ever mutated by payment reconciliation
/// (decrement on confirm, increment on cancel); order creation reads it
/// but never writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub low_stock_threshold: i64,
    pub is_available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Item joined with its category name (list/detail queries)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ItemWithCategory {
    pub id: String,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub stock_quantity: i64,
    pub low_stock_threshold: i64,
    pub is_available: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Storefront product shape expected by the web frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub image: Option<String>,
    pub description: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: i64,
}

impl From<ItemWithCategory> for ProductView {
    fn from(item: ItemWithCategory) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item
                .category_name
                .unwrap_or_else(|| "Uncategorized".to_string()),
            price: item.price,
            image: item.image_url,
            description: item.description,
            in_stock: item.stock_quantity > 0,
            stock_quantity: item.stock_quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> ItemWithCategory {
        ItemWithCategory {
            id: "item-1".into(),
            category_id: Some("cat-1".into()),
            category_name: None,
            name: "Jollof Rice".into(),
            description: Some("Party style".into()),
            price: 800.0,
            image_url: None,
            stock_quantity: 0,
            low_stock_threshold: 5,
            is_available: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_product_view_defaults_category() {
        let view: ProductView = sample_item().into();
        assert_eq!(view.category, "Uncategorized");
        assert!(!view.in_stock);
    }
}
