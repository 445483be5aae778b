//! Catalog read-path tests: filtered listing and the storefront DTO shape.

mod common;

use common::{GatewayStub, seed_item, test_state};
use shared::models::Category;
use shared::util::{new_id, now_millis};
use storefront_server::db::{categories, items};

#[tokio::test]
async fn listing_filters_by_category_and_search() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;

    let mains = Category {
        id: new_id(),
        name: "Mains".into(),
        description: None,
        created_at: now_millis(),
    };
    categories::create(&state.pool, &mains).await.unwrap();

    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;
    sqlx::query("UPDATE items SET category_id = ? WHERE id = ?")
        .bind(&mains.id)
        .bind(&rice.id)
        .execute(&state.pool)
        .await
        .unwrap();
    seed_item(&state, "Chapman", 500.0, 5).await;

    // Category filter
    let rows = items::find_all(&state.pool, Some(&mains.id), None)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Jollof Rice");
    assert_eq!(rows[0].category_name.as_deref(), Some("Mains"));

    // Case-insensitive search over the name
    let rows = items::find_all(&state.pool, None, Some("jollof")).await.unwrap();
    assert_eq!(rows.len(), 1);

    // No filter returns everything
    let rows = items::find_all(&state.pool, None, None).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn category_counts_reflect_item_assignment() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;

    let mains = Category {
        id: new_id(),
        name: "Mains".into(),
        description: None,
        created_at: now_millis(),
    };
    categories::create(&state.pool, &mains).await.unwrap();

    let rice = seed_item(&state, "Jollof Rice", 800.0, 10).await;
    sqlx::query("UPDATE items SET category_id = ? WHERE id = ?")
        .bind(&mains.id)
        .bind(&rice.id)
        .execute(&state.pool)
        .await
        .unwrap();
    seed_item(&state, "Chapman", 500.0, 5).await;

    let counts = categories::find_all_with_counts(&state.pool).await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].count, 1);
    assert_eq!(categories::count_items(&state.pool).await.unwrap(), 2);
}

#[tokio::test]
async fn product_view_reports_stock_state() {
    let stub = GatewayStub::default();
    let (state, _) = test_state(&stub).await;

    let sold_out = seed_item(&state, "Meat Pie", 350.0, 0).await;
    let row = items::find_by_id(&state.pool, &sold_out.id)
        .await
        .unwrap()
        .unwrap();
    let view: shared::models::ProductView = row.into();
    assert!(!view.in_stock);
    assert_eq!(view.stock_quantity, 0);
    assert_eq!(view.category, "Uncategorized");
}
