//! Item (catalog) repository
//!
//! Pure read path plus seed inserts. Stock mutations live in the order
//! confirmation/cancellation transactions (`db::orders`), never here.

use super::RepoResult;
use shared::models::{Item, ItemWithCategory};
use sqlx::SqlitePool;

const ITEM_WITH_CATEGORY_SELECT: &str = "SELECT i.id, i.category_id, c.name AS category_name, \
     i.name, i.description, i.price, i.image_url, i.stock_quantity, i.low_stock_threshold, \
     i.is_available, i.created_at, i.updated_at \
     FROM items i LEFT JOIN categories c ON i.category_id = c.id";

/// List available items, optionally filtered by category and/or a
/// case-insensitive search over name and description.
pub async fn find_all(
    pool: &SqlitePool,
    category_id: Option<&str>,
    search: Option<&str>,
) -> RepoResult<Vec<ItemWithCategory>> {
    let mut sql = format!("{ITEM_WITH_CATEGORY_SELECT} WHERE i.is_available = 1");
    if category_id.is_some() {
        sql.push_str(" AND i.category_id = ?");
    }
    if search.is_some() {
        sql.push_str(" AND (i.name LIKE ? OR i.description LIKE ?)");
    }
    sql.push_str(" ORDER BY i.name");

    let mut query = sqlx::query_as::<_, ItemWithCategory>(&sql);
    if let Some(category) = category_id {
        query = query.bind(category.to_string());
    }
    if let Some(term) = search {
        let pattern = format!("%{term}%");
        query = query.bind(pattern.clone()).bind(pattern);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<ItemWithCategory>> {
    let sql = format!("{ITEM_WITH_CATEGORY_SELECT} WHERE i.id = ?");
    let row = sqlx::query_as::<_, ItemWithCategory>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Plain item row without the category join (order validation path)
pub async fn find_basic(pool: &SqlitePool, id: &str) -> RepoResult<Option<Item>> {
    let row = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Current stock counter for an item
pub async fn stock_of(pool: &SqlitePool, id: &str) -> RepoResult<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT stock_quantity FROM items WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(stock,)| stock))
}

pub async fn create(pool: &SqlitePool, item: &Item) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO items (id, category_id, name, description, price, image_url, \
         stock_quantity, low_stock_threshold, is_available, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )
    .bind(&item.id)
    .bind(&item.category_id)
    .bind(&item.name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.image_url)
    .bind(item.stock_quantity)
    .bind(item.low_stock_threshold)
    .bind(item.is_available)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}
