//! Category repository

use super::RepoResult;
use shared::models::Category;
use sqlx::SqlitePool;

/// Category with its item count (storefront category bar)
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub id: String,
    pub name: String,
    pub count: i64,
}

pub async fn find_all_with_counts(pool: &SqlitePool) -> RepoResult<Vec<CategoryCount>> {
    let rows = sqlx::query_as::<_, CategoryCount>(
        "SELECT c.id, c.name, COUNT(i.id) AS count FROM categories c \
         LEFT JOIN items i ON i.category_id = c.id GROUP BY c.id, c.name ORDER BY c.name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn count_items(pool: &SqlitePool) -> RepoResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, category: &Category) -> RepoResult<()> {
    sqlx::query("INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(pool)
        .await?;
    Ok(())
}
