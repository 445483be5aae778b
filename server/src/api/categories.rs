//! Category read API

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use shared::{ApiResponse, AppResult};

use crate::db::categories;
use crate::state::AppState;

/// GET /api/v1/categories — all categories with item counts, prefixed by the
/// frontend's synthetic "All Products" entry.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Value>>>> {
    let counts = categories::find_all_with_counts(&state.pool).await?;
    let total = categories::count_items(&state.pool).await?;

    let mut entries = vec![json!({ "id": "all", "name": "All Products", "count": total })];
    entries.extend(
        counts
            .into_iter()
            .map(|c| json!({ "id": c.id, "name": c.name, "count": c.count })),
    );

    Ok(Json(ApiResponse::ok(entries)))
}
