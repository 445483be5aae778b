//! Product (catalog) read API

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use shared::models::ProductView;
use shared::{ApiResponse, AppError, AppResult, ErrorCode};

use crate::db::items;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// GET /api/v1/products — filtered catalog listing
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<ProductView>>>> {
    // "all" is the frontend's pseudo-category meaning no filter
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "all");
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let rows = items::find_all(&state.pool, category, search).await?;
    let products = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::ok(products)))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ProductView>>> {
    let item = items::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::ItemNotFound, "Product not found"))?;
    Ok(Json(ApiResponse::ok(item.into())))
}
