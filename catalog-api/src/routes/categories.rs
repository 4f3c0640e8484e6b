/// Category endpoints
///
/// Read-only: categories are managed out of band and referenced by
/// products.
///
/// # Endpoints
///
/// - `GET /categories` - all categories
/// - `GET /categories/:id` - one category by id

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use catalog_shared::models::category::Category;

/// Lists all categories
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    let categories = Category::list(&state.db).await?;
    Ok(Json(categories))
}

/// Category detail; 404 when the id does not exist
pub async fn category_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Category>> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Category {} not found", id)))?;

    Ok(Json(category))
}
