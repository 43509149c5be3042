use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use piata_core::error::CoreError;
use piata_core::query::ListingFilter;
use piata_core::types::DbId;
use piata_db::repositories::{CategoryRepo, ListingRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/categories
///
/// Root categories with their direct children, both by name.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tree = CategoryRepo::list_tree(&state.pool).await?;
    Ok(Json(tree))
}

/// GET /api/categories/{id}/listings
///
/// The feed restricted to one category and its children. Accepts the same
/// filters as `/api/listings`; the path id overrides `category`.
pub async fn category_listings(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    query: Result<Query<ListingFilter>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(mut filter) = query?;

    CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    filter.category = Some(category_id);
    let ordering = filter.checked_ordering()?;
    let listings = ListingRepo::list_feed(&state.pool, &filter, ordering).await?;

    Ok(Json(listings))
}
