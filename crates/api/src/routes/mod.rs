pub mod categories;
pub mod health;
pub mod listings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /listings                      feed (filters: category, min_price,
///                                max_price, location, search, ordering)
/// /listings/{id}                 single listing, counts a view
/// /listings/{id}/nearby/         nearby listings (?radius=km)
///
/// /categories                    category tree
/// /categories/{id}/listings      feed of one category and its children
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/listings", listings::router())
        .nest("/categories", categories::router())
}
