use axum::routing::get;
use axum::Router;

use crate::handlers::listings;
use crate::state::AppState;

/// Listing routes mounted at `/listings`.
///
/// ```text
/// GET /                   -> list_listings
/// GET /{id}               -> get_listing
/// GET /{id}/nearby/       -> nearby_listings
/// ```
///
/// The nearby route answers with and without the trailing slash.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(listings::list_listings))
        .route("/{id}", get(listings::get_listing))
        .route("/{id}/nearby/", get(listings::nearby_listings))
        .route("/{id}/nearby", get(listings::nearby_listings))
}
