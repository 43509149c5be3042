//! Handlers for the public listing feed, single listings, and the nearby
//! search.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use piata_core::error::CoreError;
use piata_core::geo::{LatLng, NEARBY_LIMIT};
use piata_core::listing::NearbyResponse;
use piata_core::query::{ListingFilter, NearbyQuery};
use piata_core::types::DbId;
use piata_db::repositories::ListingRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/listings
///
/// Active listings as a bare JSON array, newest first unless `ordering`
/// says otherwise.
pub async fn list_listings(
    State(state): State<AppState>,
    query: Result<Query<ListingFilter>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(filter) = query?;
    let ordering = filter.checked_ordering()?;

    let listings = ListingRepo::list_feed(&state.pool, &filter, ordering).await?;

    tracing::debug!(
        count = listings.len(),
        ordering = ordering.field,
        descending = ordering.descending,
        "Listing feed served",
    );

    Ok(Json(listings))
}

/// GET /api/listings/{id}
///
/// One active listing. Each successful read counts as a view.
pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let listing = ListingRepo::find_feed_by_id(&state.pool, listing_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        }))?;

    ListingRepo::increment_views(&state.pool, listing_id).await?;

    Ok(Json(listing))
}

/// GET /api/listings/{id}/nearby/
///
/// Active listings within `radius` km of this one, nearest first, capped
/// at six. The listing itself is never included. Like `GET /{id}`, a
/// listing that is not public is not found.
pub async fn nearby_listings(
    State(state): State<AppState>,
    Path(listing_id): Path<DbId>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = query?;
    let radius_km = params.radius_km()?;

    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Listing",
            id: listing_id,
        })
    };
    let listing = ListingRepo::find_by_id(&state.pool, listing_id)
        .await?
        .ok_or_else(not_found)?;
    if !listing.status()?.is_public() {
        return Err(not_found());
    }

    let (Some(lat), Some(lng)) = (listing.latitude, listing.longitude) else {
        return Err(AppError::BadRequest(format!(
            "Listing {listing_id} has no coordinates"
        )));
    };
    let center = LatLng::new(lat, lng)?;

    let listings =
        ListingRepo::find_nearby(&state.pool, listing_id, center, radius_km, NEARBY_LIMIT).await?;

    tracing::debug!(
        listing_id,
        radius_km,
        count = listings.len(),
        "Nearby listings served",
    );

    Ok(Json(NearbyResponse { listings }))
}
