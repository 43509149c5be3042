//! Repository for the `listings` table, including the public feed and the
//! nearby search.

use std::collections::HashMap;

use piata_core::geo::LatLng;
use piata_core::listing::{FeedImage, FeedListing, ListingStatus, NearbyListing};
use piata_core::query::{ListingFilter, Ordering};
use piata_core::types::DbId;
use sqlx::PgPool;

use crate::models::listing::{CreateListing, FeedRow, Listing, NearbyRow};
use crate::repositories::ListingImageRepo;

/// Column list for listings queries.
const COLUMNS: &str = "id, title, description, price::float8 AS price, currency, location, \
    latitude, longitude, status, user_id, category_id, views, deleted_at, created_at, updated_at";

/// Columns of the joined feed row.
const FEED_COLUMNS: &str = "l.id, l.title, l.description, l.price::float8 AS price, \
    l.currency, l.location, u.username, c.name AS category_name";

/// Joins shared by every feed query.
const FEED_FROM: &str = "FROM listings l \
    JOIN users u ON u.id = l.user_id \
    JOIN categories c ON c.id = l.category_id";

/// Provides CRUD operations, the public feed, and the nearby search.
pub struct ListingRepo;

impl ListingRepo {
    /// Find a non-deleted listing by ID, regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Listing>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM listings WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Listing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the oldest listing with the given title, soft-deleted or not.
    pub async fn find_first_by_title(
        pool: &PgPool,
        title: &str,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings
             WHERE title = $1
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// Insert a listing, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateListing) -> Result<Listing, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings
                (title, description, price, currency, location, latitude, longitude,
                 status, user_id, category_id)
             VALUES ($1, $2, $3, COALESCE($4, 'RON'), $5, $6, $7,
                     COALESCE($8, 'pending'), $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.currency)
            .bind(&input.location)
            .bind(input.latitude)
            .bind(input.longitude)
            .bind(&input.status)
            .bind(input.user_id)
            .bind(input.category_id)
            .fetch_one(pool)
            .await
    }

    /// Active, non-deleted listings matching `filter`, with owner, category
    /// and images embedded.
    pub async fn list_feed(
        pool: &PgPool,
        filter: &ListingFilter,
        ordering: Ordering,
    ) -> Result<Vec<FeedListing>, sqlx::Error> {
        let query = format!(
            "SELECT {FEED_COLUMNS} {FEED_FROM}
             WHERE l.status = $1 AND l.deleted_at IS NULL
               AND ($2::bigint IS NULL OR l.category_id = $2 OR c.parent_id = $2)
               AND ($3::float8 IS NULL OR l.price >= $3)
               AND ($4::float8 IS NULL OR l.price <= $4)
               AND ($5::text IS NULL OR l.location ILIKE $5)
               AND ($6::text IS NULL
                    OR l.title ILIKE $6 OR l.description ILIKE $6 OR l.location ILIKE $6)
             ORDER BY {}",
            ordering.to_sql()
        );
        let location = non_empty(filter.location.as_deref()).map(ListingFilter::like_pattern);
        let search = non_empty(filter.search.as_deref()).map(ListingFilter::like_pattern);

        let rows = sqlx::query_as::<_, FeedRow>(&query)
            .bind(ListingStatus::Active.as_str())
            .bind(filter.category)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(location)
            .bind(search)
            .fetch_all(pool)
            .await?;

        Self::attach_images(pool, rows).await
    }

    /// One active, non-deleted listing in feed shape.
    pub async fn find_feed_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FeedListing>, sqlx::Error> {
        let query = format!(
            "SELECT {FEED_COLUMNS} {FEED_FROM}
             WHERE l.id = $1 AND l.status = $2 AND l.deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, FeedRow>(&query)
            .bind(id)
            .bind(ListingStatus::Active.as_str())
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => Ok(Self::attach_images(pool, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Bump the view counter. Returns `true` if the listing exists.
    pub async fn increment_views(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings SET views = views + 1 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active listings within `radius_km` of `center`, nearest first,
    /// excluding `exclude_id`, at most `limit` of them.
    ///
    /// Rows are pre-filtered by a bounding box in SQL, split in two when it
    /// crosses the antimeridian; the exact haversine distance is applied here.
    pub async fn find_nearby(
        pool: &PgPool,
        exclude_id: DbId,
        center: LatLng,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyListing>, sqlx::Error> {
        let (lat_delta, lng_delta) = center.bounding_deltas(radius_km);
        let (lng_low, lng_high, lng_wrapped) = center.longitude_window(lng_delta).bounds();
        let rows = sqlx::query_as::<_, NearbyRow>(
            "SELECT l.id, l.title, l.price::float8 AS price, l.latitude, l.longitude,
                    (SELECT i.image FROM listing_images i
                     WHERE i.listing_id = l.id
                     ORDER BY i.is_main DESC, i.display_order ASC, i.created_at ASC, i.id ASC
                     LIMIT 1) AS image_url
             FROM listings l
             WHERE l.status = $1 AND l.deleted_at IS NULL AND l.id <> $2
               AND l.latitude IS NOT NULL AND l.longitude IS NOT NULL
               AND l.latitude BETWEEN $3 AND $4
               AND CASE WHEN $7
                        THEN l.longitude >= $5 OR l.longitude <= $6
                        ELSE l.longitude BETWEEN $5 AND $6
                   END",
        )
        .bind(ListingStatus::Active.as_str())
        .bind(exclude_id)
        .bind(center.lat - lat_delta)
        .bind(center.lat + lat_delta)
        .bind(lng_low)
        .bind(lng_high)
        .bind(lng_wrapped)
        .fetch_all(pool)
        .await?;

        let mut within: Vec<(f64, NearbyRow)> = rows
            .into_iter()
            .map(|row| {
                let d = piata_core::geo::haversine_km(
                    center.lat,
                    center.lng,
                    row.latitude,
                    row.longitude,
                );
                (d, row)
            })
            .filter(|(d, _)| *d <= radius_km)
            .collect();
        within.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));

        Ok(within
            .into_iter()
            .take(limit)
            .map(|(_, row)| row.into())
            .collect())
    }

    /// Soft-delete a listing. Returns `false` if it was already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE listings SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a listing and, by cascade, its images.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---- private helpers ----

    /// Fetch the images of all `rows` in one query and embed them.
    async fn attach_images(
        pool: &PgPool,
        rows: Vec<FeedRow>,
    ) -> Result<Vec<FeedListing>, sqlx::Error> {
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut by_listing: HashMap<DbId, Vec<FeedImage>> = HashMap::new();
        for image in ListingImageRepo::list_for_listings(pool, &ids).await? {
            by_listing
                .entry(image.listing_id)
                .or_default()
                .push(image.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let images = by_listing.remove(&row.id).unwrap_or_default();
                row.into_feed(images)
            })
            .collect())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
