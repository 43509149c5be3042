//! Repository for the `listing_images` table.

use piata_core::types::DbId;
use sqlx::PgPool;

use crate::models::listing_image::{CreateListingImage, ListingImage};

/// Column list for listing_images queries.
const COLUMNS: &str = "id, listing_id, image, is_main, display_order, created_at";

/// Provides reads and inserts for listing images.
pub struct ListingImageRepo;

impl ListingImageRepo {
    /// Images of one listing in display order.
    pub async fn list_for_listing(
        pool: &PgPool,
        listing_id: DbId,
    ) -> Result<Vec<ListingImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listing_images
             WHERE listing_id = $1
             ORDER BY display_order ASC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ListingImage>(&query)
            .bind(listing_id)
            .fetch_all(pool)
            .await
    }

    /// Images of many listings, grouped by listing and in display order.
    pub async fn list_for_listings(
        pool: &PgPool,
        listing_ids: &[DbId],
    ) -> Result<Vec<ListingImage>, sqlx::Error> {
        if listing_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM listing_images
             WHERE listing_id = ANY($1)
             ORDER BY listing_id ASC, display_order ASC, created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ListingImage>(&query)
            .bind(listing_ids)
            .fetch_all(pool)
            .await
    }

    /// Find an image of a listing by its stored reference.
    pub async fn find_by_listing_and_image(
        pool: &PgPool,
        listing_id: DbId,
        image: &str,
    ) -> Result<Option<ListingImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listing_images
             WHERE listing_id = $1 AND image = $2
             ORDER BY id ASC
             LIMIT 1"
        );
        sqlx::query_as::<_, ListingImage>(&query)
            .bind(listing_id)
            .bind(image)
            .fetch_optional(pool)
            .await
    }

    /// Attach an image to a listing.
    ///
    /// When the new image is flagged as main, the flag is cleared on the
    /// listing's other images in the same transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateListingImage,
    ) -> Result<ListingImage, sqlx::Error> {
        let is_main = input.is_main.unwrap_or(false);
        let mut tx = pool.begin().await?;

        if is_main {
            sqlx::query(
                "UPDATE listing_images SET is_main = false \
                 WHERE listing_id = $1 AND is_main = true",
            )
            .bind(input.listing_id)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "INSERT INTO listing_images (listing_id, image, is_main, display_order)
             VALUES ($1, $2, $3, COALESCE($4, 0))
             RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, ListingImage>(&query)
            .bind(input.listing_id)
            .bind(&input.image)
            .bind(is_main)
            .bind(input.display_order)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(image)
    }

    /// Delete an image by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM listing_images WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
