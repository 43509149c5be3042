use piata_core::listing::FeedImage;
use piata_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `listing_images` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ListingImage {
    pub id: DbId,
    pub listing_id: DbId,
    pub image: String,
    pub is_main: bool,
    pub display_order: i32,
    pub created_at: Timestamp,
}

impl From<ListingImage> for FeedImage {
    fn from(row: ListingImage) -> Self {
        FeedImage {
            image: row.image,
            is_main: row.is_main,
        }
    }
}

/// DTO for attaching an image to a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingImage {
    pub listing_id: DbId,
    pub image: String,
    pub is_main: Option<bool>,
    pub display_order: Option<i32>,
}
