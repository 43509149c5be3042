//! Listing model and the joined row used to build feed responses.

use piata_core::error::CoreError;
use piata_core::listing::{
    FeedCategory, FeedImage, FeedListing, FeedUser, ListingStatus, NearbyListing,
};
use piata_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `listings` table.
///
/// `price` is stored as `NUMERIC(10,2)` and selected as `float8`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Listing {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub currency: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: String,
    pub user_id: DbId,
    pub category_id: DbId,
    pub views: i64,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// Parsed `status` column.
    pub fn status(&self) -> Result<ListingStatus, CoreError> {
        ListingStatus::from_str_db(&self.status)
    }
}

/// DTO for creating a listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListing {
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    /// Defaults to `RON`.
    pub currency: Option<String>,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Defaults to `pending`.
    pub status: Option<String>,
    pub user_id: DbId,
    pub category_id: DbId,
}

/// A listing joined with its owner's username and its category name.
#[derive(Debug, Clone, FromRow)]
pub struct FeedRow {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub currency: String,
    pub location: String,
    pub username: String,
    pub category_name: String,
}

impl FeedRow {
    /// Combine with the listing's images (already in display order).
    pub fn into_feed(self, images: Vec<FeedImage>) -> FeedListing {
        FeedListing {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            currency: self.currency,
            location: self.location,
            user: FeedUser {
                username: self.username,
            },
            category: FeedCategory {
                name: self.category_name,
            },
            images,
        }
    }
}

/// A nearby-search candidate: an active listing with coordinates and its
/// main image, if any.
#[derive(Debug, Clone, FromRow)]
pub struct NearbyRow {
    pub id: DbId,
    pub title: String,
    pub price: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    pub image_url: Option<String>,
}

impl From<NearbyRow> for NearbyListing {
    fn from(row: NearbyRow) -> Self {
        NearbyListing {
            id: row.id,
            title: row.title,
            price: row.price,
            image_url: row.image_url,
            latitude: Some(row.latitude),
            longitude: Some(row.longitude),
        }
    }
}
