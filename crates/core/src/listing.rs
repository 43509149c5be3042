//! Listing status, currency, and the JSON shapes served to clients.
//!
//! `FeedListing` is the element type of `GET /api/listings`;
//! `NearbyResponse` is the body of `GET /api/listings/{id}/nearby/`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Image shown on a card when a listing has no image flagged as main.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.jpg";

/// Price label used when a listing has no price.
pub const FREE_LABEL: &str = "Free";

/// Currency assumed when a payload carries none (the nearby contract).
pub const DEFAULT_CURRENCY: &str = "RON";

// ---------------------------------------------------------------------------
// Listing status
// ---------------------------------------------------------------------------

/// Lifecycle status of a listing. Only `Active` listings reach public feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Active,
    Sold,
    Expired,
    Rejected,
}

impl ListingStatus {
    /// Parse a status string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "sold" => Ok(Self::Sold),
            "expired" => Ok(Self::Expired),
            "rejected" => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid listing status '{s}'. Must be one of: pending, active, sold, expired, rejected"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Sold => "sold",
            Self::Expired => "expired",
            Self::Rejected => "rejected",
        }
    }

    /// Whether listings in this status are shown publicly.
    pub fn is_public(self) -> bool {
        self == Self::Active
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// Currencies a listing may be priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ron,
    Eur,
    Usd,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ron => "RON",
            Self::Eur => "EUR",
            Self::Usd => "USD",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire contracts
// ---------------------------------------------------------------------------

/// Owner summary embedded in a feed listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedUser {
    pub username: String,
}

/// Category summary embedded in a feed listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCategory {
    pub name: String,
}

/// Image reference embedded in a feed listing, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedImage {
    pub image: String,
    pub is_main: bool,
}

/// One element of the `GET /api/listings` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedListing {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub currency: String,
    pub location: String,
    pub user: FeedUser,
    pub category: FeedCategory,
    #[serde(default)]
    pub images: Vec<FeedImage>,
}

impl FeedListing {
    /// Price label as shown on cards.
    pub fn price_label(&self) -> String {
        format_price(self.price, &self.currency)
    }
}

/// One listing in the nearby widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyListing {
    pub id: DbId,
    pub title: String,
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Body of `GET /api/listings/{id}/nearby/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub listings: Vec<NearbyListing>,
}

// ---------------------------------------------------------------------------
// Presentation helpers
// ---------------------------------------------------------------------------

/// Select the first image flagged `is_main`.
///
/// The schema allows several main images per listing; the first one in
/// display order wins.
pub fn main_image(images: &[FeedImage]) -> Option<&str> {
    images
        .iter()
        .find(|img| img.is_main)
        .map(|img| img.image.as_str())
}

/// Format a price for display: `"500 RON"`, `"2800.5 EUR"`, or `"Free"`.
///
/// A zero price is shown as free as well.
pub fn format_price(price: Option<f64>, currency: &str) -> String {
    match price {
        Some(p) if p != 0.0 && p.is_finite() => format!("{p} {currency}"),
        _ => FREE_LABEL.to_string(),
    }
}

/// Truncate `text` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Operates on chars, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Path of the listing detail page.
pub fn listing_detail_path(id: DbId) -> String {
    format!("/listing/{id}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(path: &str, is_main: bool) -> FeedImage {
        FeedImage {
            image: path.to_string(),
            is_main,
        }
    }

    #[test]
    fn test_status_round_trip_through_db_strings() {
        for status in [
            ListingStatus::Pending,
            ListingStatus::Active,
            ListingStatus::Sold,
            ListingStatus::Expired,
            ListingStatus::Rejected,
        ] {
            assert_eq!(ListingStatus::from_str_db(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_invalid_status_names_the_value() {
        let msg = ListingStatus::from_str_db("archived").unwrap_err().to_string();
        assert!(msg.contains("archived"));
    }

    #[test]
    fn test_only_active_is_public() {
        assert!(ListingStatus::Active.is_public());
        assert!(!ListingStatus::Sold.is_public());
        assert!(!ListingStatus::Pending.is_public());
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::Usd.code(), "USD");
        assert_eq!(Currency::Ron.code(), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_format_price_absent_is_free() {
        assert_eq!(format_price(None, "RON"), "Free");
    }

    #[test]
    fn test_format_price_whole_number() {
        assert_eq!(format_price(Some(500.0), "RON"), "500 RON");
    }

    #[test]
    fn test_format_price_fractional() {
        assert_eq!(format_price(Some(2800.5), "EUR"), "2800.5 EUR");
    }

    #[test]
    fn test_format_price_zero_is_free() {
        assert_eq!(format_price(Some(0.0), "RON"), "Free");
    }

    #[test]
    fn test_main_image_first_match_wins() {
        let images = vec![
            image("a.jpg", false),
            image("b.jpg", true),
            image("c.jpg", true),
        ];
        assert_eq!(main_image(&images), Some("b.jpg"));
    }

    #[test]
    fn test_main_image_none_flagged() {
        let images = vec![image("a.jpg", false)];
        assert_eq!(main_image(&images), None);
        assert_eq!(main_image(&[]), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_chars("a fairly long text", 8), "a fairly…");
        // Multi-byte characters are counted, not bytes.
        assert_eq!(truncate_chars("ăîșțâăîșț", 3), "ăîș…");
    }

    #[test]
    fn test_feed_listing_deserializes_null_price() {
        let json = serde_json::json!({
            "id": 7,
            "title": "Bike",
            "description": "Red",
            "price": null,
            "currency": "RON",
            "location": "Cluj",
            "user": {"username": "ana"},
            "category": {"name": "Sport"},
            "images": [{"image": "bike.jpg", "is_main": true}]
        });
        let listing: FeedListing = serde_json::from_value(json).unwrap();
        assert_eq!(listing.price, None);
        assert_eq!(listing.price_label(), "Free");
        assert_eq!(main_image(&listing.images), Some("bike.jpg"));
    }

    #[test]
    fn test_nearby_listing_optional_fields_default() {
        let json = serde_json::json!({"id": 1, "title": "X", "price": 100});
        let listing: NearbyListing = serde_json::from_value(json).unwrap();
        assert_eq!(listing.price, Some(100.0));
        assert_eq!(listing.image_url, None);
        assert_eq!(listing.latitude, None);
    }

    #[test]
    fn test_listing_detail_path() {
        assert_eq!(listing_detail_path(1), "/listing/1/");
    }
}
