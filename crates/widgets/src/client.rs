//! HTTP client for the read API, used as the data source of the feed and
//! the nearby loader.

use async_trait::async_trait;
use piata_core::listing::{FeedListing, NearbyListing, NearbyResponse};
use piata_core::types::DbId;
use serde::de::DeserializeOwned;

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::feed::FeedSource;
use crate::nearby::NearbySource;

/// Client for the marketplace JSON endpoints.
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    client: reqwest::Client,
    base_url: String,
}

impl MarketplaceClient {
    /// Build a client from the widget configuration.
    pub fn new(config: &WidgetConfig) -> Result<Self, WidgetError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, &config.api_base_url))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET /api/listings`
    pub async fn fetch_listings(&self) -> Result<Vec<FeedListing>, WidgetError> {
        self.get_json("/api/listings").await
    }

    /// `GET /api/listings/{id}/nearby/`
    pub async fn fetch_nearby(&self, listing_id: DbId) -> Result<NearbyResponse, WidgetError> {
        self.get_json(&format!("/api/listings/{listing_id}/nearby/"))
            .await
    }

    // ---- private helpers ----

    /// GET `path` and decode the body.
    ///
    /// A non-2xx status, or a JSON object carrying an `error` string, is a
    /// [`WidgetError::Status`] with the server's message.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, WidgetError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let value: Option<serde_json::Value> = serde_json::from_str(&body).ok();
        let server_message = value
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string);

        if !status.is_success() {
            return Err(WidgetError::Status {
                status: status.as_u16(),
                message: server_message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                }),
            });
        }
        if let Some(message) = server_message {
            return Err(WidgetError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let value = value.ok_or_else(|| WidgetError::Parse(format!("{path}: body is not JSON")))?;
        serde_json::from_value(value).map_err(|e| WidgetError::Parse(format!("{path}: {e}")))
    }
}

#[async_trait]
impl FeedSource for MarketplaceClient {
    async fn listings(&self) -> Result<Vec<FeedListing>, WidgetError> {
        self.fetch_listings().await
    }
}

#[async_trait]
impl NearbySource for MarketplaceClient {
    async fn nearby(&self, listing_id: DbId) -> Result<Vec<NearbyListing>, WidgetError> {
        Ok(self.fetch_nearby(listing_id).await?.listings)
    }
}
