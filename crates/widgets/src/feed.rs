//! The listing feed: fetches active listings and renders cards.
//!
//! Requests are numbered. A response is applied only if no newer request
//! started and the feed is still mounted, so the visible state always
//! belongs to the latest request.

use std::sync::Arc;

use async_trait::async_trait;
use piata_core::listing::{listing_detail_path, main_image, truncate_chars, FeedListing};
use piata_core::types::DbId;
use tokio::sync::Mutex;

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::html;
use crate::messages;

/// Where feed listings come from.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn listings(&self) -> Result<Vec<FeedListing>, WidgetError>;
}

/// Presentation-ready fields of one card.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedCard {
    pub id: DbId,
    pub title: String,
    pub category: String,
    pub description: String,
    pub image: String,
    pub username: String,
    pub avatar_url: String,
    /// First letter of the username, shown if the avatar fails to load.
    pub avatar_initial: String,
    pub location: String,
    pub price: String,
    pub detail_path: String,
}

impl FeedCard {
    pub fn from_listing(listing: &FeedListing, config: &WidgetConfig) -> Self {
        let username = listing.user.username.clone();
        Self {
            id: listing.id,
            title: listing.title.clone(),
            category: listing.category.name.clone(),
            description: truncate_chars(&listing.description, config.description_max_chars),
            image: main_image(&listing.images)
                .unwrap_or(&config.placeholder_image)
                .to_string(),
            avatar_url: format!("{}/{}", config.avatar_base_url, username),
            avatar_initial: username
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
            username,
            location: listing.location.clone(),
            price: listing.price_label(),
            detail_path: listing_detail_path(listing.id),
        }
    }

    pub fn render(&self) -> String {
        let title = html::escape(&self.title);
        let username = html::escape(&self.username);
        format!(
            concat!(
                r#"<div class="listing-card" data-listing-id="{id}">"#,
                r#"<img class="listing-image" src="{image}" alt="{title}">"#,
                r#"<div class="listing-body">"#,
                r#"<h3 class="listing-title">{title}</h3>"#,
                r#"<span class="category-badge">{category}</span>"#,
                r#"<p class="listing-description">{description}</p>"#,
                r#"<div class="listing-owner">"#,
                r#"<img class="avatar" src="{avatar}" alt="{username}">"#,
                r#"<span class="avatar-fallback">{initial}</span>"#,
                r#"<span class="username">{username}</span>"#,
                r#"</div>"#,
                r#"<p class="listing-location">📍 {location}</p>"#,
                r#"<p class="listing-price">{price}</p>"#,
                r#"<a class="view-details" href="{href}">{details}</a>"#,
                r#"</div></div>"#,
            ),
            id = self.id,
            image = html::escape(&self.image),
            title = title,
            category = html::escape(&self.category),
            description = html::escape(&self.description),
            avatar = html::escape(&self.avatar_url),
            username = username,
            initial = html::escape(&self.avatar_initial),
            location = html::escape(&self.location),
            price = html::escape(&self.price),
            href = self.detail_path,
            details = messages::FEED_VIEW_DETAILS,
        )
    }
}

/// Mutually exclusive display states of the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    /// Server-reported message, or a generic one for transport failures.
    Error(String),
    Empty,
    Loaded(Vec<FeedCard>),
}

impl FeedState {
    pub fn render(&self) -> String {
        match self {
            FeedState::Loading => format!(
                r#"<div class="feed-loading">{}</div>"#,
                messages::FEED_LOADING
            ),
            FeedState::Error(message) => format!(
                r#"<div class="feed-error">Error: {}</div>"#,
                html::escape(message)
            ),
            FeedState::Empty => format!(
                r#"<div class="feed-empty"><h2>{}</h2><p>{}</p></div>"#,
                messages::FEED_EMPTY_TITLE,
                messages::FEED_EMPTY_HINT
            ),
            FeedState::Loaded(cards) => {
                let body: String = cards.iter().map(FeedCard::render).collect();
                format!(r#"<div class="listing-grid">{body}</div>"#)
            }
        }
    }
}

/// Message shown for a failed fetch.
pub fn error_message(error: &WidgetError) -> String {
    match error {
        WidgetError::Status { message, .. } => message.clone(),
        _ => messages::FEED_FETCH_FAILED.to_string(),
    }
}

struct Inner {
    state: FeedState,
    generation: u64,
    mounted: bool,
}

/// Drives the feed from a [`FeedSource`].
pub struct FeedFetcher<S: FeedSource> {
    source: S,
    config: Arc<WidgetConfig>,
    inner: Mutex<Inner>,
}

impl<S: FeedSource> FeedFetcher<S> {
    pub fn new(source: S, config: Arc<WidgetConfig>) -> Self {
        Self {
            source,
            config,
            inner: Mutex::new(Inner {
                state: FeedState::Loading,
                generation: 0,
                mounted: false,
            }),
        }
    }

    /// Mark the feed as shown and load it.
    pub async fn mount(&self) -> bool {
        self.inner.lock().await.mounted = true;
        self.refresh().await
    }

    /// Stop applying results, including those of requests in flight.
    pub async fn unmount(&self) {
        let mut inner = self.inner.lock().await;
        inner.mounted = false;
        inner.generation += 1;
    }

    /// Start a new request and wait for it.
    ///
    /// Returns `true` if its result became the visible state, `false` if a
    /// newer request or an unmount superseded it.
    pub async fn refresh(&self) -> bool {
        let generation = {
            let mut inner = self.inner.lock().await;
            if !inner.mounted {
                return false;
            }
            inner.generation += 1;
            inner.state = FeedState::Loading;
            inner.generation
        };

        let result = self.source.listings().await;

        let mut inner = self.inner.lock().await;
        if !inner.mounted || inner.generation != generation {
            tracing::debug!(generation, "Discarding superseded feed response");
            return false;
        }

        inner.state = match result {
            Ok(listings) if listings.is_empty() => FeedState::Empty,
            Ok(listings) => FeedState::Loaded(
                listings
                    .iter()
                    .map(|l| FeedCard::from_listing(l, &self.config))
                    .collect(),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch listings");
                FeedState::Error(error_message(&e))
            }
        };
        true
    }

    pub async fn state(&self) -> FeedState {
        self.inner.lock().await.state.clone()
    }

    /// HTML of the current state.
    pub async fn render(&self) -> String {
        self.inner.lock().await.state.render()
    }
}
