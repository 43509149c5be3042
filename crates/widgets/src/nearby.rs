//! The "nearby listings" box of the listing detail page.

use std::sync::Arc;

use async_trait::async_trait;
use piata_core::geo::LatLng;
use piata_core::listing::{format_price, listing_detail_path, NearbyListing, DEFAULT_CURRENCY};
use piata_core::types::DbId;

use crate::config::WidgetConfig;
use crate::dom::Dom;
use crate::error::WidgetError;
use crate::html;
use crate::map::{DivIcon, MapController, MapEngine, Marker};
use crate::messages;

/// Where nearby listings come from.
#[async_trait]
pub trait NearbySource: Send + Sync {
    async fn nearby(&self, listing_id: DbId) -> Result<Vec<NearbyListing>, WidgetError>;
}

/// What a load did to the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NearbyOutcome {
    /// The page has no nearby container; nothing was fetched.
    NoContainer,
    /// The container went away while the request was in flight.
    Detached,
    Empty,
    /// Number of rows rendered.
    Rendered(usize),
    /// The error message was rendered.
    Failed,
}

/// Fetches nearby listings once per call and renders them.
pub struct NearbyLoader<S: NearbySource> {
    source: S,
    dom: Arc<dyn Dom>,
    config: Arc<WidgetConfig>,
}

impl<S: NearbySource> NearbyLoader<S> {
    pub fn new(source: S, dom: Arc<dyn Dom>, config: Arc<WidgetConfig>) -> Self {
        Self {
            source,
            dom,
            config,
        }
    }

    /// Fetch and render the listings near `listing_id`.
    pub async fn load(&self, listing_id: DbId) -> NearbyOutcome {
        self.fetch_and_render(listing_id).await.0
    }

    /// Like [`load`](Self::load), and also rebuild the map's nearby marker
    /// layer from the listings that carry coordinates. A failed load clears
    /// the layer.
    pub async fn load_with_markers<E: MapEngine>(
        &self,
        listing_id: DbId,
        map: &MapController<E>,
    ) -> NearbyOutcome {
        let (outcome, listings) = self.fetch_and_render(listing_id).await;
        if outcome == NearbyOutcome::Detached || outcome == NearbyOutcome::NoContainer {
            return outcome;
        }
        map.replace_nearby_markers(nearby_markers(&listings)).await;
        outcome
    }

    async fn fetch_and_render(&self, listing_id: DbId) -> (NearbyOutcome, Vec<NearbyListing>) {
        let container = self.config.nearby_container_id.as_str();
        if !self.dom.contains(container) {
            return (NearbyOutcome::NoContainer, Vec::new());
        }
        self.dom.set_inner_html(container, &loading_html());

        let result = self.source.nearby(listing_id).await;

        if !self.dom.contains(container) {
            tracing::debug!(listing_id, "Nearby container detached before the response");
            return (NearbyOutcome::Detached, Vec::new());
        }

        match result {
            Ok(listings) if listings.is_empty() => {
                self.dom.set_inner_html(container, &empty_html());
                (NearbyOutcome::Empty, listings)
            }
            Ok(listings) => {
                self.dom.set_inner_html(container, &render_rows(&listings));
                tracing::debug!(listing_id, count = listings.len(), "Nearby listings rendered");
                (NearbyOutcome::Rendered(listings.len()), listings)
            }
            Err(e) => {
                tracing::error!(listing_id, error = %e, "Error loading nearby listings");
                self.dom.set_inner_html(container, &error_html());
                (NearbyOutcome::Failed, Vec::new())
            }
        }
    }
}

fn loading_html() -> String {
    format!(
        r#"<div class="text-center text-gray-500 py-3"><i class="fas fa-spinner fa-spin mr-1"></i>{}</div>"#,
        messages::NEARBY_LOADING
    )
}

fn empty_html() -> String {
    format!(
        r#"<div class="text-center text-gray-500 py-3">{}</div>"#,
        messages::NEARBY_EMPTY
    )
}

fn error_html() -> String {
    format!(
        r#"<div class="text-center text-red-500 py-3">{}</div>"#,
        messages::NEARBY_ERROR
    )
}

/// One row per listing, each linking to its detail page.
pub fn render_rows(listings: &[NearbyListing]) -> String {
    listings.iter().map(render_row).collect()
}

fn render_row(listing: &NearbyListing) -> String {
    let title = html::escape(&listing.title);
    let thumbnail = match listing.image_url.as_deref() {
        Some(url) if !url.is_empty() => format!(
            r#"<img src="{}" alt="{title}" class="w-full h-full object-cover rounded">"#,
            html::escape(url)
        ),
        _ => r#"<i class="fas fa-image text-gray-400"></i>"#.to_string(),
    };
    let price = html::escape(&format_price(listing.price, DEFAULT_CURRENCY));

    format!(
        r#"<div class="nearby-listing border-b border-gray-200 pb-3 last:border-b-0 last:pb-0"><a href="{href}" class="flex items-center hover:bg-gray-50 p-2 rounded"><div class="w-16 h-16 bg-gray-200 rounded flex items-center justify-center mr-3 flex-shrink-0">{thumbnail}</div><div class="flex-1 min-w-0"><p class="text-sm font-medium text-gray-900 truncate">{title}</p><p class="text-sm text-gray-500">{price}</p></div></a></div>"#,
        href = listing_detail_path(listing.id),
    )
}

/// Markers for the listings that have valid coordinates.
pub fn nearby_markers(listings: &[NearbyListing]) -> Vec<Marker> {
    listings
        .iter()
        .filter_map(|listing| {
            let position = LatLng::new(listing.latitude?, listing.longitude?).ok()?;
            Some(Marker {
                position,
                icon: DivIcon::nearby_dot(),
                popup_html: format!(
                    "<b>{}</b><br>{}",
                    html::escape(&listing.title),
                    html::escape(&format_price(listing.price, DEFAULT_CURRENCY))
                ),
                open_popup: false,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: DbId, title: &str, price: Option<f64>) -> NearbyListing {
        NearbyListing {
            id,
            title: title.to_string(),
            price,
            image_url: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_row_without_image_uses_icon() {
        let html = render_rows(&[listing(1, "X", Some(100.0))]);
        assert!(html.contains(r#"href="/listing/1/""#));
        assert!(html.contains("fa-image"));
        assert!(html.contains("100 RON"));
    }

    #[test]
    fn test_row_title_is_escaped() {
        let html = render_rows(&[listing(2, "<script>", None)]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Free"));
    }

    #[test]
    fn test_markers_skip_listings_without_coordinates() {
        let mut located = listing(1, "Here", Some(5.0));
        located.latitude = Some(44.4);
        located.longitude = Some(26.1);
        let mut broken = listing(2, "Bad", None);
        broken.latitude = Some(f64::NAN);
        broken.longitude = Some(26.1);

        let markers = nearby_markers(&[located, listing(3, "Nowhere", None), broken]);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].popup_html, "<b>Here</b><br>5 RON");
        assert_eq!(markers[0].icon, DivIcon::nearby_dot());
    }
}
