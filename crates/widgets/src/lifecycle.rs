//! Page events of the listing detail page, routed to the map and the
//! nearby loader.

use std::sync::Arc;

use piata_core::types::DbId;

use crate::map::{InitOutcome, MapController, MapEngine};
use crate::nearby::{NearbyLoader, NearbyOutcome, NearbySource};

/// Document visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Browser events the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    DomContentLoaded,
    BeforeUnload,
    PageHide,
    VisibilityChange(Visibility),
}

impl PageEvent {
    /// Whether the event means the page is going away.
    pub fn is_teardown(self) -> bool {
        matches!(
            self,
            PageEvent::BeforeUnload
                | PageEvent::PageHide
                | PageEvent::VisibilityChange(Visibility::Hidden)
        )
    }
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Loaded {
        map: InitOutcome,
        nearby: NearbyOutcome,
    },
    /// `true` if this event released the map.
    TornDown(bool),
    Ignored,
}

/// The listing detail page: one map controller and one nearby loader,
/// for one listing.
pub struct ListingDetailPage<E: MapEngine, S: NearbySource> {
    listing_id: DbId,
    map: Arc<MapController<E>>,
    nearby: NearbyLoader<S>,
    container_id: String,
}

impl<E: MapEngine, S: NearbySource> ListingDetailPage<E, S> {
    pub fn new(
        listing_id: DbId,
        container_id: impl Into<String>,
        map: Arc<MapController<E>>,
        nearby: NearbyLoader<S>,
    ) -> Self {
        Self {
            listing_id,
            map,
            nearby,
            container_id: container_id.into(),
        }
    }

    pub fn map(&self) -> &MapController<E> {
        &self.map
    }

    /// Every teardown event goes to the same idempotent `destroy`.
    pub async fn handle(&self, event: PageEvent) -> PageOutcome {
        match event {
            PageEvent::DomContentLoaded => {
                let map = self.map.initialize_from_dom(&self.container_id).await;
                let nearby = self
                    .nearby
                    .load_with_markers(self.listing_id, &self.map)
                    .await;
                PageOutcome::Loaded { map, nearby }
            }
            event if event.is_teardown() => {
                tracing::debug!(?event, listing_id = self.listing_id, "Page teardown");
                PageOutcome::TornDown(self.map.destroy().await)
            }
            _ => PageOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_events() {
        assert!(PageEvent::BeforeUnload.is_teardown());
        assert!(PageEvent::PageHide.is_teardown());
        assert!(PageEvent::VisibilityChange(Visibility::Hidden).is_teardown());
        assert!(!PageEvent::VisibilityChange(Visibility::Visible).is_teardown());
        assert!(!PageEvent::DomContentLoaded.is_teardown());
    }
}
