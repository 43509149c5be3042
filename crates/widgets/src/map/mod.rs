//! Slippy-map seam and the listing map controller.
//!
//! [`MapEngine`] creates maps; [`LiveMap`] is one map bound to a container.
//! The shapes mirror a leaflet-style API: one tile layer, individual
//! markers with div icons and HTML popups, and an overlay group that is
//! always replaced as a whole.

mod controller;
mod headless;

pub use controller::{InitOutcome, MapController, MapPhase, SkipReason};
pub use headless::{EngineStats, HeadlessEngine, HeadlessMap};

use piata_core::geo::LatLng;

use crate::error::WidgetError;

/// Class the engine puts on a container it has taken over.
pub const LEAFLET_CONTAINER_CLASS: &str = "leaflet-container";

/// Class toggled on the container when the map is expanded.
pub const FULLSCREEN_CLASS: &str = "map-fullscreen";

/// Initial view of a new map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub scroll_wheel_zoom: bool,
}

/// A raster tile source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders.
    pub url_template: String,
    /// HTML attribution shown in the map corner.
    pub attribution: String,
}

/// A marker icon made of HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DivIcon {
    pub class_name: String,
    pub html: String,
    /// Width and height in pixels.
    pub size: (u32, u32),
    /// Pixel of the icon placed on the coordinate.
    pub anchor: (u32, u32),
}

impl DivIcon {
    /// Red pin for the listing itself.
    pub fn listing_pin() -> Self {
        Self {
            class_name: "custom-marker".to_string(),
            html: r#"<i class="fas fa-map-marker-alt" style="color: #dc2626; font-size: 24px;"></i>"#
                .to_string(),
            size: (24, 24),
            anchor: (12, 24),
        }
    }

    /// Small grey dot for a nearby listing.
    pub fn nearby_dot() -> Self {
        Self {
            class_name: "custom-marker".to_string(),
            html: r#"<i class="fas fa-circle text-gray-500 text-xs"></i>"#.to_string(),
            size: (8, 8),
            anchor: (4, 4),
        }
    }
}

/// A positioned marker with a popup.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub icon: DivIcon,
    /// Popup content; already escaped HTML.
    pub popup_html: String,
    /// Open the popup as soon as the marker is added.
    pub open_popup: bool,
}

/// Creates maps inside page containers.
pub trait MapEngine: Send + Sync + 'static {
    type Map: LiveMap;

    fn create(&self, container_id: &str, view: &MapView) -> Result<Self::Map, WidgetError>;
}

/// One map instance. Dropping it without [`remove`](LiveMap::remove)
/// leaks the host resources, so the controller always calls `remove`.
pub trait LiveMap: Send + 'static {
    fn add_tile_layer(&mut self, layer: TileLayer);
    fn add_marker(&mut self, marker: Marker);
    fn set_scroll_wheel_zoom(&mut self, enabled: bool);
    /// Recompute pixel dimensions after the container was resized.
    fn invalidate_size(&mut self);
    /// Replace every marker of the overlay group in one step.
    fn replace_overlay(&mut self, markers: Vec<Marker>);
    /// Release the map and everything attached to it.
    fn remove(self);
}
