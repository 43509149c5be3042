use std::sync::Arc;

use piata_core::geo::{directions_url, LatLng};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::WidgetConfig;
use crate::dom::{Dom, NoticeKind};
use crate::error::WidgetError;
use crate::html;
use crate::map::{
    DivIcon, LiveMap, MapEngine, MapView, Marker, TileLayer, FULLSCREEN_CLASS,
    LEAFLET_CONTAINER_CLASS,
};
use crate::messages;

/// Lifecycle of the controller's map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPhase {
    Uninitialized,
    Active,
    Destroyed,
}

/// Result of a successful `initialize` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Skipped(SkipReason),
}

/// Why `initialize` left the page alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingContainer,
    /// This controller already holds a live map.
    AlreadyActive,
    /// Another map has taken over the container.
    ContainerInUse,
    /// The container's data attributes are missing or not numbers.
    InvalidCoordinates,
    /// The map engine refused to create the map.
    EngineFailed,
}

struct Bound<M> {
    map: M,
    container_id: String,
    center: LatLng,
    /// Distinguishes this map from later ones for delayed tasks.
    generation: u64,
}

struct State<M> {
    phase: MapPhase,
    bound: Option<Bound<M>>,
    expanded: bool,
    interactive: bool,
    generation: u64,
}

/// Owns the single map of a listing detail page.
///
/// At most one map is live at a time. `destroy` is idempotent and can be
/// wired to any number of teardown events.
pub struct MapController<E: MapEngine> {
    engine: E,
    dom: Arc<dyn Dom>,
    config: Arc<WidgetConfig>,
    state: Arc<Mutex<State<E::Map>>>,
}

impl<E: MapEngine> MapController<E> {
    pub fn new(engine: E, dom: Arc<dyn Dom>, config: Arc<WidgetConfig>) -> Self {
        Self {
            engine,
            dom,
            config,
            state: Arc::new(Mutex::new(State {
                phase: MapPhase::Uninitialized,
                bound: None,
                expanded: false,
                interactive: false,
                generation: 0,
            })),
        }
    }

    /// Create the map in `container_id`, centered on the listing.
    ///
    /// Non-finite or out-of-range coordinates are an error and create
    /// nothing. A missing container, a map already held, or a container
    /// another map owns are logged and skipped.
    pub async fn initialize(
        &self,
        container_id: &str,
        lat: f64,
        lng: f64,
        title: &str,
    ) -> Result<InitOutcome, WidgetError> {
        let center = LatLng::new(lat, lng).map_err(|_| {
            tracing::warn!(lat, lng, "Invalid coordinates for map");
            WidgetError::InvalidCoordinates { lat, lng }
        })?;

        if !self.dom.contains(container_id) {
            tracing::debug!(container_id, "Map container not found");
            return Ok(InitOutcome::Skipped(SkipReason::MissingContainer));
        }

        let mut state = self.state.lock().await;
        if state.bound.is_some() {
            tracing::debug!(container_id, "Map already initialized, skipping");
            return Ok(InitOutcome::Skipped(SkipReason::AlreadyActive));
        }
        if self.dom.has_class(container_id, LEAFLET_CONTAINER_CLASS) {
            tracing::debug!(container_id, "Container already holds a map, skipping");
            return Ok(InitOutcome::Skipped(SkipReason::ContainerInUse));
        }

        let view = MapView {
            center,
            zoom: self.config.default_zoom,
            scroll_wheel_zoom: false,
        };
        let mut map = self.engine.create(container_id, &view)?;
        map.add_tile_layer(TileLayer {
            url_template: self.config.tile_url.clone(),
            attribution: self.config.tile_attribution.clone(),
        });
        map.add_marker(Marker {
            position: center,
            icon: DivIcon::listing_pin(),
            popup_html: format!(
                "<b>{}</b><br>{}",
                html::escape(title),
                messages::MARKER_POPUP_CAPTION
            ),
            open_popup: true,
        });
        self.dom.add_class(container_id, LEAFLET_CONTAINER_CLASS);

        state.generation += 1;
        let generation = state.generation;
        state.bound = Some(Bound {
            map,
            container_id: container_id.to_string(),
            center,
            generation,
        });
        state.phase = MapPhase::Active;
        state.expanded = false;
        state.interactive = false;

        tracing::info!(container_id, lat, lng, "Map initialized");
        Ok(InitOutcome::Created)
    }

    /// Initialize from the container's `data-lat`, `data-lng` and
    /// `data-title` attributes. Bad or missing data is logged and skipped.
    pub async fn initialize_from_dom(&self, container_id: &str) -> InitOutcome {
        if !self.dom.contains(container_id) {
            tracing::debug!(container_id, "Map container not found");
            return InitOutcome::Skipped(SkipReason::MissingContainer);
        }

        let lat = self.dom.attribute(container_id, "data-lat").unwrap_or_default();
        let lng = self.dom.attribute(container_id, "data-lng").unwrap_or_default();
        let title = self
            .dom
            .attribute(container_id, "data-title")
            .unwrap_or_default();

        let center = match LatLng::parse(&lat, &lng) {
            Ok(center) => center,
            Err(e) => {
                tracing::warn!(container_id, error = %e, "Invalid coordinates for map");
                return InitOutcome::Skipped(SkipReason::InvalidCoordinates);
            }
        };

        match self
            .initialize(container_id, center.lat, center.lng, &title)
            .await
        {
            Ok(outcome) => outcome,
            Err(WidgetError::InvalidCoordinates { .. }) => {
                InitOutcome::Skipped(SkipReason::InvalidCoordinates)
            }
            Err(e) => {
                tracing::error!(container_id, error = %e, "Error initializing map");
                InitOutcome::Skipped(SkipReason::EngineFailed)
            }
        }
    }

    /// Enable scroll-wheel zoom on the first click into the map.
    ///
    /// Returns `true` only for the click that activated it.
    pub async fn handle_map_click(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.interactive {
            return false;
        }
        let Some(bound) = state.bound.as_mut() else {
            return false;
        };
        bound.map.set_scroll_wheel_zoom(true);
        state.interactive = true;
        self.dom
            .notify(messages::MAP_ACTIVE_NOTICE, NoticeKind::Info);
        true
    }

    /// Flip between normal and expanded size.
    ///
    /// Returns the handle of the delayed size recomputation, or `None`
    /// when there is no map, container, or toggle button.
    pub async fn toggle_size(&self) -> Option<JoinHandle<bool>> {
        let mut state = self.state.lock().await;
        let (container_id, generation) = match state.bound.as_ref() {
            Some(bound) => (bound.container_id.clone(), bound.generation),
            None => {
                tracing::debug!("No map available to toggle");
                return None;
            }
        };
        let button_id = self.config.map_toggle_button_id.as_str();
        if !self.dom.contains(&container_id) || !self.dom.contains(button_id) {
            tracing::debug!(%container_id, button_id, "Map element or toggle button not found");
            return None;
        }

        state.expanded = !state.expanded;
        if state.expanded {
            self.dom.add_class(&container_id, FULLSCREEN_CLASS);
            self.dom.set_inner_html(
                button_id,
                &format!(
                    r#"<i class="fas fa-compress mr-1"></i>{}"#,
                    messages::MAP_SHRINK_LABEL
                ),
            );
        } else {
            self.dom.remove_class(&container_id, FULLSCREEN_CLASS);
            self.dom.set_inner_html(
                button_id,
                &format!(
                    r#"<i class="fas fa-expand mr-1"></i>{}"#,
                    messages::MAP_EXPAND_LABEL
                ),
            );
        }
        drop(state);

        let shared = Arc::clone(&self.state);
        let delay = self.config.resize_delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = shared.lock().await;
            match state.bound.as_mut() {
                Some(bound) if bound.generation == generation => {
                    bound.map.invalidate_size();
                    tracing::debug!("Map size invalidated");
                    true
                }
                _ => false,
            }
        }))
    }

    /// Release the map. Safe to call any number of times; only the first
    /// call after an `initialize` does anything.
    pub async fn destroy(&self) -> bool {
        let mut state = self.state.lock().await;
        let Some(bound) = state.bound.take() else {
            return false;
        };

        self.dom
            .remove_class(&bound.container_id, LEAFLET_CONTAINER_CLASS);
        self.dom.remove_class(&bound.container_id, FULLSCREEN_CLASS);
        bound.map.remove();

        state.phase = MapPhase::Destroyed;
        state.expanded = false;
        state.interactive = false;
        tracing::info!(container_id = %bound.container_id, "Map destroyed");
        true
    }

    /// Open directions to the listing in a new browsing context.
    ///
    /// Uses the bound coordinates, or the container's data attributes when
    /// no map is live. Returns the opened URL.
    pub async fn get_directions(&self) -> Option<String> {
        let bound_center = self.state.lock().await.bound.as_ref().map(|b| b.center);
        let destination = match bound_center {
            Some(center) => center,
            None => {
                let id = self.config.map_container_id.as_str();
                let lat = self.dom.attribute(id, "data-lat")?;
                let lng = self.dom.attribute(id, "data-lng")?;
                match LatLng::parse(&lat, &lng) {
                    Ok(center) => center,
                    Err(e) => {
                        tracing::debug!(error = %e, "No coordinates for directions");
                        return None;
                    }
                }
            }
        };

        let url = directions_url(&self.config.directions_base_url, &destination);
        self.dom.open_window(&url, "_blank");
        Some(url)
    }

    /// Replace the nearby-listings marker layer. No-op without a live map.
    pub async fn replace_nearby_markers(&self, markers: Vec<Marker>) -> bool {
        let mut state = self.state.lock().await;
        match state.bound.as_mut() {
            Some(bound) => {
                bound.map.replace_overlay(markers);
                true
            }
            None => false,
        }
    }

    pub async fn phase(&self) -> MapPhase {
        self.state.lock().await.phase
    }

    pub async fn is_expanded(&self) -> bool {
        self.state.lock().await.expanded
    }
}
