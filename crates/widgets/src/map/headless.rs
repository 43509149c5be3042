use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::WidgetError;
use crate::map::{LiveMap, MapEngine, MapView, Marker, TileLayer};

/// Counters and content of every map a [`HeadlessEngine`] created.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub created: usize,
    pub removed: usize,
    pub invalidations: usize,
    pub last_view: Option<MapView>,
    pub tile_layers: Vec<TileLayer>,
    pub markers: Vec<Marker>,
    pub overlay: Vec<Marker>,
    pub overlay_replacements: usize,
    pub scroll_wheel_zoom: bool,
}

impl EngineStats {
    /// Maps created and not yet removed.
    pub fn live(&self) -> usize {
        self.created - self.removed
    }
}

/// A map engine that renders nothing and records what it was asked to do.
#[derive(Debug, Clone, Default)]
pub struct HeadlessEngine {
    stats: Arc<Mutex<EngineStats>>,
    fail_next: Arc<Mutex<Option<String>>>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded activity.
    pub fn stats(&self) -> EngineStats {
        lock(&self.stats).clone()
    }

    /// Make the next `create` call fail with `reason`.
    pub fn fail_next_create(&self, reason: &str) {
        *lock(&self.fail_next) = Some(reason.to_string());
    }
}

impl MapEngine for HeadlessEngine {
    type Map = HeadlessMap;

    fn create(&self, container_id: &str, view: &MapView) -> Result<HeadlessMap, WidgetError> {
        if let Some(reason) = lock(&self.fail_next).take() {
            return Err(WidgetError::Map(reason));
        }
        let mut stats = lock(&self.stats);
        stats.created += 1;
        stats.last_view = Some(*view);
        stats.scroll_wheel_zoom = view.scroll_wheel_zoom;
        stats.markers.clear();
        stats.overlay.clear();
        stats.tile_layers.clear();
        tracing::debug!(container_id, "Headless map created");
        Ok(HeadlessMap {
            stats: Arc::clone(&self.stats),
        })
    }
}

/// Map handle returned by [`HeadlessEngine`].
#[derive(Debug)]
pub struct HeadlessMap {
    stats: Arc<Mutex<EngineStats>>,
}

impl LiveMap for HeadlessMap {
    fn add_tile_layer(&mut self, layer: TileLayer) {
        lock(&self.stats).tile_layers.push(layer);
    }

    fn add_marker(&mut self, marker: Marker) {
        lock(&self.stats).markers.push(marker);
    }

    fn set_scroll_wheel_zoom(&mut self, enabled: bool) {
        lock(&self.stats).scroll_wheel_zoom = enabled;
    }

    fn invalidate_size(&mut self) {
        lock(&self.stats).invalidations += 1;
    }

    fn replace_overlay(&mut self, markers: Vec<Marker>) {
        let mut stats = lock(&self.stats);
        stats.overlay = markers;
        stats.overlay_replacements += 1;
    }

    fn remove(self) {
        let mut stats = lock(&self.stats);
        stats.removed += 1;
        stats.overlay.clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
