//! Coordinates, great-circle distance, and the external directions link.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius used by the nearby search when the caller does not supply one.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 10.0;

/// Bounds accepted for a nearby search radius.
pub const MIN_NEARBY_RADIUS_KM: f64 = 0.1;
pub const MAX_NEARBY_RADIUS_KM: f64 = 500.0;

/// Maximum number of listings returned by a nearby search.
pub const NEARBY_LIMIT: usize = 6;

/// Base of the external directions URL.
pub const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/?api=1";

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Build a coordinate pair, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(CoreError::Validation(format!(
                "Invalid coordinates: {lat}, {lng}"
            )));
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::Validation(format!(
                "Coordinates out of range: {lat}, {lng}"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Parse coordinates from their textual form (e.g. DOM data attributes).
    pub fn parse(lat: &str, lng: &str) -> Result<Self, CoreError> {
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid latitude '{lat}'")))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| CoreError::Validation(format!("Invalid longitude '{lng}'")))?;
        Self::new(lat, lng)
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }

    /// Latitude/longitude deltas (degrees) of a box enclosing a circle of
    /// `radius_km` around this point. Used to pre-filter rows in SQL.
    pub fn bounding_deltas(&self, radius_km: f64) -> (f64, f64) {
        let lat_delta = (radius_km / EARTH_RADIUS_KM).to_degrees();
        let cos_lat = self.lat.to_radians().cos().abs().max(1e-6);
        let lng_delta = (lat_delta / cos_lat).min(180.0);
        (lat_delta, lng_delta)
    }

    /// Longitudes within `lng_delta` degrees of this point, wrapped at the
    /// antimeridian.
    pub fn longitude_window(&self, lng_delta: f64) -> LngWindow {
        if lng_delta >= 180.0 {
            return LngWindow::Span {
                min: -180.0,
                max: 180.0,
            };
        }
        let (min, max) = (self.lng - lng_delta, self.lng + lng_delta);
        if min < -180.0 {
            LngWindow::Wrapped {
                from: min + 360.0,
                to: max,
            }
        } else if max > 180.0 {
            LngWindow::Wrapped {
                from: min,
                to: max - 360.0,
            }
        } else {
            LngWindow::Span { min, max }
        }
    }
}

/// A longitude interval on the circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LngWindow {
    /// `min <= lng <= max`.
    Span { min: f64, max: f64 },
    /// Crosses ±180°: `lng >= from` or `lng <= to`.
    Wrapped { from: f64, to: f64 },
}

impl LngWindow {
    /// `(low, high, wrapped)` as bound by SQL pre-filters.
    pub fn bounds(&self) -> (f64, f64, bool) {
        match *self {
            LngWindow::Span { min, max } => (min, max, false),
            LngWindow::Wrapped { from, to } => (from, to, true),
        }
    }

    pub fn contains(&self, lng: f64) -> bool {
        match *self {
            LngWindow::Span { min, max } => (min..=max).contains(&lng),
            LngWindow::Wrapped { from, to } => lng >= from || lng <= to,
        }
    }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (lat1, lng1, lat2, lng2) = (
        lat1.to_radians(),
        lng1.to_radians(),
        lat2.to_radians(),
        lng2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

/// Directions link to `destination`, opened in a new browsing context.
pub fn directions_url(base: &str, destination: &LatLng) -> String {
    format!(
        "{base}&destination={},{}",
        destination.lat, destination.lng
    )
}
