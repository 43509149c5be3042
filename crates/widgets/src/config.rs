use std::time::Duration;

use piata_core::geo::DIRECTIONS_BASE_URL;
use piata_core::listing::PLACEHOLDER_IMAGE;

use crate::error::WidgetError;

/// Typed configuration for the client components.
///
/// Values that the pages used to receive as literals interpolated into
/// script text live here instead.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Base URL of the read API, without a trailing slash.
    pub api_base_url: String,
    /// Per-request timeout. `None` leaves it to the transport.
    pub http_timeout: Option<Duration>,
    /// Element id of the map container.
    pub map_container_id: String,
    /// Element id of the map size toggle button.
    pub map_toggle_button_id: String,
    /// Element id of the nearby listings container.
    pub nearby_container_id: String,
    pub tile_url: String,
    pub tile_attribution: String,
    pub default_zoom: u8,
    /// Delay before the map recomputes its size after a toggle.
    pub resize_delay: Duration,
    pub directions_base_url: String,
    pub placeholder_image: String,
    pub avatar_base_url: String,
    /// Card descriptions are cut to this many characters.
    pub description_max_chars: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            http_timeout: None,
            map_container_id: "listing-map".to_string(),
            map_toggle_button_id: "map-toggle-btn".to_string(),
            nearby_container_id: "nearby-listings".to_string(),
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            tile_attribution: "© <a href=\"https://www.openstreetmap.org/copyright\">\
                               OpenStreetMap</a> contributors"
                .to_string(),
            default_zoom: 15,
            resize_delay: Duration::from_millis(100),
            directions_base_url: DIRECTIONS_BASE_URL.to_string(),
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            avatar_base_url: "https://avatar.letters.to".to_string(),
            description_max_chars: 150,
        }
    }
}

impl WidgetConfig {
    /// Load overrides from the environment on top of [`Default`].
    ///
    /// | Env Var                       | Field                   |
    /// |-------------------------------|-------------------------|
    /// | `PIATA_API_BASE_URL`          | `api_base_url`          |
    /// | `PIATA_HTTP_TIMEOUT_SECS`     | `http_timeout`          |
    /// | `PIATA_MAP_TILE_URL`          | `tile_url`              |
    /// | `PIATA_MAP_ATTRIBUTION`       | `tile_attribution`      |
    /// | `PIATA_MAP_ZOOM`              | `default_zoom`          |
    /// | `PIATA_MAP_RESIZE_DELAY_MS`   | `resize_delay`          |
    /// | `PIATA_DIRECTIONS_BASE_URL`   | `directions_base_url`   |
    /// | `PIATA_PLACEHOLDER_IMAGE`     | `placeholder_image`     |
    /// | `PIATA_DESCRIPTION_MAX_CHARS` | `description_max_chars` |
    pub fn from_env() -> Result<Self, WidgetError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WidgetError> {
        let mut config = Self::default();

        if let Some(url) = lookup("PIATA_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "PIATA_HTTP_TIMEOUT_SECS", "u64")? {
            config.http_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(url) = lookup("PIATA_MAP_TILE_URL") {
            config.tile_url = url;
        }
        if let Some(text) = lookup("PIATA_MAP_ATTRIBUTION") {
            config.tile_attribution = text;
        }
        if let Some(zoom) = parse_var(&lookup, "PIATA_MAP_ZOOM", "u8")? {
            config.default_zoom = zoom;
        }
        if let Some(ms) = parse_var(&lookup, "PIATA_MAP_RESIZE_DELAY_MS", "u64")? {
            config.resize_delay = Duration::from_millis(ms);
        }
        if let Some(url) = lookup("PIATA_DIRECTIONS_BASE_URL") {
            config.directions_base_url = url;
        }
        if let Some(path) = lookup("PIATA_PLACEHOLDER_IMAGE") {
            config.placeholder_image = path;
        }
        if let Some(n) = parse_var(&lookup, "PIATA_DESCRIPTION_MAX_CHARS", "usize")? {
            config.description_max_chars = n;
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, WidgetError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| WidgetError::Config {
                var,
                expected,
                value,
            }),
        None => Ok(None),
    }
}
