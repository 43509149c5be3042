//! User-facing strings. The listing detail page is Romanian; the feed is
//! English.

// Listing detail page
pub const MAP_ACTIVE_NOTICE: &str = "Harta este acum activă pentru navigare";
pub const MAP_EXPAND_LABEL: &str = "Mărește harta";
pub const MAP_SHRINK_LABEL: &str = "Micșorează harta";
pub const MARKER_POPUP_CAPTION: &str = "Locația anunțului";
pub const NEARBY_LOADING: &str = "Se încarcă anunțurile din apropiere...";
pub const NEARBY_EMPTY: &str = "Nu există anunțuri în apropiere";
pub const NEARBY_ERROR: &str = "Eroare la încărcarea anunțurilor din apropiere";

// Listing feed
pub const FEED_LOADING: &str = "Loading...";
pub const FEED_FETCH_FAILED: &str = "Failed to fetch listings";
pub const FEED_EMPTY_TITLE: &str = "No listings available yet";
pub const FEED_EMPTY_HINT: &str = "Check back soon for amazing deals!";
pub const FEED_VIEW_DETAILS: &str = "View Details";
