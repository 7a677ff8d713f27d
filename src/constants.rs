//! Centralized constants for the geopick crate
//!
//! Values shared between the config defaults, the geocoding client and the
//! resolver.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// User-Agent sent to Nominatim (its usage policy requires one)
    pub const USER_AGENT: &str = concat!("geopick/", env!("CARGO_PKG_VERSION"));
}

/// Address resolver tuning
pub mod resolver {
    /// Quiet window after the last manual-field edit before searching
    pub const DEBOUNCE_MS: u64 = 500;

    /// Number of suggestions requested from forward search
    pub const SEARCH_LIMIT: usize = 5;
}

/// Map view shown before any position is chosen
pub mod map {
    /// Paris
    pub const CENTER_LAT: f64 = 48.8566;
    pub const CENTER_LNG: f64 = 2.3522;

    pub const ZOOM: u8 = 13;
}
