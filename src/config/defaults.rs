//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants;

/// Default geocoding service base URL
pub const DEFAULT_GEOCODER_URL: &str = constants::api::NOMINATIM_URL;

/// Default User-Agent for geocoding requests
pub const DEFAULT_USER_AGENT: &str = constants::api::USER_AGENT;

/// Default request timeout in seconds (0 = HTTP client default)
pub const DEFAULT_TIMEOUT_SECS: u64 = 0;

/// Default number of suggestions per forward search
pub const DEFAULT_SEARCH_LIMIT: usize = constants::resolver::SEARCH_LIMIT;

/// Default debounce window for manual-field edits
pub const DEFAULT_DEBOUNCE_MS: u64 = constants::resolver::DEBOUNCE_MS;

/// Default map center latitude
pub const DEFAULT_CENTER_LAT: f64 = constants::map::CENTER_LAT;

/// Default map center longitude
pub const DEFAULT_CENTER_LNG: f64 = constants::map::CENTER_LNG;

/// Default map zoom level
pub const DEFAULT_ZOOM: u8 = constants::map::ZOOM;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Default idle lifetime of a picker session in seconds (0 = never reaped)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "geopick";
