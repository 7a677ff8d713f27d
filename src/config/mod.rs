//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/geopick/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::geo::Position;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geocoding service settings
    #[serde(default)]
    pub geocoder: GeocoderConfig,

    /// Address resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Initial map view
    #[serde(default)]
    pub map: MapConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Geocoding service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    /// Base URL of the Nominatim-compatible service
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds, 0 keeps the HTTP client default
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Suggestions requested per forward search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

/// Address resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Debounce window for manual-field edits, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Initial map view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_center_lat")]
    pub center_lat: f64,

    #[serde(default = "default_center_lng")]
    pub center_lng: f64,

    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Idle picker sessions are closed after this many seconds, 0 keeps them
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_center_lat() -> f64 {
    DEFAULT_CENTER_LAT
}
fn default_center_lng() -> f64 {
    DEFAULT_CENTER_LNG
}
fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map={zoom}/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},{zoom}z".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}&z={zoom}".to_string(),
    );
    providers
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_center_lat(),
            center_lng: default_center_lng(),
            zoom: default_zoom(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl GeocoderConfig {
    /// Explicit request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl ServerConfig {
    /// Idle lifetime of a picker session, `None` when disabled
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}

impl MapConfig {
    /// Map center used while no position has been chosen
    pub fn center(&self) -> Position {
        Position::new(self.center_lat, self.center_lng)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, writing defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "base_url"] => Some(self.geocoder.base_url.clone()),
            ["geocoder", "user_agent"] => Some(self.geocoder.user_agent.clone()),
            ["geocoder", "timeout_secs"] => Some(self.geocoder.timeout_secs.to_string()),
            ["geocoder", "search_limit"] => Some(self.geocoder.search_limit.to_string()),

            ["resolver", "debounce_ms"] => Some(self.resolver.debounce_ms.to_string()),

            ["map", "center_lat"] => Some(self.map.center_lat.to_string()),
            ["map", "center_lng"] => Some(self.map.center_lng.to_string()),
            ["map", "zoom"] => Some(self.map.zoom.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "session_ttl_secs"] => Some(self.server.session_ttl_secs.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geocoder", "base_url"] => {
                self.geocoder.base_url = value.trim_end_matches('/').to_string();
            }
            ["geocoder", "user_agent"] => {
                self.geocoder.user_agent = value.to_string();
            }
            ["geocoder", "timeout_secs"] => {
                self.geocoder.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }
            ["geocoder", "search_limit"] => {
                let limit: usize = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid search limit: {}", value))
                })?;
                if limit == 0 {
                    return Err(Error::Config("Search limit must be at least 1".to_string()));
                }
                self.geocoder.search_limit = limit;
            }

            ["resolver", "debounce_ms"] => {
                self.resolver.debounce_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid debounce value: {}", value))
                })?;
            }

            ["map", "center_lat"] => {
                let lat: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid latitude: {}", value))
                })?;
                Position::new(lat, self.map.center_lng).validate()?;
                self.map.center_lat = lat;
            }
            ["map", "center_lng"] => {
                let lng: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid longitude: {}", value))
                })?;
                Position::new(self.map.center_lat, lng).validate()?;
                self.map.center_lng = lng;
            }
            ["map", "zoom"] => {
                self.map.zoom = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid zoom value: {}", value))
                })?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }
            ["server", "session_ttl_secs"] => {
                self.server.session_ttl_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid session TTL: {}", value))
                })?;
            }

            ["url", "default"] => {
                if !self.url.providers.contains_key(value) {
                    return Err(Error::Config(format!("Unknown URL provider: {}", value)));
                }
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geocoder.base_url",
            "geocoder.user_agent",
            "geocoder.timeout_secs",
            "geocoder.search_limit",
            "resolver.debounce_ms",
            "map.center_lat",
            "map.center_lng",
            "map.zoom",
            "server.host",
            "server.port",
            "server.session_ttl_secs",
            "url.default",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat}, {lng} and {zoom} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, position: Position) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &position.lat.to_string())
            .replace("{lng}", &position.lng.to_string())
            .replace("{zoom}", &self.map.zoom.to_string()))
    }

    /// Debounce window as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.resolver.debounce_ms)
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.geocoder.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.geocoder.search_limit, 5);
        assert_eq!(config.resolver.debounce_ms, 500);
        assert_eq!(config.map.zoom, 13);
        assert_eq!(config.server.port, 7979);
        assert!(config.geocoder.timeout().is_none());
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("resolver.debounce_ms"), Some("500".to_string()));

        config.set("resolver.debounce_ms", "250").unwrap();
        assert_eq!(config.get("resolver.debounce_ms"), Some("250".to_string()));
        assert_eq!(config.debounce(), Duration::from_millis(250));

        config.set("geocoder.base_url", "http://localhost:8080/").unwrap();
        assert_eq!(config.geocoder.base_url, "http://localhost:8080");

        config.set("geocoder.timeout_secs", "10").unwrap();
        assert_eq!(config.geocoder.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("resolver.debounce_ms", "soon").is_err());
        assert!(config.set("geocoder.search_limit", "0").is_err());
        assert!(config.set("map.center_lat", "91").is_err());
        assert!(config.set("url.default", "mapquest").is_err());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();
        let position = Position::new(48.86, 2.33);

        let url = config.format_url(Some("google"), position).unwrap();
        assert_eq!(url, "https://www.google.com/maps/@48.86,2.33,13z");

        let url = config.format_url(None, position).unwrap();
        assert_eq!(
            url,
            "https://www.openstreetmap.org/?mlat=48.86&mlon=2.33#map=13/48.86/2.33"
        );
    }

    #[test]
    fn test_format_url_unknown_provider() {
        let config = Config::default();
        let result = config.format_url(Some("unknown"), Position::new(0.0, 0.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.resolver.debounce_ms, 500);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.geocoder.base_url = "http://127.0.0.1:9000".to_string();
        config.resolver.debounce_ms = 300;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.geocoder.base_url, "http://127.0.0.1:9000");
        assert_eq!(loaded.resolver.debounce_ms, 300);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[resolver]\ndebounce_ms = 100\n").unwrap();
        assert_eq!(loaded.resolver.debounce_ms, 100);
        assert_eq!(loaded.geocoder.search_limit, 5);
        assert_eq!(loaded.map.center(), Position::new(48.8566, 2.3522));
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[geocoder]"));
        assert!(toml.contains("[resolver]"));
        assert!(toml.contains("[map]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_session_ttl() {
        let mut config = Config::default();
        assert_eq!(config.server.session_ttl(), Some(Duration::from_secs(1800)));

        config.set("server.session_ttl_secs", "0").unwrap();
        assert_eq!(config.get("server.session_ttl_secs"), Some("0".to_string()));
        assert!(config.server.session_ttl().is_none());

        assert!(config.set("server.session_ttl_secs", "forever").is_err());
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:7979");
    }

    #[test]
    fn test_available_keys_are_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} should be readable", key);
        }
    }
}
