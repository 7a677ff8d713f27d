//! Error types for geopick

use thiserror::Error;

/// Main error type for geopick operations
#[derive(Error, Debug)]
pub enum Error {
    /// Timeout, connection failure or non-2xx answer from the geocoding service
    #[error("Network error: {0}")]
    Network(String),

    /// The geocoding service answered with a payload we could not interpret
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The geocoding service answered but had nothing for the request
    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// True for failures coming from the geocoding service round-trip
    pub fn is_geocoding_failure(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::MalformedResponse(_) | Error::Geocoding(_) | Error::Http(_)
        )
    }
}

/// Result type alias for geopick operations
pub type Result<T> = std::result::Result<T, Error>;
