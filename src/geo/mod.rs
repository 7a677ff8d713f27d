//! Geocoding module
//!
//! Defines the data exchanged with the geocoding service and the `Geocoder`
//! trait the address resolver drives: forward search (text to ranked
//! candidates) and reverse lookup (coordinates to a structured address).

pub mod nominatim;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic position picked on the map or taken from a suggestion
///
/// Replaced wholesale, never edited field by field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    /// Create a new position
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that the position is within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Address decomposition returned by the geocoding service
///
/// Only the parts the resolver reads are kept; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub town: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
}

fn first_present<'a>(candidates: &[&'a Option<String>]) -> &'a str {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
        .unwrap_or("")
}

impl AddressComponents {
    /// Street line: `road`, else empty
    pub fn street(&self) -> &str {
        first_present(&[&self.road])
    }

    /// Locality: `city`, then `town`, then `village`, else empty
    pub fn locality(&self) -> &str {
        first_present(&[&self.city, &self.town, &self.village])
    }

    /// Postal code: `postcode`, else empty
    pub fn postal_code(&self) -> &str {
        first_present(&[&self.postcode])
    }
}

/// Result of a reverse lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    /// Full address string as formatted by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: AddressComponents,
}

/// One ranked forward-search candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub display_name: String,
    pub position: Position,
    #[serde(default)]
    pub address: AddressComponents,
}

/// Trait for geocoding backends
///
/// Both operations are idempotent reads. Implementations do no caching.
pub trait Geocoder: Send + Sync {
    /// Reverse geocode a position to its best-match address
    fn reverse_lookup(
        &self,
        lat: f64,
        lng: f64,
    ) -> impl std::future::Future<Output = Result<Placemark>> + Send;

    /// Search free text, returning at most `limit` candidates in service rank order
    ///
    /// Empty or whitespace-only queries return no candidates without a network call.
    fn forward_search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Suggestion>>> + Send;
}
