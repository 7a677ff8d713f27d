//! Nominatim geocoding client (OpenStreetMap)
//!
//! Wraps the `/reverse` and `/search` endpoints with `addressdetails=1` so the
//! responses carry a structured address. No caching: every call is a fresh
//! request.

use crate::config::GeocoderConfig;
use crate::error::{Error, Result};
use crate::geo::{AddressComponents, Geocoder, Placemark, Position, Suggestion};
use serde::Deserialize;
use tracing::debug;

/// Nominatim geocoding client
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim `/search` response item
#[derive(Debug, Deserialize)]
struct SearchItem {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: AddressComponents,
}

/// Nominatim `/reverse` response
///
/// Positions with nothing nearby come back as HTTP 200 with only `error` set.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: AddressComponents,
    #[serde(default)]
    error: Option<String>,
}

impl NominatimClient {
    /// Create a client from the geocoder configuration
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for a specific base URL with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let config = GeocoderConfig {
            base_url: base_url.into(),
            ..GeocoderConfig::default()
        };
        Self::new(&config)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse lat/lon strings to a position
    fn parse_position(lat: &str, lon: &str) -> Result<Position> {
        let lat: f64 = lat.trim().parse().map_err(|_| {
            Error::MalformedResponse(format!("Invalid latitude: {}", lat))
        })?;
        let lng: f64 = lon.trim().parse().map_err(|_| {
            Error::MalformedResponse(format!("Invalid longitude: {}", lon))
        })?;
        Ok(Position::new(lat, lng))
    }

    /// Issue a GET and decode the JSON body
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(%url, "nominatim request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read Nominatim response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("Failed to parse Nominatim response: {}", e)))
    }
}

impl Geocoder for NominatimClient {
    async fn reverse_lookup(&self, lat: f64, lng: f64) -> Result<Placemark> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, lat, lng
        );

        let result: ReverseResponse = self.get_json(&url).await?;

        if let Some(message) = result.error {
            return Err(Error::Geocoding(message));
        }

        Ok(Placemark {
            display_name: result.display_name.filter(|name| !name.is_empty()),
            address: result.address,
        })
    }

    async fn forward_search(&self, query: &str, limit: usize) -> Result<Vec<Suggestion>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/search?q={}&format=json&addressdetails=1&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );

        let items: Vec<SearchItem> = self.get_json(&url).await?;

        items
            .into_iter()
            .take(limit)
            .map(|item| {
                let position = Self::parse_position(&item.lat, &item.lon)?;
                Ok(Suggestion {
                    display_name: item.display_name.unwrap_or_default(),
                    position,
                    address: item.address,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type Params = Query<HashMap<String, String>>;

    fn has_detail_params(params: &HashMap<String, String>) -> bool {
        params.get("format").map(String::as_str) == Some("json")
            && params.get("addressdetails").map(String::as_str) == Some("1")
    }

    async fn fake_reverse(State(hits): State<Arc<AtomicUsize>>, Query(params): Params) -> Response {
        hits.fetch_add(1, Ordering::SeqCst);
        if !has_detail_params(&params) {
            return StatusCode::BAD_REQUEST.into_response();
        }
        match params.get("lat").map(String::as_str) {
            Some("0") => Json(json!({"error": "Unable to geocode"})).into_response(),
            Some("1") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Some("2") => "not json".into_response(),
            _ => Json(json!({
                "display_name": "Rue de Rivoli, 75001 Paris, France",
                "lat": params["lat"],
                "lon": params["lon"],
                "address": {"road": "Rue de Rivoli", "town": "Paris", "postcode": "75001", "country": "France"}
            }))
            .into_response(),
        }
    }

    async fn fake_search(State(hits): State<Arc<AtomicUsize>>, Query(params): Params) -> Response {
        hits.fetch_add(1, Ordering::SeqCst);
        if !has_detail_params(&params) {
            return StatusCode::BAD_REQUEST.into_response();
        }
        match params.get("q").map(String::as_str) {
            Some("broken") => Json(json!([{"lat": "north", "lon": "2.3", "display_name": "x"}])).into_response(),
            Some("10 rue de Rivoli, Paris") => {
                let limit: usize = params["limit"].parse().unwrap_or(0);
                let items: Vec<_> = (0..limit)
                    .map(|i| json!({
                        "display_name": format!("{} Rue de Rivoli, Paris", 10 + i),
                        "lat": "48.86",
                        "lon": "2.33",
                        "address": {"road": "Rue de Rivoli", "city": "Paris", "postcode": "75001"}
                    }))
                    .collect();
                Json(json!(items)).into_response()
            }
            _ => Json(json!([])).into_response(),
        }
    }

    async fn spawn_fake_nominatim() -> (NominatimClient, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/reverse", get(fake_reverse))
            .route("/search", get(fake_search))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = NominatimClient::with_base_url(format!("http://{}", addr)).unwrap();
        (client, hits)
    }

    #[test]
    fn test_parse_position() {
        let position = NominatimClient::parse_position("48.8566", "2.3522").unwrap();
        assert_relative_eq!(position.lat, 48.8566);
        assert_relative_eq!(position.lng, 2.3522);
    }

    #[test]
    fn test_parse_position_invalid() {
        assert!(matches!(
            NominatimClient::parse_position("invalid", "0"),
            Err(Error::MalformedResponse(_))
        ));
        assert!(NominatimClient::parse_position("0", "invalid").is_err());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = NominatimClient::with_base_url("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_reverse_lookup() {
        let (client, _) = spawn_fake_nominatim().await;

        let placemark = client.reverse_lookup(48.86, 2.33).await.unwrap();
        assert_eq!(
            placemark.display_name.as_deref(),
            Some("Rue de Rivoli, 75001 Paris, France")
        );
        assert_eq!(placemark.address.street(), "Rue de Rivoli");
        assert_eq!(placemark.address.locality(), "Paris");
        assert_eq!(placemark.address.postal_code(), "75001");
    }

    #[tokio::test]
    async fn test_reverse_lookup_no_result() {
        let (client, _) = spawn_fake_nominatim().await;
        let result = client.reverse_lookup(0.0, 0.0).await;
        assert!(matches!(result, Err(Error::Geocoding(_))));
    }

    #[tokio::test]
    async fn test_reverse_lookup_server_error() {
        let (client, _) = spawn_fake_nominatim().await;
        let result = client.reverse_lookup(1.0, 0.0).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }

    #[tokio::test]
    async fn test_reverse_lookup_malformed() {
        let (client, _) = spawn_fake_nominatim().await;
        let result = client.reverse_lookup(2.0, 0.0).await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_forward_search_respects_limit_and_order() {
        let (client, _) = spawn_fake_nominatim().await;

        let suggestions = client.forward_search("10 rue de Rivoli, Paris", 3).await.unwrap();
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].display_name, "10 Rue de Rivoli, Paris");
        assert_eq!(suggestions[2].display_name, "12 Rue de Rivoli, Paris");
        assert_relative_eq!(suggestions[0].position.lat, 48.86);
        assert_relative_eq!(suggestions[0].position.lng, 2.33);
        assert_eq!(suggestions[0].address.postal_code(), "75001");
    }

    #[tokio::test]
    async fn test_forward_search_bad_coordinates() {
        let (client, _) = spawn_fake_nominatim().await;
        let result = client.forward_search("broken", 5).await;
        assert!(matches!(result, Err(Error::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_forward_search_empty_query_skips_network() {
        let (client, hits) = spawn_fake_nominatim().await;

        assert!(client.forward_search("", 5).await.unwrap().is_empty());
        assert!(client.forward_search("   ", 5).await.unwrap().is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = NominatimClient::with_base_url(format!("http://{}", addr)).unwrap();
        let result = client.forward_search("Paris", 5).await;
        assert!(matches!(result, Err(Error::Network(_))));
    }
}
