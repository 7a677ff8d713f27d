//! HTTP API routes
//!
//! Geocoding proxies plus the picker session endpoints through which a web
//! client drives an address widget.

use crate::error::Error;
use crate::geo::{Geocoder, Placemark, Position, Suggestion};
use crate::resolver::{ResolverSnapshot, UserEvent};
use crate::server::state::{AppState, PickerUpdate};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Create the API router
pub fn create_router<G: Geocoder + 'static>(state: Arc<AppState<G>>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler::<G>))
        .route("/api/geocode/reverse", get(reverse_handler::<G>))
        .route("/api/geocode/search", get(search_handler::<G>))
        .route("/api/pickers", post(open_picker_handler::<G>))
        .route(
            "/api/pickers/:id",
            get(picker_handler::<G>).delete(close_picker_handler::<G>),
        )
        .route("/api/pickers/:id/events", post(picker_event_handler::<G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn not_found(id: Uuid) -> Self {
        ApiError {
            error: format!("Picker not found: {}", id),
            code: "NOT_FOUND".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "NETWORK_ERROR" | "MALFORMED_RESPONSE" | "GEOCODING_ERROR" => StatusCode::BAD_GATEWAY,
            "INTERNAL_ERROR" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Network(_) | Error::Http(_) => "NETWORK_ERROR",
            Error::MalformedResponse(_) => "MALFORMED_RESPONSE",
            Error::Geocoding(_) => "GEOCODING_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Picker sessions currently open
    pub open_pickers: usize,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        open_pickers: state.open_pickers().await,
        uptime_secs: state.uptime_secs(),
    })
}

/// Reverse geocoding query
#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Reverse geocode a position
///
/// GET /api/geocode/reverse?lat=..&lon=..
async fn reverse_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<Placemark>, ApiError> {
    Position::new(query.lat, query.lon).validate()?;
    let placemark = state.geocoder().reverse_lookup(query.lat, query.lon).await?;
    Ok(Json(placemark))
}

/// Forward search query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// Search free text for address candidates
///
/// GET /api/geocode/search?q=..&limit=..
async fn search_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    let limit = query.limit.unwrap_or(state.config.geocoder.search_limit);
    let suggestions = state.geocoder().forward_search(&query.q, limit).await?;
    Ok(Json(suggestions))
}

/// Newly opened picker
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenPickerResponse {
    pub id: Uuid,
    pub snapshot: ResolverSnapshot,
}

/// Open an address widget
///
/// POST /api/pickers
async fn open_picker_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<(StatusCode, Json<OpenPickerResponse>), ApiError> {
    let (id, snapshot) = state.open_picker().await?;
    Ok((StatusCode::CREATED, Json(OpenPickerResponse { id, snapshot })))
}

/// Current view of a picker
///
/// GET /api/pickers/:id
async fn picker_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResolverSnapshot>, ApiError> {
    state
        .picker_snapshot(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(id))
}

/// Forward a user interaction to a picker
///
/// POST /api/pickers/:id/events
async fn picker_event_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<Uuid>,
    Json(event): Json<UserEvent>,
) -> Result<Json<PickerUpdate>, ApiError> {
    state
        .send_event(id, event)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(id))
}

/// Close a picker without confirming
///
/// DELETE /api/pickers/:id
async fn close_picker_handler<G: Geocoder + 'static>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.close_picker(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(id))
    }
}
