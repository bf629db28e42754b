//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::Coordinates;
use crate::error::Error;
use crate::format::{available_formats, get_formatter, FormatInfo};
use crate::server::state::AppState;
use crate::tracker::{Notification, ViewState};
use crate::view::{project, ViewFrame};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/formats", get(formats_handler))
        .route("/api/state", get(state_handler))
        .route("/api/export", get(export_handler))
        .route("/api/search", post(search_handler))
        .route("/api/destination", post(destination_handler))
        .route("/api/recenter", post(recenter_handler))
        .route("/api/swap", post(swap_handler))
        .route("/api/position", post(position_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn api_error(err: Error) -> (StatusCode, Json<ApiError>) {
    let (status, code) = match &err {
        Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
        Error::Config(_) => (StatusCode::BAD_REQUEST, "CONFIG_ERROR"),
        Error::SessionClosed => (StatusCode::SERVICE_UNAVAILABLE, "SESSION_CLOSED"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (
        status,
        Json(ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }),
    )
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    pub geocoder: String,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoder: state.geocoder.clone(),
    })
}

/// Formats list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
}

/// List available export formats
///
/// GET /api/formats
async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: available_formats(),
    })
}

/// Current state plus its projection
#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: ViewState,
    pub frame: ViewFrame,
}

/// Current session state
///
/// GET /api/state
async fn state_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<StateResponse>> {
    let view = state.session.snapshot().await.map_err(api_error)?;
    let frame = project(&view, state.zoom());
    Ok(Json(StateResponse { state: view, frame }))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// Current frame rendered in an export format
///
/// GET /api/export?format=gpx
async fn export_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<String> {
    let name = query
        .format
        .unwrap_or_else(|| state.config.defaults.format.clone());
    let formatter = get_formatter(&name)
        .ok_or_else(|| api_error(Error::Config(format!("Unknown format: {}", name))))?;

    let view = state.session.snapshot().await.map_err(api_error)?;
    let frame = project(&view, state.zoom());
    formatter.format(&frame, &state.config).map_err(api_error)
}

/// Query text for search and destination
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Position update body
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub lat: f64,
    pub lng: f64,
}

/// Result of a user action
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub state: ViewState,
    pub notifications: Vec<Notification>,
}

async fn action_response(
    state: &AppState,
    notifications: crate::error::Result<Vec<Notification>>,
) -> ApiResult<Json<ActionResponse>> {
    let notifications = notifications.map_err(api_error)?;
    let view = state.session.snapshot().await.map_err(api_error)?;
    Ok(Json(ActionResponse {
        state: view,
        notifications,
    }))
}

/// Set "your location" from a place name
///
/// POST /api/search
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<ActionResponse>> {
    let result = state.session.search(req.query).await;
    action_response(&state, result).await
}

/// Set the destination from a place name
///
/// POST /api/destination
async fn destination_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<ActionResponse>> {
    let result = state.session.set_destination(req.query).await;
    action_response(&state, result).await
}

/// Move the marker to the environment's current position
///
/// POST /api/recenter
async fn recenter_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<ActionResponse>> {
    let result = state.session.recenter().await;
    action_response(&state, result).await
}

/// Swap origin and destination
///
/// POST /api/swap
async fn swap_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<ActionResponse>> {
    let result = state.session.swap().await;
    action_response(&state, result).await
}

/// Deliver a geolocation reading from the widget
///
/// POST /api/position
async fn position_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PositionRequest>,
) -> ApiResult<Json<ActionResponse>> {
    let result = state
        .session
        .update_position(Coordinates::new(req.lat, req.lng))
        .await;
    action_response(&state, result).await
}
