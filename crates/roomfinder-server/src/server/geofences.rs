//! Read-only passthroughs to the geofence provider.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde_json::Value;

use super::{ApiError, AppState};
use crate::geofence::GeofenceProvider;

fn provider(state: &AppState) -> Result<Arc<dyn GeofenceProvider>, ApiError> {
    state
        .availability
        .geofence()
        .cloned()
        .ok_or_else(|| ApiError::ServiceUnavailable("geofence provider is not configured".into()))
}

/// `GET /api/geofences`
pub async fn list_geofences(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(provider(&state)?.list_geofences().await?))
}

/// `GET /api/events`
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(provider(&state)?.list_events().await?))
}

/// `GET /api/displayUsers`
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(provider(&state)?.list_users().await?))
}
