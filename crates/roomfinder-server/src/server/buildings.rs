//! Building endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::{info, instrument};

use super::{ApiError, AppState, validate};
use crate::auth::AdminUser;
use crate::availability::BuildingView;
use crate::storage::{Building, DatabaseError};

pub(super) const NAME_LEN: std::ops::RangeInclusive<usize> = 1..=200;
pub(super) const DESCRIPTION_MAX: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateBuildingRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Look up the building a nested route refers to.
pub(super) async fn require_parent(state: &AppState, name: &str) -> Result<Building, ApiError> {
    match state.db.get_building(name).await {
        Ok(building) => Ok(building),
        Err(DatabaseError::NotFound(_)) => Err(ApiError::bad_request(
            "provided buildingName does not exist",
        )),
        Err(e) => Err(e.into()),
    }
}

/// `POST /api/buildings`
#[instrument(skip_all, fields(admin = %admin.0, building = %req.name))]
pub async fn create_building(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(req): Json<CreateBuildingRequest>,
) -> Result<Json<Building>, ApiError> {
    let name = req.name.trim();
    validate::length("name", name, NAME_LEN)?;
    validate::optional_length("description", req.description.as_deref(), DESCRIPTION_MAX)?;

    match state
        .db
        .create_building(name, req.description.as_deref())
        .await
    {
        Ok(building) => {
            info!("Building created");
            Ok(Json(building))
        }
        Err(DatabaseError::Conflict(_)) => Err(ApiError::Conflict(format!(
            "building {name} already exists"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// `GET /api/buildings`
pub async fn list_buildings(
    State(state): State<AppState>,
) -> Result<Json<Vec<BuildingView>>, ApiError> {
    Ok(Json(state.availability.building_list().await?))
}

/// `GET /api/buildings/{building}`
pub async fn get_building(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BuildingView>, ApiError> {
    let building = state.db.get_building(&name).await?;
    Ok(Json(state.availability.building_view(building).await?))
}

/// `DELETE /api/buildings/{building}`
///
/// Removes the building's spaces and reports with it and cancels its
/// pending refresh.
#[instrument(skip_all, fields(admin = %admin.0, building = %name))]
pub async fn delete_building(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Building>, ApiError> {
    let building = state.db.get_building(&name).await?;
    if !state.db.delete_building(&name).await? {
        return Err(ApiError::not_found(format!("Building {name} not found")));
    }
    state.availability.scheduler().cancel(&name).await;
    state.availability.broadcast_buildings().await;
    info!("Building deleted");
    Ok(Json(building))
}
