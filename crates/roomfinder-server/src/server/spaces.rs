//! Study space endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use roomfinder_core::SpaceAvailability;
use roomfinder_core::geo::{self, LeafletPolygon, Point};
use serde::Deserialize;
use tracing::{info, instrument};

use super::buildings::{DESCRIPTION_MAX, NAME_LEN, require_parent};
use super::{ApiError, AppState, validate};
use crate::auth::AdminUser;
use crate::availability::SpaceView;
use crate::storage::{NewStudySpace, StudySpace};

const CAPACITY: std::ops::RangeInclusive<i64> = 0..=2000;
const AMENITY_MAX: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceRequest {
    pub name: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub polygon: LeafletPolygon,
    pub has_outlets: Option<String>,
    pub wifi_quality: Option<String>,
    pub group_friendly: Option<bool>,
    pub quiet_study: Option<bool>,
}

impl CreateSpaceRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate::length("name", self.name.trim(), NAME_LEN)?;
        validate::optional_length("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        validate::in_range("capacity", self.capacity, CAPACITY)?;
        validate::optional_length("hasOutlets", self.has_outlets.as_deref(), AMENITY_MAX)?;
        validate::optional_length("wifiQuality", self.wifi_quality.as_deref(), AMENITY_MAX)
    }
}

/// Fields a partial update may change. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i64>,
    pub building_name: Option<String>,
    pub polygon: Option<LeafletPolygon>,
    pub has_outlets: Option<String>,
    pub wifi_quality: Option<String>,
    pub group_friendly: Option<bool>,
    pub quiet_study: Option<bool>,
}

impl UpdateSpaceRequest {
    fn apply(self, space: &mut StudySpace) -> Result<(), ApiError> {
        if let Some(name) = self.name {
            let name = name.trim();
            validate::length("name", name, NAME_LEN)?;
            space.name = name.to_string();
        }
        if let Some(description) = self.description {
            validate::length("description", &description, 0..=DESCRIPTION_MAX)?;
            space.description = Some(description);
        }
        if let Some(capacity) = self.capacity {
            validate::in_range("capacity", capacity, CAPACITY)?;
            space.capacity = capacity;
        }
        if let Some(polygon) = self.polygon {
            space.polygon = polygon.to_geojson()?;
        }
        if let Some(has_outlets) = self.has_outlets {
            validate::length("hasOutlets", &has_outlets, 0..=AMENITY_MAX)?;
            space.has_outlets = Some(has_outlets);
        }
        if let Some(wifi_quality) = self.wifi_quality {
            validate::length("wifiQuality", &wifi_quality, 0..=AMENITY_MAX)?;
            space.wifi_quality = Some(wifi_quality);
        }
        if self.group_friendly.is_some() {
            space.group_friendly = self.group_friendly;
        }
        if self.quiet_study.is_some() {
            space.quiet_study = self.quiet_study;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ClosestQuery {
    pub lng: f64,
    pub lat: f64,
}

/// `POST /api/buildings/{building}/studySpaces`
#[instrument(skip_all, fields(admin = %admin.0, building = %building))]
pub async fn create_space(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(building): Path<String>,
    Json(req): Json<CreateSpaceRequest>,
) -> Result<Json<SpaceView>, ApiError> {
    req.validate()?;
    require_parent(&state, &building).await?;
    let polygon = req.polygon.to_geojson()?;

    let space = state
        .db
        .create_study_space(&NewStudySpace {
            name: req.name.trim(),
            description: req.description.as_deref(),
            capacity: req.capacity,
            building_name: &building,
            polygon: &polygon,
            has_outlets: req.has_outlets.as_deref(),
            wifi_quality: req.wifi_quality.as_deref(),
            group_friendly: req.group_friendly,
            quiet_study: req.quiet_study,
        })
        .await?;
    info!(space_id = %space.id, "Study space created");
    Ok(Json(state.availability.space_view(space).await?))
}

/// `GET /api/buildings/{building}/studySpaces`
pub async fn list_spaces_in_building(
    State(state): State<AppState>,
    Path(building): Path<String>,
) -> Result<Json<Vec<SpaceView>>, ApiError> {
    require_parent(&state, &building).await?;
    let spaces = state.db.list_spaces_in_building(&building).await?;
    Ok(Json(state.availability.space_views(spaces).await?))
}

/// `GET /api/buildings/{building}/studySpaces/{id}`
pub async fn get_space(
    State(state): State<AppState>,
    Path((building, id)): Path<(String, String)>,
) -> Result<Json<SpaceView>, ApiError> {
    require_parent(&state, &building).await?;
    let space = state.db.get_study_space_in_building(&building, &id).await?;
    Ok(Json(state.availability.space_view(space).await?))
}

/// `PATCH /api/buildings/{building}/studySpaces/{id}`
///
/// Setting `buildingName` moves the space; the target building must exist.
#[instrument(skip_all, fields(admin = %admin.0, building = %building, space_id = %id))]
pub async fn update_space(
    admin: AdminUser,
    State(state): State<AppState>,
    Path((building, id)): Path<(String, String)>,
    Json(req): Json<UpdateSpaceRequest>,
) -> Result<Json<SpaceView>, ApiError> {
    require_parent(&state, &building).await?;
    let mut space = state.db.get_study_space_in_building(&building, &id).await?;

    if let Some(target) = req.building_name.as_deref()
        && target != building
    {
        require_parent(&state, target).await?;
        space.building_name = target.to_string();
    }
    req.apply(&mut space)?;

    let updated = state.db.update_study_space(&space).await?;
    info!(moved_to = %updated.building_name, "Study space updated");
    Ok(Json(state.availability.space_view(updated).await?))
}

/// `DELETE /api/buildings/{building}/studySpaces/{id}`
#[instrument(skip_all, fields(admin = %admin.0, building = %building, space_id = %id))]
pub async fn delete_space(
    admin: AdminUser,
    State(state): State<AppState>,
    Path((building, id)): Path<(String, String)>,
) -> Result<Json<SpaceView>, ApiError> {
    require_parent(&state, &building).await?;
    let space = state.db.get_study_space_in_building(&building, &id).await?;
    if !state.db.delete_study_space(&id).await? {
        return Err(ApiError::not_found(format!("Study space {id} not found")));
    }
    info!("Study space deleted");
    Ok(Json(SpaceView::new(space, SpaceAvailability::default())))
}

/// `GET /api/studySpaces`
pub async fn list_all_spaces(
    State(state): State<AppState>,
) -> Result<Json<Vec<SpaceView>>, ApiError> {
    let spaces = state.db.list_study_spaces().await?;
    Ok(Json(state.availability.space_views(spaces).await?))
}

/// `GET /api/closestStudySpace?lng=..&lat=..`
pub async fn closest_space(
    State(state): State<AppState>,
    Query(query): Query<ClosestQuery>,
) -> Result<Json<SpaceView>, ApiError> {
    let point = Point::new(query.lng, query.lat)?;
    let spaces = state.db.list_study_spaces().await?;
    let Some(closest) = geo::nearest(&point, &spaces, |s| &s.polygon) else {
        return Err(ApiError::not_found("no study spaces exist"));
    };
    Ok(Json(state.availability.space_view(closest.clone()).await?))
}
