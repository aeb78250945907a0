//! Availability report endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use super::{ApiError, AppState};
use crate::auth::AuthUser;
use crate::availability::SubmitOutcome;
use crate::storage::AvailabilityReport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub study_space_status_name: String,
}

/// `POST /api/buildings/{building}/studySpaces/{id}/availabilityReports`
#[instrument(skip_all, fields(user = %user.0, building = %building, space_id = %id))]
pub async fn create_report(
    user: AuthUser,
    State(state): State<AppState>,
    Path((building, id)): Path<(String, String)>,
    Json(req): Json<CreateReportRequest>,
) -> Result<Json<AvailabilityReport>, ApiError> {
    match state
        .availability
        .submit_report(&building, &id, &user.0, &req.study_space_status_name)
        .await?
    {
        SubmitOutcome::Accepted(report) => Ok(Json(report)),
        SubmitOutcome::RateLimited {
            retry_after_minutes,
        } => Err(ApiError::RateLimited {
            retry_after_minutes,
        }),
    }
}

/// `GET /api/buildings/{building}/studySpaces/{id}/availabilityReports`
pub async fn list_reports(
    State(state): State<AppState>,
    Path((building, id)): Path<(String, String)>,
) -> Result<Json<Vec<AvailabilityReport>>, ApiError> {
    Ok(Json(
        state.availability.reports_in_window(&building, &id).await?,
    ))
}
