//! Availability service: report intake, aggregation and live propagation.
//!
//! Accepting a report recomputes and broadcasts the building list right
//! away, then re-arms the building's debounce timer so that a second
//! broadcast goes out once the report has aged out of the window.

use std::sync::Arc;

use roomfinder_core::availability::{
    Aggregator, BuildingAvailability, ReportWindow, SpaceAvailability, aggregate_building,
};
use roomfinder_core::geo::LeafletPolygon;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::clock::Clock;
use crate::geofence::GeofenceProvider;
use crate::hub::{BroadcastHub, ClientHandle};
use crate::scheduler::UpdateScheduler;
use crate::storage::{AvailabilityReport, Building, Database, DatabaseError, StudySpace};

/// Errors from the availability service.
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("{0}")]
    Validation(String),

    /// A parent referenced by the request does not exist.
    #[error("{0}")]
    InvalidReference(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error("failed to serialize building list: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of submitting a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(AvailabilityReport),
    RateLimited { retry_after_minutes: u64 },
}

/// Building with its derived availability, as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingView {
    #[serde(flatten)]
    pub building: Building,
    #[serde(flatten)]
    pub availability: BuildingAvailability,
}

/// Study space with its polygon in frontend order and derived availability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpaceView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub building_name: String,
    pub polygon: LeafletPolygon,
    pub has_outlets: Option<String>,
    pub wifi_quality: Option<String>,
    pub group_friendly: Option<bool>,
    pub quiet_study: Option<bool>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(flatten)]
    pub availability: SpaceAvailability,
}

impl SpaceView {
    pub fn new(space: StudySpace, availability: SpaceAvailability) -> Self {
        Self {
            polygon: space.polygon.to_leaflet(),
            id: space.id,
            name: space.name,
            description: space.description,
            capacity: space.capacity,
            building_name: space.building_name,
            has_outlets: space.has_outlets,
            wifi_quality: space.wifi_quality,
            group_friendly: space.group_friendly,
            quiet_study: space.quiet_study,
            created_at: space.created_at,
            updated_at: space.updated_at,
            availability,
        }
    }
}

pub struct AvailabilityService {
    db: Database,
    clock: Arc<dyn Clock>,
    aggregator: Aggregator,
    window: ReportWindow,
    hub: BroadcastHub,
    scheduler: UpdateScheduler,
    geofence: Option<Arc<dyn GeofenceProvider>>,
    /// Held from the rate-limit lookup through the insert.
    intake: Mutex<()>,
}

impl AvailabilityService {
    pub fn new(
        db: Database,
        clock: Arc<dyn Clock>,
        aggregator: Aggregator,
        window: ReportWindow,
        hub: BroadcastHub,
        scheduler: UpdateScheduler,
        geofence: Option<Arc<dyn GeofenceProvider>>,
    ) -> Self {
        Self {
            db,
            clock,
            aggregator,
            window,
            hub,
            scheduler,
            geofence,
            intake: Mutex::new(()),
        }
    }

    pub const fn window(&self) -> ReportWindow {
        self.window
    }

    pub const fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    pub const fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn geofence(&self) -> Option<&Arc<dyn GeofenceProvider>> {
        self.geofence.as_ref()
    }

    // =========================================================================
    // Report intake
    // =========================================================================

    /// Record a report from `reporter` unless they reported the same space
    /// within the window.
    ///
    /// An accepted report is stored before the building is recomputed, so
    /// the broadcast it triggers always includes it.
    #[instrument(skip(self))]
    pub async fn submit_report(
        &self,
        building: &str,
        space_id: &str,
        reporter: &str,
        status_label: &str,
    ) -> Result<SubmitOutcome, AvailabilityError> {
        if !self.db.status_exists(status_label).await? {
            return Err(AvailabilityError::Validation(
                "provided studySpaceStatusName does not exist".into(),
            ));
        }
        self.space_in_building(building, space_id).await?;

        let report = {
            let _intake = self.intake.lock().await;
            let now = self.clock.now();
            if let Some(last) = self.db.most_recent_report(reporter, space_id).await? {
                if let Some(retry_after_minutes) =
                    self.window.retry_after_minutes(last.created_at, now)
                {
                    debug!(retry_after_minutes, "Report rate limited");
                    return Ok(SubmitOutcome::RateLimited {
                        retry_after_minutes,
                    });
                }
            }

            let report = AvailabilityReport {
                id: uuid::Uuid::new_v4().to_string(),
                username: reporter.to_string(),
                study_space_id: space_id.to_string(),
                status_name: status_label.to_string(),
                created_at: now,
            };
            self.db.insert_report(&report).await?;
            report
        };
        info!(report_id = %report.id, "Availability report accepted");

        self.refresh_building(building).await;
        self.scheduler.arm(building).await;

        Ok(SubmitOutcome::Accepted(report))
    }

    async fn space_in_building(
        &self,
        building: &str,
        space_id: &str,
    ) -> Result<StudySpace, AvailabilityError> {
        self.db.get_building(building).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => {
                AvailabilityError::InvalidReference("provided buildingName does not exist".into())
            }
            other => other.into(),
        })?;
        match self.db.get_study_space_in_building(building, space_id).await {
            Err(DatabaseError::NotFound(_)) => Err(AvailabilityError::InvalidReference(
                "provided studySpaceId does not exist in this building".into(),
            )),
            other => Ok(other?),
        }
    }

    /// Raw reports for a space that are inside the window.
    pub async fn reports_in_window(
        &self,
        building: &str,
        space_id: &str,
    ) -> Result<Vec<AvailabilityReport>, AvailabilityError> {
        self.space_in_building(building, space_id).await?;
        let since = self.window.since(self.clock.now());
        Ok(self.db.find_reports_since(space_id, since).await?)
    }

    // =========================================================================
    // Aggregation
    // =========================================================================

    pub async fn aggregated_space(
        &self,
        space: &StudySpace,
    ) -> Result<SpaceAvailability, DatabaseError> {
        let since = self.window.since(self.clock.now());
        let reports = self.db.find_reports_since(&space.id, since).await?;
        Ok(self
            .aggregator
            .aggregate(reports.iter().map(|r| r.status_name.as_str())))
    }

    pub async fn aggregated_building(
        &self,
        building: &str,
    ) -> Result<BuildingAvailability, DatabaseError> {
        let spaces = self.db.list_spaces_in_building(building).await?;
        let mut per_space = Vec::with_capacity(spaces.len());
        for space in &spaces {
            per_space.push(self.aggregated_space(space).await?);
        }
        Ok(aggregate_building(&per_space))
    }

    pub async fn space_view(&self, space: StudySpace) -> Result<SpaceView, DatabaseError> {
        let availability = self.aggregated_space(&space).await?;
        Ok(SpaceView::new(space, availability))
    }

    pub async fn space_views(&self, spaces: Vec<StudySpace>) -> Result<Vec<SpaceView>, DatabaseError> {
        let mut views = Vec::with_capacity(spaces.len());
        for space in spaces {
            views.push(self.space_view(space).await?);
        }
        Ok(views)
    }

    pub async fn building_view(&self, building: Building) -> Result<BuildingView, DatabaseError> {
        let availability = self.aggregated_building(&building.name).await?;
        Ok(BuildingView {
            building,
            availability,
        })
    }

    /// Every building with its derived status.
    pub async fn building_list(&self) -> Result<Vec<BuildingView>, DatabaseError> {
        let buildings = self.db.list_buildings().await?;
        let mut views = Vec::with_capacity(buildings.len());
        for building in buildings {
            views.push(self.building_view(building).await?);
        }
        Ok(views)
    }

    // =========================================================================
    // Propagation
    // =========================================================================

    /// Serialized building list, as pushed to live clients.
    pub async fn building_list_json(&self) -> Result<String, AvailabilityError> {
        let list = self.building_list().await?;
        Ok(serde_json::to_string(&list)?)
    }

    /// Register a live client and queue the current building list for it
    /// alone.
    pub async fn connect_client(&self) -> ClientHandle {
        let client = self.hub.register().await;
        match self.building_list_json().await {
            Ok(list) => {
                self.hub.send_to(client.id, list).await;
            }
            Err(e) => {
                warn!(client_id = %client.id, error = %e, "Failed to load initial building list");
            }
        }
        client
    }

    /// Recompute the building list once and send it to every live client.
    pub async fn broadcast_buildings(&self) -> usize {
        match self.building_list_json().await {
            Ok(json) => {
                let delivered = self.hub.broadcast(json).await;
                debug!(delivered, "Building list broadcast");
                delivered
            }
            Err(e) => {
                warn!(error = %e, "Failed to compute building list for broadcast");
                0
            }
        }
    }

    /// Broadcast the building list and push `building`'s status to the
    /// geofence provider. Provider sync runs in the background.
    #[instrument(skip(self))]
    pub async fn refresh_building(&self, building: &str) {
        self.broadcast_buildings().await;

        let Some(provider) = self.geofence.clone() else {
            return;
        };
        let availability = match self.aggregated_building(building).await {
            Ok(availability) => availability,
            Err(e) => {
                warn!(building, error = %e, "Failed to aggregate building for geofence sync");
                return;
            }
        };
        let building = building.to_string();
        tokio::spawn(async move {
            if let Err(e) = provider.sync_building_status(&building, availability).await {
                warn!(building = %building, error = %e, "Geofence sync failed");
            }
        });
    }

    /// Consume fired timers until the scheduler is dropped.
    pub async fn run_scheduled_refreshes(
        self: Arc<Self>,
        mut fired: mpsc::UnboundedReceiver<String>,
    ) {
        while let Some(building) = fired.recv().await {
            // A timer may outlive its building if the delete raced the fire.
            match self.db.get_building(&building).await {
                Ok(_) => self.refresh_building(&building).await,
                Err(DatabaseError::NotFound(_)) => {
                    debug!(building = %building, "Skipping refresh for deleted building");
                }
                Err(e) => warn!(building = %building, error = %e, "Scheduled refresh failed"),
            }
        }
    }

    /// Push every building's status to the geofence provider, one by one.
    pub async fn sync_all_geofences(&self) -> Result<usize, DatabaseError> {
        let Some(provider) = &self.geofence else {
            return Ok(0);
        };
        let mut synced = 0;
        for building in self.db.list_buildings().await? {
            let availability = self.aggregated_building(&building.name).await?;
            match provider
                .sync_building_status(&building.name, availability)
                .await
            {
                Ok(()) => synced += 1,
                Err(e) => warn!(building = %building.name, error = %e, "Geofence sync failed"),
            }
        }
        info!(synced, "Startup geofence sync complete");
        Ok(synced)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
#[path = "availability_tests.rs"]
mod tests;
