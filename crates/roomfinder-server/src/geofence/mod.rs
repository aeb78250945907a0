//! Geofence provider integration.
//!
//! Building geofences carry the building's current availability in their
//! metadata so that location-aware clients can show it. Sync is best effort:
//! failures are logged by the caller and never retried.

mod radar;


use async_trait::async_trait;
use roomfinder_core::BuildingAvailability;
use serde_json::Value;

pub use radar::{RadarClient, reshape_for_update};

/// Tag under which building geofences are registered with the provider.
pub const BUILDING_TAG: &str = "building";

/// Errors that can occur talking to the geofence provider.
#[derive(Debug, thiserror::Error)]
pub enum GeofenceError {
    #[error("Geofence request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geofence API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected geofence payload: {0}")]
    Decode(String),

    #[error("Geofence configuration error: {0}")]
    Config(String),
}

/// Operations the server needs from a geofence provider.
#[async_trait]
pub trait GeofenceProvider: Send + Sync {
    /// Write `availability` into the metadata of the building's geofence.
    async fn sync_building_status(
        &self,
        building: &str,
        availability: BuildingAvailability,
    ) -> Result<(), GeofenceError>;

    async fn list_geofences(&self) -> Result<Vec<Value>, GeofenceError>;

    async fn list_events(&self) -> Result<Vec<Value>, GeofenceError>;

    async fn list_users(&self) -> Result<Vec<Value>, GeofenceError>;
}
