//! Data models for roomfinder storage.

use roomfinder_core::geo::GeoJsonPolygon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A study space with its polygon decoded from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySpace {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub building_name: String,
    pub polygon: GeoJsonPolygon,
    pub has_outlets: Option<String>,
    pub wifi_quality: Option<String>,
    pub group_friendly: Option<bool>,
    pub quiet_study: Option<bool>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub id: String,
    pub username: String,
    pub study_space_id: String,
    #[serde(rename = "studySpaceStatusName")]
    pub status_name: String,
    pub created_at: i64,
}
