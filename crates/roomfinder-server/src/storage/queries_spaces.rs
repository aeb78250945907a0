//! Study space queries for the roomfinder server.

use roomfinder_core::db::unix_timestamp;
use roomfinder_core::geo::GeoJsonPolygon;

use super::db::{Database, DatabaseError};
use super::models::StudySpace;

/// Parameters for creating a study space.
pub struct NewStudySpace<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub capacity: i64,
    pub building_name: &'a str,
    pub polygon: &'a GeoJsonPolygon,
    pub has_outlets: Option<&'a str>,
    pub wifi_quality: Option<&'a str>,
    pub group_friendly: Option<bool>,
    pub quiet_study: Option<bool>,
}

#[derive(sqlx::FromRow)]
struct StudySpaceRow {
    id: String,
    name: String,
    description: Option<String>,
    capacity: i64,
    building_name: String,
    polygon: String,
    has_outlets: Option<String>,
    wifi_quality: Option<String>,
    group_friendly: Option<bool>,
    quiet_study: Option<bool>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<StudySpaceRow> for StudySpace {
    type Error = DatabaseError;

    fn try_from(row: StudySpaceRow) -> Result<Self, Self::Error> {
        let polygon = serde_json::from_str(&row.polygon).map_err(|e| {
            DatabaseError::Query(format!("Study space {} has a corrupt polygon: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            capacity: row.capacity,
            building_name: row.building_name,
            polygon,
            has_outlets: row.has_outlets,
            wifi_quality: row.wifi_quality,
            group_friendly: row.group_friendly,
            quiet_study: row.quiet_study,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn encode_polygon(polygon: &GeoJsonPolygon) -> Result<String, DatabaseError> {
    serde_json::to_string(polygon).map_err(|e| DatabaseError::Query(e.to_string()))
}

fn decode_all(rows: Vec<StudySpaceRow>) -> Result<Vec<StudySpace>, DatabaseError> {
    rows.into_iter().map(StudySpace::try_from).collect()
}

impl Database {
    /// Create a study space with a fresh id.
    pub async fn create_study_space(
        &self,
        params: &NewStudySpace<'_>,
    ) -> Result<StudySpace, DatabaseError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO study_spaces (id, name, description, capacity, building_name, polygon, has_outlets, wifi_quality, group_friendly, quiet_study, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.capacity)
        .bind(params.building_name)
        .bind(encode_polygon(params.polygon)?)
        .bind(params.has_outlets)
        .bind(params.wifi_quality)
        .bind(params.group_friendly)
        .bind(params.quiet_study)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_study_space(&id).await
    }

    pub async fn get_study_space(&self, id: &str) -> Result<StudySpace, DatabaseError> {
        sqlx::query_as::<_, StudySpaceRow>("SELECT * FROM study_spaces WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Study space {id}")))?
            .try_into()
    }

    /// Get a study space only if it belongs to the given building.
    pub async fn get_study_space_in_building(
        &self,
        building_name: &str,
        id: &str,
    ) -> Result<StudySpace, DatabaseError> {
        sqlx::query_as::<_, StudySpaceRow>(
            "SELECT * FROM study_spaces WHERE id = ? AND building_name = ?",
        )
        .bind(id)
        .bind(building_name)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| {
            DatabaseError::NotFound(format!("Study space {id} in building {building_name}"))
        })?
        .try_into()
    }

    pub async fn list_study_spaces(&self) -> Result<Vec<StudySpace>, DatabaseError> {
        let rows = sqlx::query_as::<_, StudySpaceRow>(
            "SELECT * FROM study_spaces ORDER BY building_name, name",
        )
        .fetch_all(self.pool())
        .await?;

        decode_all(rows)
    }

    pub async fn list_spaces_in_building(
        &self,
        building_name: &str,
    ) -> Result<Vec<StudySpace>, DatabaseError> {
        let rows = sqlx::query_as::<_, StudySpaceRow>(
            "SELECT * FROM study_spaces WHERE building_name = ? ORDER BY name",
        )
        .bind(building_name)
        .fetch_all(self.pool())
        .await?;

        decode_all(rows)
    }

    /// Overwrite every mutable column of an existing study space and bump
    /// `updated_at`.
    pub async fn update_study_space(&self, space: &StudySpace) -> Result<StudySpace, DatabaseError> {
        let result = sqlx::query(
            "UPDATE study_spaces SET name = ?, description = ?, capacity = ?, building_name = ?, polygon = ?, has_outlets = ?, wifi_quality = ?, group_friendly = ?, quiet_study = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&space.name)
        .bind(&space.description)
        .bind(space.capacity)
        .bind(&space.building_name)
        .bind(encode_polygon(&space.polygon)?)
        .bind(&space.has_outlets)
        .bind(&space.wifi_quality)
        .bind(space.group_friendly)
        .bind(space.quiet_study)
        .bind(unix_timestamp())
        .bind(&space.id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Study space {}", space.id)));
        }
        self.get_study_space(&space.id).await
    }

    /// Delete a study space and, by cascade, its reports.
    pub async fn delete_study_space(&self, id: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM study_spaces WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
