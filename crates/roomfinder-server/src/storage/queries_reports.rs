//! Availability report queries for the roomfinder server.

use super::db::{Database, DatabaseError};
use super::models::AvailabilityReport;

impl Database {
    /// Append a report. Reports are never updated.
    pub async fn insert_report(&self, report: &AvailabilityReport) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO availability_reports (id, username, study_space_id, status_name, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&report.id)
        .bind(&report.username)
        .bind(&report.study_space_id)
        .bind(&report.status_name)
        .bind(report.created_at)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Reports for a space with `created_at >= since`, oldest first.
    pub async fn find_reports_since(
        &self,
        study_space_id: &str,
        since: i64,
    ) -> Result<Vec<AvailabilityReport>, DatabaseError> {
        let reports = sqlx::query_as::<_, AvailabilityReport>(
            "SELECT * FROM availability_reports WHERE study_space_id = ? AND created_at >= ? ORDER BY created_at ASC",
        )
        .bind(study_space_id)
        .bind(since)
        .fetch_all(self.pool())
        .await?;

        Ok(reports)
    }

    /// Latest report a user made for a space, if any.
    pub async fn most_recent_report(
        &self,
        username: &str,
        study_space_id: &str,
    ) -> Result<Option<AvailabilityReport>, DatabaseError> {
        let report = sqlx::query_as::<_, AvailabilityReport>(
            "SELECT * FROM availability_reports WHERE username = ? AND study_space_id = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(username)
        .bind(study_space_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(report)
    }

    /// Whether a label is present in the status table.
    pub async fn status_exists(&self, name: &str) -> Result<bool, DatabaseError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT name FROM study_space_statuses WHERE name = ?")
                .bind(name)
                .fetch_optional(self.pool())
                .await?;

        Ok(row.is_some())
    }
}
