//! User and building queries for the roomfinder server.

use roomfinder_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::{Building, User};

/// Parameters for creating a user.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub bio: Option<&'a str>,
}

impl Database {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user. Fails with `Conflict` if the username is taken.
    pub async fn create_user(&self, params: &NewUser<'_>) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (username, password_hash, first_name, last_name, email, bio, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(params.username)
        .bind(params.password_hash)
        .bind(params.first_name)
        .bind(params.last_name)
        .bind(params.email)
        .bind(params.bio)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(params.username).await
    }

    /// Get a user by username.
    pub async fn get_user(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {username}")))
    }

    /// Grant or revoke admin rights. Returns false if the user does not exist.
    pub async fn set_admin(&self, username: &str, is_admin: bool) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET is_admin = ?, updated_at = ? WHERE username = ?")
            .bind(is_admin)
            .bind(unix_timestamp())
            .bind(username)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Building queries
    // =========================================================================

    /// Create a building. Fails with `Conflict` if the name is taken.
    pub async fn create_building(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Building, DatabaseError> {
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO buildings (name, description, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_building(name).await
    }

    pub async fn get_building(&self, name: &str) -> Result<Building, DatabaseError> {
        sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE name = ?")
            .bind(name)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Building {name}")))
    }

    pub async fn list_buildings(&self) -> Result<Vec<Building>, DatabaseError> {
        let buildings = sqlx::query_as::<_, Building>("SELECT * FROM buildings ORDER BY name")
            .fetch_all(self.pool())
            .await?;

        Ok(buildings)
    }

    /// Delete a building along with its study spaces and their reports.
    pub async fn delete_building(&self, name: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM buildings WHERE name = ?")
            .bind(name)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
