//! Request extractors for signed-in and admin users.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use super::cookies::{self, SESSION_COOKIE};
use crate::server::{ApiError, AppState};
use crate::storage::DatabaseError;

const ACCESS_DENIED: &str = "access denied";
const NOT_ADMIN: &str = "access denied, user is not admin";

/// Username of the caller, taken from a valid session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = cookies::find(&parts.headers, SESSION_COOKIE)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized(ACCESS_DENIED))?;
        let claims = state.sessions.validate(token).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            ApiError::unauthorized(ACCESS_DENIED)
        })?;
        Ok(Self(claims.sub))
    }
}

/// Username of a signed-in caller whose stored account has admin rights.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let AuthUser(username) = AuthUser::from_request_parts(parts, state).await?;
        match state.db.get_user(&username).await {
            Ok(user) if user.is_admin => Ok(Self(username)),
            Ok(_) | Err(DatabaseError::NotFound(_)) => Err(ApiError::unauthorized(NOT_ADMIN)),
            Err(e) => Err(e.into()),
        }
    }
}
