//! API error type and its JSON response shape.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::availability::AvailabilityError;
use crate::geofence::GeofenceError;
use crate::storage::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(
        "You have already added an availability report. Please wait {retry_after_minutes} minutes to add another report to this study space"
    )]
    RateLimited { retry_after_minutes: u64 },

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after_minutes: Option<u64>,
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::RateLimited { .. } => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::BadGateway(_) => "BAD_GATEWAY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let retry_after_minutes = match &self {
            Self::RateLimited {
                retry_after_minutes,
            } => Some(*retry_after_minutes),
            _ => None,
        };
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
            retry_after_minutes,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            DatabaseError::Conflict(what) => Self::Conflict(what),
            other => {
                error!(error = %other, "Database error");
                Self::Internal("internal server error".into())
            }
        }
    }
}

impl From<AvailabilityError> for ApiError {
    fn from(e: AvailabilityError) -> Self {
        match e {
            AvailabilityError::Validation(msg) | AvailabilityError::InvalidReference(msg) => {
                Self::BadRequest(msg)
            }
            AvailabilityError::Store(e) => e.into(),
            AvailabilityError::Serialize(e) => {
                error!(error = %e, "Response serialization failed");
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<GeofenceError> for ApiError {
    fn from(e: GeofenceError) -> Self {
        error!(error = %e, "Geofence provider error");
        Self::BadGateway(e.to_string())
    }
}

impl From<roomfinder_core::Error> for ApiError {
    fn from(e: roomfinder_core::Error) -> Self {
        match e {
            roomfinder_core::Error::InvalidPolygon(_)
            | roomfinder_core::Error::InvalidCoordinates(_) => Self::BadRequest(e.to_string()),
            other => {
                error!(error = %other, "Internal error");
                Self::Internal("internal server error".into())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn rate_limited_carries_retry_after() {
        let (status, body) = body_json(ApiError::RateLimited {
            retry_after_minutes: 4,
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "RATE_LIMITED");
        assert_eq!(body["retryAfterMinutes"], 4);
        assert!(body["message"].as_str().unwrap().contains("wait 4 minutes"));
    }

    #[tokio::test]
    async fn plain_errors_omit_retry_after() {
        let (status, body) = body_json(ApiError::not_found("nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "nope");
        assert!(body.get("retryAfterMinutes").is_none());
    }

    #[test]
    fn store_errors_map_by_kind() {
        assert_eq!(
            ApiError::from(DatabaseError::Conflict("taken".into())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DatabaseError::Query("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(AvailabilityError::InvalidReference("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn serialization_failure_is_internal_not_store() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AvailabilityError::from(json_err);
        assert!(err.to_string().starts_with("failed to serialize building list"));
        assert_eq!(
            ApiError::from(err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
