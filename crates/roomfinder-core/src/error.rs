//! Error types for the roomfinder core library.

use thiserror::Error;

/// Result type alias using the core [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for roomfinder operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Polygon is malformed or out of range
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    /// Point coordinates are out of range
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
