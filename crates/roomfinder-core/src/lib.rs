//! Roomfinder Core Library
//!
//! Shared functionality for the roomfinder server:
//! - Availability aggregation (per space and per building)
//! - Report window arithmetic and rate-limit wait times
//! - Polygon conversion and nearest-space lookup
//! - Configuration resolution and hierarchy
//! - Common error and database types

pub mod availability;
pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod tracing_init;

pub use availability::{
    Aggregator, BuildingAvailability, RawCounts, ReportWindow, SpaceAvailability, Status,
    StatusLabel,
};
pub use config::Config;
pub use error::{Error, Result};
