//! Roomfinder server library.
//!
//! - SQLite storage for users, buildings, study spaces and reports
//! - Cookie sessions backed by JWT, argon2 password hashing
//! - Availability service with per-building debounce timers
//! - WebSocket broadcast hub with heartbeat
//! - Radar geofence sync
//! - axum HTTP API

pub mod auth;
pub mod availability;
pub mod clock;
pub mod geofence;
pub mod hub;
pub mod scheduler;
pub mod server;
pub mod storage;
