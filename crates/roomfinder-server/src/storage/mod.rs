//! SQLite storage for the roomfinder server.
//!
//! Provides persistence for users, buildings, study spaces and availability
//! reports.

mod db;
mod models;
mod queries;
mod queries_reports;
mod queries_spaces;


pub use db::{Database, DatabaseError};
pub use models::*;
pub use queries::NewUser;
pub use queries_spaces::NewStudySpace;
