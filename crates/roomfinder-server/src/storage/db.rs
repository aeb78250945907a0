//! SQLite database handle for the roomfinder server.

pub use roomfinder_core::db::DatabaseError;

roomfinder_core::define_database!(Database, "Roomfinder database migrations complete");
