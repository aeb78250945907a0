//! HTTP and WebSocket server.

pub mod buildings;
pub mod error;
pub mod geofences;
pub mod health;
pub mod reports;
pub mod router;
pub mod spaces;
pub mod state;
pub mod users;
pub mod validate;
pub mod ws;

pub use error::ApiError;
pub use router::{RouterOptions, build_router};
pub use state::AppState;
