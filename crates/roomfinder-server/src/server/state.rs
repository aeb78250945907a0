//! Shared state handed to every HTTP handler.

use std::sync::Arc;

use crate::auth::SessionManager;
use crate::availability::AvailabilityService;
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub availability: Arc<AvailabilityService>,
    pub sessions: Arc<SessionManager>,
    /// Mark sign-in cookies `Secure`.
    pub secure_cookies: bool,
}
