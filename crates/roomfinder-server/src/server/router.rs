//! HTTP route table and middleware.

use std::path::PathBuf;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::{AppState, buildings, geofences, health, reports, spaces, users, ws};

/// Router settings that come from configuration rather than state.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    pub allowed_origins: Vec<String>,
    /// Built frontend served for every path no route matches.
    pub static_dir: Option<PathBuf>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_router(state: AppState, options: &RouterOptions) -> Router {
    let api = Router::new()
        .route(
            "/buildings",
            get(buildings::list_buildings).post(buildings::create_building),
        )
        .route(
            "/buildings/{building}",
            get(buildings::get_building).delete(buildings::delete_building),
        )
        .route(
            "/buildings/{building}/studySpaces",
            get(spaces::list_spaces_in_building).post(spaces::create_space),
        )
        .route(
            "/buildings/{building}/studySpaces/{id}",
            get(spaces::get_space)
                .patch(spaces::update_space)
                .delete(spaces::delete_space),
        )
        .route(
            "/buildings/{building}/studySpaces/{id}/availabilityReports",
            get(reports::list_reports).post(reports::create_report),
        )
        .route("/studySpaces", get(spaces::list_all_spaces))
        .route("/closestStudySpace", get(spaces::closest_space))
        .route("/geofences", get(geofences::list_geofences))
        .route("/events", get(geofences::list_events))
        .route("/displayUsers", get(geofences::list_users));

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/signup", post(users::signup))
        .route("/signin", post(users::signin))
        .route("/signout", get(users::signout))
        .route("/ws", get(ws::ws_handler))
        .nest("/api", api);

    if let Some(dir) = &options.static_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(cors_layer(&options.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
