//! Roomfinder Server
//!
//! HTTP API, live WebSocket updates and geofence sync for study space
//! availability.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use roomfinder_core::config::load_config;
use roomfinder_core::tracing_init::init_tracing;
use roomfinder_core::{Aggregator, ReportWindow};

use roomfinder_server::auth::SessionManager;
use roomfinder_server::availability::AvailabilityService;
use roomfinder_server::clock::SystemClock;
use roomfinder_server::geofence::{GeofenceProvider, RadarClient};
use roomfinder_server::hub::BroadcastHub;
use roomfinder_server::scheduler::UpdateScheduler;
use roomfinder_server::server::{AppState, RouterOptions, build_router};
use roomfinder_server::storage::Database;

#[derive(Parser, Debug)]
#[command(name = "roomfinder-server")]
#[command(
    version,
    about = "Roomfinder server - study space availability API and live updates"
)]
struct Args {
    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config).
    #[arg(long)]
    port: Option<u16>,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Directory with the built frontend to serve.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Secret used to sign session tokens.
    #[arg(
        long,
        env = "ROOMFINDER_SESSION_SECRET",
        default_value = "dev-secret-change-me"
    )]
    session_secret: String,

    /// Mark session cookies Secure (use behind HTTPS).
    #[arg(long)]
    secure_cookies: bool,

    /// Grant admin rights to an existing user at startup.
    #[arg(long, value_name = "USERNAME")]
    bootstrap_admin: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(path) = args.db_path {
        config.server.database_path = Some(path);
    }
    if let Some(dir) = args.static_dir {
        config.server.static_dir = Some(dir);
    }
    config.server.secure_cookies |= args.secure_cookies;

    let level = &config.server.log_level;
    init_tracing(
        &format!("roomfinder_server={level},roomfinder_core={level},tower_http={level}"),
        args.log_json,
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        "Starting roomfinder-server"
    );

    let db_path = match config.server.database_path.clone() {
        Some(path) => path,
        None => default_db_path()?,
    };
    info!(path = %db_path.display(), "Opening roomfinder database");
    let db = Database::open(&db_path).await?;

    if let Some(username) = &args.bootstrap_admin {
        if db.set_admin(username, true).await? {
            info!(username = %username, "Granted admin rights");
        } else {
            warn!(username = %username, "Cannot grant admin rights: no such user");
        }
    }

    let geofence: Option<Arc<dyn GeofenceProvider>> = match &config.geofence.secret_key {
        Some(key) => {
            info!(api_url = %config.geofence.api_url, "Geofence sync enabled");
            Some(Arc::new(RadarClient::new(&config.geofence.api_url, key)?))
        }
        None => {
            info!("Geofence sync disabled: no secret key configured");
            None
        }
    };

    let window = ReportWindow::from_secs(config.availability.report_window_secs);
    let (scheduler, fired) = UpdateScheduler::new(window.duration());
    let hub = BroadcastHub::new();
    let availability = Arc::new(AvailabilityService::new(
        db.clone(),
        Arc::new(SystemClock),
        Aggregator::new(config.availability.verification_floor),
        window,
        hub.clone(),
        scheduler,
        geofence,
    ));

    tokio::spawn(Arc::clone(&availability).run_scheduled_refreshes(fired));
    let heartbeat = hub.spawn_heartbeat(Duration::from_secs(
        config.availability.heartbeat_interval_secs.max(1),
    ));

    let startup_sync = Arc::clone(&availability);
    tokio::spawn(async move {
        if let Err(e) = startup_sync.sync_all_geofences().await {
            warn!(error = %e, "Startup geofence sync failed");
        }
    });

    let state = AppState {
        db,
        availability,
        sessions: Arc::new(SessionManager::new(
            args.session_secret.as_bytes(),
            i64::try_from(config.session.ttl_secs)?,
        )),
        secure_cookies: config.server.secure_cookies,
    };
    let app = build_router(
        state,
        &RouterOptions {
            allowed_origins: config.cors.allowed_origins.clone(),
            static_dir: config.server.static_dir.clone(),
        },
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    heartbeat.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".roomfinder").join("roomfinder.db"))
}
