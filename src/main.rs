//! Focus Lock - Pomodoro focus sessions with distraction blocking
//!
//! This is the main entry point for the focus-lock server.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use focus_lock::{
    api::create_router,
    config::Config,
    services::{FileStore, MemoryStore, PreferenceStore},
    state::AppState,
    tasks::{frame_driver_task, guard_monitor_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_lock={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-lock server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, frame={}ms, monitor={}ms",
        config.host, config.port, config.frame_ms, config.monitor_ms
    );

    let store: Arc<dyn PreferenceStore> = match config.store_path() {
        Some(path) => {
            let store = FileStore::open(&path).context("Failed to open preference store")?;
            info!("Preferences stored at {}", store.path().display());
            Arc::new(store)
        }
        None => {
            warn!("Preferences are kept in memory and will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(
        store,
        config.port,
        config.host.clone(),
        config.monitor_interval(),
    ));

    // Start the background drivers
    let frame_state = Arc::clone(&state);
    let frame_period = config.frame_period();
    tokio::spawn(async move {
        frame_driver_task(frame_state, frame_period).await;
    });

    let monitor_state = Arc::clone(&state);
    tokio::spawn(async move {
        guard_monitor_task(monitor_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /session/start        - Start a work phase on a task");
    info!("  POST /session/pause|resume - Pause or resume the countdown");
    info!("  POST /session/stop         - Abandon the session");
    info!("  POST /session/edit[/commit]- Edit the remaining time");
    info!("  POST /session/lock         - Engage or release the lock");
    info!("  GET|PUT /settings/durations - Phase durations in minutes");
    info!("  POST /input/*, /viewport/* - Front-end input and viewport reports");
    info!("  GET  /tasks, POST /tasks   - Task list");
    info!("  GET  /events               - Session events (SSE)");
    info!("  GET  /status, /health      - Status and health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            info!("Shutting down on {}", signal);
        }
    }

    let session = state.session();
    if session.state().phase.is_active() {
        warn!(
            "Exiting during a {} phase with {}s left",
            session.state().phase.as_str(),
            session.state().remaining_seconds
        );
    }

    info!("Server shutdown complete");
    Ok(())
}
