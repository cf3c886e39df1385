//! Signal handling for graceful shutdown

use futures::stream::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tracing::{error, info};

/// Human-readable name of a shutdown signal
pub fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGTERM => "SIGTERM",
        SIGINT => "SIGINT",
        SIGHUP => "SIGHUP",
        _ => "unknown signal",
    }
}

/// Wait for a shutdown signal (SIGTERM, SIGINT, SIGHUP) and return its name.
///
/// If the handlers cannot be installed the future never resolves, so the
/// server keeps running rather than exiting immediately.
pub async fn shutdown_signal() -> &'static str {
    let mut signals = match Signals::new([SIGTERM, SIGINT, SIGHUP]) {
        Ok(signals) => signals,
        Err(e) => {
            error!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };
    let handle = signals.handle();

    let name = match signals.next().await {
        Some(signal) => signal_name(signal),
        None => "signal stream closed",
    };
    handle.close();

    info!("Received {}", name);
    name
}
