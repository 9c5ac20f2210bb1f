//! Graceful shutdown on SIGTERM/SIGINT

use tokio::signal::unix::{signal, SignalKind};
use tracing::debug;

/// Resolve when the process receives SIGTERM or SIGINT
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => debug!("received SIGTERM"),
        _ = sigint.recv() => debug!("received SIGINT"),
    }
}
