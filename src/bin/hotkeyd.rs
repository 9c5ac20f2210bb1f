//! wlcliphist-hotkeyd: the hotkey matcher process
//!
//! Watches raw keyboard input, and when the configured combo becomes fully
//! held, sends the toggle command to the viewer over the rendezvous socket.
//! If nobody is listening it launches a hidden viewer instead.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wlcliphist::config::Config;
use wlcliphist::hotkey::{ComboMatcher, HotkeyListener};
use wlcliphist::lifecycle;
use wlcliphist::supervisor::{toggle_or_launch, Supervisor};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "wlcliphist-hotkeyd starting");

    let config = Config::load()?;
    let combo = config
        .load_combo()
        .context("hotkey configuration is unusable")?;
    info!(%combo, "hotkey configured");

    // Warm start so the first toggle has a viewer to talk to.
    let supervisor = Supervisor::new(&config);
    supervisor.warm_start();

    let (key_tx, mut key_rx) = mpsc::channel(256);
    let listener = HotkeyListener::new(key_tx);
    listener
        .start()
        .context("could not start keyboard listener")?;

    let mut matcher = ComboMatcher::new(combo);

    let shutdown = lifecycle::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            maybe_event = key_rx.recv() => {
                let Some(event) = maybe_event else {
                    error!("all keyboard readers stopped");
                    break;
                };
                if !matcher.on_event(event.key, event.transition) {
                    continue;
                }

                info!("hotkey combo detected");
                if let Err(e) = toggle_or_launch(&config.socket_path, &supervisor).await {
                    warn!(error = %e, "toggle send failed");
                }
            }
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("wlcliphist-hotkeyd stopped");
    Ok(())
}
