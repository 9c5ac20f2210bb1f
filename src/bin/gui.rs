//! wlcliphist-gui: the history viewer process
//!
//! Owns the clipboard history: loads it at startup, polls the clipboard on
//! a fixed period, serves the toggle channel, and runs the UI command loop.
//! `--hidden` starts the window hidden, which is how the hotkey daemon
//! launches it.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wlcliphist::app::{App, LoopExit, TracingFrontend};
use wlcliphist::clipboard::{Clipboard, WlClipboard};
use wlcliphist::config::Config;
use wlcliphist::history::HistoryStore;
use wlcliphist::ipc::ToggleServer;
use wlcliphist::lifecycle;
use wlcliphist::poller::{Poller, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start_hidden = std::env::args().any(|arg| arg == "--hidden");
    info!(
        version = env!("CARGO_PKG_VERSION"),
        start_hidden, "wlcliphist-gui starting"
    );

    let config = Config::load()?;
    let store = HistoryStore::new(config.history_path.clone());
    let history = store.load();
    info!(records = history.len(), "clipboard history loaded");

    let wl_clipboard = WlClipboard::new();
    wl_clipboard.check_tools();
    let clipboard: Arc<dyn Clipboard> = Arc::new(wl_clipboard);
    let state = Arc::new(Mutex::new(SharedState::new(history)));
    let (ui_tx, ui_rx) = mpsc::channel(64);

    let server = Arc::new(ToggleServer::bind(&config.socket_path, ui_tx.clone())?);
    let server_task = {
        let server = Arc::clone(&server);
        tokio::spawn(async move { server.run().await })
    };

    let poller = Poller::new(
        Arc::clone(&clipboard),
        Arc::clone(&state),
        store.clone(),
        ui_tx,
    );
    let poll_task = tokio::spawn(poller.run(config.poll_interval));

    let mut app = App::new(
        TracingFrontend::default(),
        Arc::clone(&state),
        store,
        clipboard,
        &config,
        start_hidden,
    );

    let exit = tokio::select! {
        exit = app.run(ui_rx) => {
            info!(?exit, "ui command loop exited");
            Some(exit)
        }
        _ = lifecycle::shutdown_signal() => {
            info!("shutdown signal received");
            None
        }
    };

    poll_task.abort();
    server_task.abort();
    // WindowClosed already persisted the history inside the loop.
    if exit != Some(LoopExit::WindowClosed) {
        app.save_on_exit().await;
    }
    server.cleanup();

    info!("wlcliphist-gui stopped");
    Ok(())
}
