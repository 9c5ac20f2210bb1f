//! The viewer-process application
//!
//! A single UI command loop owns every piece of GUI state: visibility, the
//! frontend, and the handlers the widget layer triggers. The toggle server
//! and the poller never touch this state directly; they send `UiCommand`s.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::history::{ClipboardRecord, HistoryStore};
use crate::poller::SharedState;

/// Everything that may mutate GUI state runs through this queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    /// Flip the window between shown and hidden
    ToggleVisibility,
    /// Re-render the history list
    RefreshDisplay,
    /// Copy the history record at this index back onto the clipboard
    CopySelected(usize),
    /// Clear the clipboard, the history, and the backing file
    ClearAll,
    /// The window was resized or moved
    WindowConfigured,
    /// The window gained or lost focus
    FocusChanged,
    /// The window manager asked the window to close
    WindowClosed,
}

/// How the command loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Every command sender hung up
    ChannelClosed,
    /// The window manager closed the window; history already saved
    WindowClosed,
}

/// Seam to the widget toolkit
///
/// The toolkit consumes an ordered history and produces copy/clear
/// commands; everything else it needs is behind these four calls.
pub trait Frontend: Send {
    fn show(&mut self);
    fn hide(&mut self);
    /// Raise the window above its siblings after showing it
    fn present(&mut self);
    fn refresh(&mut self, records: &[ClipboardRecord]);
}

/// Frontend placeholder that narrates what a toolkit would render
#[derive(Debug, Default)]
pub struct TracingFrontend;

impl Frontend for TracingFrontend {
    fn show(&mut self) {
        info!("window shown");
    }

    fn hide(&mut self) {
        info!("window hidden");
    }

    fn present(&mut self) {
        debug!("window presented");
    }

    fn refresh(&mut self, records: &[ClipboardRecord]) {
        info!(rows = records.len(), "history display refreshed");
        for record in records {
            debug!(preview = %record.preview(), "row");
        }
    }
}

/// Viewer application state and command handlers
pub struct App<F: Frontend> {
    frontend: F,
    visible: bool,
    state: Arc<Mutex<SharedState>>,
    store: HistoryStore,
    clipboard: Arc<dyn Clipboard>,
    configure_debounce: Duration,
    focus_debounce: Duration,
    copy_debounce: Duration,
}

impl<F: Frontend> App<F> {
    pub fn new(
        frontend: F,
        state: Arc<Mutex<SharedState>>,
        store: HistoryStore,
        clipboard: Arc<dyn Clipboard>,
        config: &Config,
        start_hidden: bool,
    ) -> Self {
        Self {
            frontend,
            visible: !start_hidden,
            state,
            store,
            clipboard,
            configure_debounce: config.configure_debounce,
            focus_debounce: config.focus_debounce,
            copy_debounce: config.copy_debounce,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Render the initial state and process commands until the window
    /// closes or the channel does
    pub async fn run(&mut self, mut ui_rx: mpsc::Receiver<UiCommand>) -> LoopExit {
        {
            let state = self.state.lock().await;
            self.frontend.refresh(&state.history);
        }
        if self.visible {
            self.frontend.show();
        }

        while let Some(cmd) = ui_rx.recv().await {
            if !self.handle(cmd).await {
                info!("ui command loop finished");
                return LoopExit::WindowClosed;
            }
        }
        info!("ui command loop finished");
        LoopExit::ChannelClosed
    }

    /// Process one command; returns false when the loop should stop
    pub async fn handle(&mut self, cmd: UiCommand) -> bool {
        match cmd {
            UiCommand::ToggleVisibility => self.toggle_visibility(),
            UiCommand::RefreshDisplay => {
                let state = self.state.lock().await;
                self.frontend.refresh(&state.history);
            }
            UiCommand::CopySelected(index) => self.copy_selected(index).await,
            UiCommand::ClearAll => self.clear_all().await,
            UiCommand::WindowConfigured => {
                let mut state = self.state.lock().await;
                state.suppress.arm_configuring(self.configure_debounce);
            }
            UiCommand::FocusChanged => {
                let mut state = self.state.lock().await;
                state.suppress.arm_configuring(self.focus_debounce);
            }
            UiCommand::WindowClosed => {
                info!("window closed by the window manager");
                self.save_on_exit().await;
                return false;
            }
        }
        true
    }

    fn toggle_visibility(&mut self) {
        if self.visible {
            self.frontend.hide();
            self.visible = false;
        } else {
            self.frontend.show();
            self.frontend.present();
            self.visible = true;
        }
        info!(visible = self.visible, "visibility toggled");
    }

    /// Put a history entry back onto the clipboard
    ///
    /// Arms the programmatic-copy window first so the next poll ticks do
    /// not re-ingest our own write as a new entry.
    async fn copy_selected(&mut self, index: usize) {
        let mut state = self.state.lock().await;
        if state.suppress.suppressed() {
            debug!("copy skipped while suppressed");
            return;
        }
        let Some(record) = state.history.get(index) else {
            warn!(index, "copy requested for a row that no longer exists");
            return;
        };
        let content = record.content().to_string();

        state.suppress.arm_programmatic_copy(self.copy_debounce);
        if let Err(e) = self.clipboard.copy_text(&content) {
            warn!(error = %e, "failed to write clipboard");
            state.suppress.disarm_programmatic_copy();
        }
    }

    /// Clear the system clipboard, the in-memory history, and the file
    async fn clear_all(&mut self) {
        let mut state = self.state.lock().await;
        if let Err(e) = self.clipboard.clear() {
            warn!(error = %e, "failed to clear clipboard, keeping history");
            return;
        }
        state.history.clear();
        state.last_seen.clear();
        self.frontend.refresh(&state.history);
        self.store.clear();
    }

    /// Persist the history one last time before the process exits
    pub async fn save_on_exit(&self) {
        let state = self.state.lock().await;
        self.store.save(&state.history);
    }
}
