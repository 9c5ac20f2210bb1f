//! Periodic clipboard polling and deduplication
//!
//! One tick per poll interval: read the clipboard through the external
//! collaborator and append to the history only on a genuine change. The
//! shared state is a real mutual-exclusion boundary; the poller, the copy
//! and clear handlers, and the suppression windows all go through it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::app::UiCommand;
use crate::clipboard::Clipboard;
use crate::history::{ClipboardRecord, HistoryStore};

/// Time-bounded poll suppression
///
/// Each flag is an expiring deadline compared against now at read time.
/// Re-arming simply overwrites the deadline; nothing ever has to clear a
/// flag on a timer.
#[derive(Debug, Default)]
pub struct SuppressionFlags {
    /// Set while the window is being resized, moved, or refocused
    configuring_until: Option<Instant>,
    /// Set right after the app itself wrote to the clipboard
    programmatic_copy_until: Option<Instant>,
}

impl SuppressionFlags {
    pub fn arm_configuring(&mut self, window: Duration) {
        self.configuring_until = Some(Instant::now() + window);
    }

    pub fn arm_programmatic_copy(&mut self, window: Duration) {
        self.programmatic_copy_until = Some(Instant::now() + window);
    }

    /// Undo an armed copy window, used when the clipboard write failed
    pub fn disarm_programmatic_copy(&mut self) {
        self.programmatic_copy_until = None;
    }

    /// True while either window is still open
    pub fn suppressed(&self) -> bool {
        self.suppressed_at(Instant::now())
    }

    fn suppressed_at(&self, now: Instant) -> bool {
        let open = |deadline: &Option<Instant>| deadline.is_some_and(|d| now < d);
        open(&self.configuring_until) || open(&self.programmatic_copy_until)
    }
}

/// State shared between the poller and the UI handlers
#[derive(Debug)]
pub struct SharedState {
    pub history: Vec<ClipboardRecord>,
    /// Raw content of the last clipboard read, cached across ticks whether
    /// or not it was appended
    pub last_seen: String,
    pub suppress: SuppressionFlags,
}

impl SharedState {
    pub fn new(history: Vec<ClipboardRecord>) -> Self {
        Self {
            history,
            last_seen: String::new(),
            suppress: SuppressionFlags::default(),
        }
    }
}

/// The clipboard poll loop
pub struct Poller {
    clipboard: Arc<dyn Clipboard>,
    state: Arc<Mutex<SharedState>>,
    store: HistoryStore,
    ui_tx: mpsc::Sender<UiCommand>,
}

impl Poller {
    pub fn new(
        clipboard: Arc<dyn Clipboard>,
        state: Arc<Mutex<SharedState>>,
        store: HistoryStore,
        ui_tx: mpsc::Sender<UiCommand>,
    ) -> Self {
        Self {
            clipboard,
            state,
            store,
            ui_tx,
        }
    }

    /// Tick forever at the configured interval
    pub async fn run(self, period: Duration) {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// One poll cycle; never fails, errors are logged and the next tick
    /// tries again
    pub async fn tick(&self) {
        let mut state = self.state.lock().await;

        if state.suppress.suppressed() {
            debug!("poll tick suppressed");
            return;
        }

        if self.clipboard.text_kind().is_none() {
            return;
        }
        let Some(content) = self.clipboard.fetch_text() else {
            return;
        };
        if content.is_empty() || content == state.last_seen {
            return;
        }
        state.last_seen = content.clone();

        // Content that round-trips back from a copy-from-history action is
        // already the newest record; re-adding it would duplicate the tail.
        if state.history.last().map(ClipboardRecord::content) == Some(content.as_str()) {
            return;
        }

        info!(chars = content.len(), "new clipboard entry");
        state.history.push(ClipboardRecord::text(content));
        self.store.save(&state.history);

        if let Err(e) = self.ui_tx.try_send(UiCommand::RefreshDisplay) {
            warn!(error = %e, "could not schedule display refresh");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::fake::FakeClipboard;

    struct Fixture {
        clipboard: Arc<FakeClipboard>,
        state: Arc<Mutex<SharedState>>,
        store: HistoryStore,
        poller: Poller,
        ui_rx: mpsc::Receiver<UiCommand>,
    }

    fn fixture(name: &str, history: Vec<ClipboardRecord>) -> Fixture {
        let path = std::env::temp_dir().join(format!(
            "wlcliphist-test-{}-poller-{}.json",
            std::process::id(),
            name
        ));
        std::fs::remove_file(&path).ok();
        let store = HistoryStore::new(path);

        let clipboard = Arc::new(FakeClipboard::new());
        let state = Arc::new(Mutex::new(SharedState::new(history)));
        let (ui_tx, ui_rx) = mpsc::channel(8);
        let poller = Poller::new(
            clipboard.clone(),
            state.clone(),
            store.clone(),
            ui_tx,
        );
        Fixture {
            clipboard,
            state,
            store,
            poller,
            ui_rx,
        }
    }

    #[tokio::test]
    async fn test_new_content_is_appended_and_persisted() {
        let mut f = fixture("append", vec![ClipboardRecord::text("hello")]);
        f.clipboard.set("world");

        f.poller.tick().await;

        let state = f.state.lock().await;
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history[1].content(), "world");
        assert_eq!(state.last_seen, "world");

        // File holds both records in order.
        let on_disk = f.store.load();
        assert_eq!(on_disk.len(), 2);
        assert_eq!(on_disk[0].content(), "hello");
        assert_eq!(on_disk[1].content(), "world");

        // A display refresh was scheduled.
        assert!(matches!(f.ui_rx.try_recv(), Ok(UiCommand::RefreshDisplay)));
    }

    #[tokio::test]
    async fn test_unchanged_clipboard_does_not_grow_history() {
        let mut f = fixture("unchanged", Vec::new());
        f.clipboard.set("hello");

        f.poller.tick().await;
        f.poller.tick().await;
        f.poller.tick().await;

        let state = f.state.lock().await;
        assert_eq!(state.history.len(), 1);
        assert!(matches!(f.ui_rx.try_recv(), Ok(UiCommand::RefreshDisplay)));
        assert!(f.ui_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_copy_from_history_round_trip_is_not_readded() {
        // The newest record comes back onto the clipboard after the
        // suppression window closed and last_seen was reset in between.
        let f = fixture("round-trip", vec![ClipboardRecord::text("hello")]);
        f.clipboard.set("hello");

        f.poller.tick().await;

        let state = f.state.lock().await;
        assert_eq!(state.history.len(), 1);
        // last_seen was still refreshed so the next tick short-circuits.
        assert_eq!(state.last_seen, "hello");
    }

    #[tokio::test]
    async fn test_empty_content_is_ignored() {
        let f = fixture("empty", Vec::new());
        f.clipboard.set("");

        f.poller.tick().await;

        assert!(f.state.lock().await.history.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_clipboard_is_ignored() {
        let f = fixture("unavailable", Vec::new());

        f.poller.tick().await;

        let state = f.state.lock().await;
        assert!(state.history.is_empty());
        assert_eq!(state.last_seen, "");
    }

    #[tokio::test]
    async fn test_suppressed_tick_changes_nothing() {
        for arm_copy in [false, true] {
            let mut f = fixture("suppressed", vec![ClipboardRecord::text("hello")]);
            f.store.save(&[ClipboardRecord::text("hello")]);
            f.clipboard.set("world");

            {
                let mut state = f.state.lock().await;
                if arm_copy {
                    state.suppress.arm_programmatic_copy(Duration::from_secs(60));
                } else {
                    state.suppress.arm_configuring(Duration::from_secs(60));
                }
            }

            f.poller.tick().await;

            let state = f.state.lock().await;
            assert_eq!(state.history.len(), 1);
            assert_eq!(state.last_seen, "");
            assert_eq!(f.store.load().len(), 1);
            assert!(f.ui_rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_expired_suppression_no_longer_blocks() {
        let f = fixture("expired", Vec::new());
        f.clipboard.set("hello");

        f.state
            .lock()
            .await
            .suppress
            .arm_configuring(Duration::from_millis(0));

        f.poller.tick().await;

        assert_eq!(f.state.lock().await.history.len(), 1);
    }

    #[test]
    fn test_rearming_extends_the_window() {
        let mut flags = SuppressionFlags::default();
        flags.arm_programmatic_copy(Duration::from_millis(1));
        flags.arm_programmatic_copy(Duration::from_secs(60));
        std::thread::sleep(Duration::from_millis(2));
        assert!(flags.suppressed());

        flags.disarm_programmatic_copy();
        assert!(!flags.suppressed());
    }
}
