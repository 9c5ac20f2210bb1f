//! Clipboard records and their JSON persistence
//!
//! The store is a dumb ordered-sequence serializer: deduplication is the
//! poller's job. On disk the history is a JSON array of `[content, kind]`
//! pairs, rewritten in full after every accepted mutation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Content tag for a history record; only text is supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Text,
}

/// One clipboard history entry, serialized as a 2-element array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardRecord(String, RecordKind);

/// Preview length shown in the history list
const PREVIEW_CHARS: usize = 50;

impl ClipboardRecord {
    pub fn text(content: impl Into<String>) -> Self {
        Self(content.into(), RecordKind::Text)
    }

    pub fn content(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> RecordKind {
        self.1
    }

    /// Single-line preview: newlines flattened, truncated with an ellipsis
    pub fn preview(&self) -> String {
        let flat = self.0.replace('\n', " ");
        if flat.chars().count() > PREVIEW_CHARS {
            let mut preview: String = flat.chars().take(PREVIEW_CHARS).collect();
            preview.push_str("...");
            preview
        } else {
            flat
        }
    }
}

/// Persists the ordered history to a JSON file
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the full history; an absent or unparseable file is empty
    pub fn load(&self) -> Vec<ClipboardRecord> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no history file, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "history file unparseable, starting empty");
                Vec::new()
            }
        }
    }

    /// Write the full history; failures are logged, in-memory state stays
    /// authoritative for the rest of the session
    pub fn save(&self, records: &[ClipboardRecord]) {
        if let Err(e) = self.try_save(records) {
            warn!(path = %self.path.display(), error = %e, "failed to persist clipboard history");
        }
    }

    /// Truncate the backing file to an empty history
    pub fn clear(&self) {
        self.save(&[]);
    }

    fn try_save(&self, records: &[ClipboardRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("failed to create history directory")?;
        }
        let bytes = serde_json::to_vec(records).context("failed to encode history")?;

        // Write to a sibling temp file and rename so a crash mid-write
        // cannot leave a truncated history behind.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &bytes).context("failed to write history temp file")?;
        std::fs::rename(&tmp, &self.path).context("failed to replace history file")?;
        Ok(())
    }
}
