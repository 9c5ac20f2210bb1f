//! External clipboard access through the wl-clipboard tools
//!
//! Every call shells out to `wl-paste` / `wl-copy` and is short-lived and
//! synchronous. Read failures collapse to "no content available"; they are
//! never propagated.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

/// Clipboard MIME/atom names accepted as text
const TEXT_KINDS: &[&str] = &["text/plain", "UTF8_STRING", "TEXT", "STRING"];

/// The external clipboard collaborator
///
/// The GUI process talks to the clipboard exclusively through this seam,
/// which keeps the poller and the copy/clear handlers testable without a
/// running compositor.
pub trait Clipboard: Send + Sync {
    /// Report the text kind currently offered, if any
    fn text_kind(&self) -> Option<String>;

    /// Fetch the current text content; `None` when unavailable
    fn fetch_text(&self) -> Option<String>;

    /// Replace the clipboard content with `content`
    fn copy_text(&self, content: &str) -> Result<()>;

    /// Drop the current clipboard content
    fn clear(&self) -> Result<()>;
}

/// wl-clipboard backed implementation
#[derive(Debug, Default)]
pub struct WlClipboard;

impl WlClipboard {
    pub fn new() -> Self {
        Self
    }

    /// Warn once at startup when the wl-clipboard tools are not installed;
    /// without them every poll tick sees "no content"
    pub fn check_tools(&self) {
        for tool in ["wl-paste", "wl-copy"] {
            if !tool_on_path(tool) {
                warn!(tool, "not found on PATH, clipboard access will not work");
            }
        }
    }
}

fn tool_on_path(tool: &str) -> bool {
    search_path(std::env::var_os("PATH"), tool)
}

fn search_path(path: Option<std::ffi::OsString>, tool: &str) -> bool {
    path.map(|dirs| std::env::split_paths(&dirs).any(|dir| dir.join(tool).is_file()))
        .unwrap_or(false)
}

impl Clipboard for WlClipboard {
    fn text_kind(&self) -> Option<String> {
        let output = match Command::new("wl-paste").arg("--list-types").output() {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "wl-paste --list-types failed");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }

        let types = String::from_utf8_lossy(&output.stdout);
        if types.trim().is_empty() {
            return None;
        }
        types
            .lines()
            .any(|line| TEXT_KINDS.contains(&line.trim()))
            .then(|| "text/plain".to_string())
    }

    fn fetch_text(&self) -> Option<String> {
        let output = match Command::new("wl-paste").arg("--no-newline").output() {
            Ok(output) => output,
            Err(e) => {
                debug!(error = %e, "wl-paste failed");
                return None;
            }
        };
        if !output.status.success() {
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn copy_text(&self, content: &str) -> Result<()> {
        let mut child = Command::new("wl-copy")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to spawn wl-copy")?;

        child
            .stdin
            .take()
            .context("wl-copy stdin unavailable")?
            .write_all(content.as_bytes())
            .context("failed to write to wl-copy")?;

        let status = child.wait().context("failed to wait for wl-copy")?;
        if !status.success() {
            bail!("wl-copy exited with {status}");
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let status = Command::new("wl-copy")
            .arg("--clear")
            .status()
            .context("failed to spawn wl-copy --clear")?;
        if !status.success() {
            bail!("wl-copy --clear exited with {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_finds_only_real_files() {
        let dir = std::env::temp_dir().join(format!(
            "wlcliphist-test-{}-tools",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("wl-paste"), b"").unwrap();

        let path = std::env::join_paths([dir.clone()]).unwrap();
        assert!(search_path(Some(path.clone()), "wl-paste"));
        assert!(!search_path(Some(path), "wl-copy"));
        assert!(!search_path(None, "wl-paste"));

        std::fs::remove_file(dir.join("wl-paste")).ok();
        std::fs::remove_dir(&dir).ok();
    }
}
