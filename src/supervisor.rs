//! Viewer process launching
//!
//! The hotkey daemon warm-starts a hidden viewer at startup so the first
//! toggle has something to talk to, and launches another one whenever a
//! toggle finds nobody listening. Launch failures are logged, not retried;
//! the next toggle attempt tries again.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use crate::config::Config;
use crate::ipc::{send_toggle, IpcError};

/// Seam for launching a viewer process, so the toggle fallback can be
/// exercised without spawning anything
pub trait ViewerLauncher {
    fn launch(&self);
}

/// Launches detached viewer processes in hidden mode
pub struct Supervisor {
    program: PathBuf,
    args: Vec<String>,
}

impl Supervisor {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.gui_program.clone(),
            args: config.gui_args.clone(),
        }
    }

    /// Best-effort launch at daemon startup
    ///
    /// A viewer may already be running from a previous session; that is
    /// fine, the stale one keeps the socket and this one exits on bind
    /// failure or coexists hidden.
    pub fn warm_start(&self) {
        info!(program = %self.program.display(), "warm-starting viewer process");
        self.launch();
    }
}

impl ViewerLauncher for Supervisor {
    /// Spawn a detached, hidden viewer process
    fn launch(&self) {
        use std::os::unix::process::CommandExt;

        let result = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            // New process group so the viewer outlives this daemon.
            .process_group(0)
            .spawn();

        match result {
            Ok(child) => {
                info!(pid = child.id(), "viewer process launched");
            }
            Err(e) => {
                error!(program = %self.program.display(), error = %e, "failed to launch viewer process");
            }
        }
    }
}

/// Send the toggle command, falling back to a viewer launch when nobody is
/// listening
///
/// A refused or missing rendezvous point is not an error; anything else is
/// returned to the caller.
pub async fn toggle_or_launch(
    socket_path: &Path,
    launcher: &impl ViewerLauncher,
) -> Result<(), IpcError> {
    match send_toggle(socket_path).await {
        Ok(()) => {
            debug!("toggle sent");
            Ok(())
        }
        Err(IpcError::NoServer(path)) => {
            info!(path = %path.display(), "no viewer listening, launching one");
            launcher.launch();
            Ok(())
        }
        Err(e) => Err(e),
    }
}
