//! Unix domain socket server for the toggle channel
//!
//! Lives inside the viewer process. Accepts one connection at a time, reads
//! the payload, and on the toggle command schedules a visibility flip on the
//! UI command loop. GUI state is never touched from here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::UiCommand;

use super::protocol;

/// Pause after an accept or read error before trying again
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Accept loop for the toggle channel
pub struct ToggleServer {
    socket_path: PathBuf,
    listener: UnixListener,
    ui_tx: mpsc::Sender<UiCommand>,
}

impl ToggleServer {
    /// Bind the rendezvous socket, unlinking any stale file from a previous
    /// unclean shutdown
    pub fn bind(socket_path: &Path, ui_tx: mpsc::Sender<UiCommand>) -> Result<Self> {
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).context("failed to create socket directory")?;
        }
        if socket_path.exists() {
            std::fs::remove_file(socket_path).context("failed to remove stale socket")?;
        }

        let listener = UnixListener::bind(socket_path).context("failed to bind Unix socket")?;

        // Single-user local tool; still keep the socket owner-only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!(path = %socket_path.display(), "toggle server listening");

        Ok(Self {
            socket_path: socket_path.to_owned(),
            listener,
            ui_tx,
        })
    }

    /// Accept and serve connections forever
    ///
    /// Errors never end the loop; they are logged and the server backs off
    /// briefly before accepting again.
    pub async fn run(&self) {
        loop {
            let mut stream = match self.listener.accept().await {
                Ok((stream, _addr)) => stream,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                    continue;
                }
            };

            match read_command(&mut stream).await {
                Ok(payload) if protocol::is_toggle(&payload) => {
                    debug!("toggle command received");
                    if self.ui_tx.send(UiCommand::ToggleVisibility).await.is_err() {
                        info!("ui command loop gone, stopping toggle server");
                        return;
                    }
                }
                Ok(payload) => {
                    warn!(len = payload.len(), "ignoring unknown command");
                }
                Err(e) => {
                    warn!(error = %e, "failed to read command");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    /// Remove the rendezvous socket on shutdown
    pub fn cleanup(&self) {
        if self.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.socket_path) {
                warn!(error = %e, "failed to remove socket file");
            }
        }
    }
}

/// Read until EOF or the command buffer is full
async fn read_command(stream: &mut UnixStream) -> std::io::Result<Vec<u8>> {
    let mut buf = [0u8; protocol::MAX_COMMAND_LEN];
    let mut filled = 0;
    loop {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
        if filled == buf.len() {
            break;
        }
    }
    Ok(buf[..filled].to_vec())
}
