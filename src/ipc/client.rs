//! Client side of the toggle channel
//!
//! Fire-and-forget: connect, write "toggle", close. No response is read.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use super::protocol;

/// Errors from a toggle send attempt
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Nobody is listening at the rendezvous point. Not a failure: the
    /// caller is expected to launch a viewer process instead.
    #[error("no toggle server listening at {0}")]
    NoServer(PathBuf),

    #[error("toggle send failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Send the toggle command to the viewer process
pub async fn send_toggle(socket_path: &Path) -> Result<(), IpcError> {
    let mut stream = match UnixStream::connect(socket_path).await {
        Ok(stream) => stream,
        Err(e)
            if e.kind() == std::io::ErrorKind::ConnectionRefused
                || e.kind() == std::io::ErrorKind::NotFound =>
        {
            return Err(IpcError::NoServer(socket_path.to_owned()));
        }
        Err(e) => return Err(e.into()),
    };

    stream.write_all(protocol::TOGGLE).await?;
    stream.shutdown().await?;
    Ok(())
}
