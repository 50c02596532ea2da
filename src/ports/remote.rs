//! Remote file bridge port.
//!
//! Sandboxed hosts cannot hand the rendering layer a local file path; the
//! privileged side of the host has to read the bytes and pass them over.
//! This port abstracts that privileged read.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Remote file bridge error type.
#[derive(Debug, Error)]
pub enum RemoteAccessError {
    /// No file exists at the path on the privileged side.
    #[error("File not found on the privileged side: {0}")]
    NotFound(String),

    /// The privileged read failed.
    #[error("Failed to read '{path}' on the privileged side: {message}")]
    Read {
        /// The path passed to the bridge.
        path: String,
        /// The failure reported by the privileged side.
        message: String,
    },

    /// Other error.
    #[error("Remote access error: {0}")]
    Other(String),
}

/// Trait for the privileged file access a host may offer.
#[async_trait]
pub trait RemoteFileBridge: Send + Sync {
    /// Reads the file at `path` in the privileged host context.
    ///
    /// # Arguments
    ///
    /// * `path` - A path valid on the privileged side, not the sandbox
    ///
    /// # Returns
    ///
    /// The raw file bytes, or an error if the privileged side could not
    /// read them.
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, RemoteAccessError>;
}

/// Bridge backed by the local filesystem, for hosts whose privileged side
/// runs in the same process.
#[derive(Debug, Default)]
pub struct FsRemoteBridge;

impl FsRemoteBridge {
    /// Creates a new filesystem-backed bridge.
    pub fn new() -> Self {
        FsRemoteBridge
    }
}

#[async_trait]
impl RemoteFileBridge for FsRemoteBridge {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, RemoteAccessError> {
        debug!("Bridge reading '{}'", path);
        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RemoteAccessError::NotFound(path.to_string()))
            }
            Err(e) => Err(RemoteAccessError::Read {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
