//! Error types for background rendering.

use thiserror::Error;

use crate::ports::remote::RemoteAccessError;

/// Background rendering error type.
#[derive(Debug, Error)]
pub enum BackgroundError {
    /// A local path was configured in a sandboxed host without a bridge.
    #[error("Cannot load local path '{path}': this host offers no remote file bridge")]
    BridgeUnavailable {
        /// The configured path.
        path: String,
    },

    /// The bridged read of a local path failed.
    #[error("Remote read of '{path}' failed")]
    RemoteRead {
        /// The configured path.
        path: String,
        /// The bridge failure.
        #[source]
        source: RemoteAccessError,
    },

    /// Other error.
    #[error("Background error: {0}")]
    Other(String),
}
