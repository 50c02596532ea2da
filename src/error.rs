//! Error module for the background extension.
//!
//! Per-area error types live next to the code that raises them; this module
//! defines the aggregate error the public entry points return.

use thiserror::Error;

use crate::background::errors::BackgroundError;
use crate::ports::editor::EditorError;
use crate::ports::settings::SettingsError;
use crate::ports::theme::ThemeError;

/// A general Result type for extension operations.
pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// The primary error type surfaced by registration and the event loop.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Background rendering error.
    #[error(transparent)]
    Background(#[from] BackgroundError),

    /// Theming port error.
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// Settings port error.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Editor port error.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The settings event stream was already claimed by an earlier call.
    #[error("Settings listener already running")]
    ListenerAlreadyRunning,

    /// Other error.
    #[error("Extension error: {0}")]
    Other(String),
}
