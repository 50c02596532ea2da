//! Background image extension for note-taking editor hosts.
//!
//! Paints a user-configured image behind the host's main view: two settings
//! (image path or URL, opacity) feed a CSS rule written into a host-owned
//! style element, a Shift+Alt+B chord toggles the backdrop, and settings
//! commits re-render it. The host is abstracted behind capability ports so
//! the extension runs against any editor that implements them; an
//! in-memory host ships for tests and embedding.

// Export extension modules
pub mod background;
pub mod error;
pub mod extension;
pub mod host;
pub mod ports;

// Re-export common types and interfaces
pub use error::{ExtensionError, ExtensionResult};
pub use extension::{BackgroundExtension, TOGGLE_CHORD};
pub use background::{
    BackgroundError, BackgroundSettings, BackgroundStyler, ResolvedUrl, ACTION_TOGGLE,
    DEFAULT_OPACITY, EXTENSION_NAME, SETTING_IMAGE_PATH, SETTING_OPACITY,
};
pub use ports::{
    EditorAction, EditorError, EditorHandle, EditorService, FieldControl, FsRemoteBridge,
    HostContext, HostEnvironment, KeyChord, KeyCode, KeyModifiers, RemoteAccessError, RemoteFileBridge,
    SchemaEntry, SettingField, SettingGroup, SettingKey, SettingsChangedEvent, SettingsError,
    SettingsService, SettingsSnapshot, StyleHandle, StyleId, ThemeError, ThemeService,
    ValidationIssue,
};
pub use host::{InMemoryHost, InMemoryStyle};
