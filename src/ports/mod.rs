// This module defines traits (ports) that the extension expects the
// embedding host to implement. The host hands them over at registration.

pub mod context;
pub mod editor;
pub mod remote;
pub mod settings;
pub mod theme;

pub use context::{HostContext, HostEnvironment};
pub use editor::{EditorAction, EditorError, EditorHandle, EditorService, KeyChord, KeyCode, KeyModifiers};
pub use remote::{FsRemoteBridge, RemoteAccessError, RemoteFileBridge};
pub use settings::{
    FieldControl, SchemaEntry, SettingField, SettingGroup, SettingKey, SettingValidator,
    SettingsChangedEvent, SettingsError, SettingsService, SettingsSnapshot, ValidationIssue,
};
pub use theme::{StyleHandle, StyleId, ThemeError, ThemeService};
