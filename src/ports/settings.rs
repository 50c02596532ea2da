//! Settings port.
//!
//! The host owns the settings store and the settings panel. Extensions
//! contribute schema entries for their own keys, read values out of
//! snapshots and get notified about committed changes through a broadcast
//! channel. Values cross the port as loosely typed JSON; typed views are
//! built on the extension side.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tokio::sync::broadcast;

use async_trait::async_trait;

/// A settings key.
///
/// Keys are flat dotted strings; extension-owned keys carry the extension
/// name as prefix (for example `extension-background.image-path`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingKey(String);

impl SettingKey {
    /// Creates a new setting key.
    pub fn new(key: impl Into<String>) -> Self {
        SettingKey(key.into())
    }

    /// Gets the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SettingKey {
    fn from(s: &str) -> Self {
        SettingKey(s.to_string())
    }
}

impl From<String> for SettingKey {
    fn from(s: String) -> Self {
        SettingKey(s)
    }
}

/// A point-in-time copy of the full settings store.
pub type SettingsSnapshot = HashMap<SettingKey, JsonValue>;

/// Event published by the host after a settings commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsChangedEvent {
    /// The keys written by this commit.
    pub changed_keys: Vec<SettingKey>,
    /// The full settings snapshot after the commit.
    pub settings: SettingsSnapshot,
}

impl SettingsChangedEvent {
    /// Creates a new settings changed event.
    pub fn new(changed_keys: Vec<SettingKey>, settings: SettingsSnapshot) -> Self {
        SettingsChangedEvent {
            changed_keys,
            settings,
        }
    }

    /// Checks whether this commit wrote the given key.
    pub fn touches(&self, key: &SettingKey) -> bool {
        self.changed_keys.iter().any(|k| k == key)
    }
}

/// The settings panel group a field is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingGroup {
    /// General settings.
    General,
    /// Appearance settings.
    Appearance,
    /// Editor settings.
    Editor,
    /// Advanced settings.
    Advanced,
}

impl SettingGroup {
    /// Gets the display name of the group.
    pub fn display_name(&self) -> &'static str {
        match self {
            SettingGroup::General => "General",
            SettingGroup::Appearance => "Appearance",
            SettingGroup::Editor => "Editor",
            SettingGroup::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SettingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name().to_lowercase())
    }
}

/// The input control the settings panel renders for a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldControl {
    /// Free-form text input.
    Text,
    /// Numeric slider.
    Range {
        /// Smallest accepted value.
        minimum: f64,
        /// Largest accepted value.
        maximum: f64,
        /// Slider step width.
        step: f64,
    },
    /// Text input with an open-file dialog attached.
    FilePicker {
        /// File extensions offered by the dialog, without leading dots.
        extensions: Vec<String>,
    },
}

/// A settings panel field contributed by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingField {
    /// The key this field reads and writes.
    pub key: SettingKey,
    /// The label shown in the settings panel.
    pub title: String,
    /// The panel group the field is shown under.
    pub group: SettingGroup,
    /// The input control rendered for the field.
    pub control: FieldControl,
    /// The value used while the store has no entry for the key.
    pub default: JsonValue,
}

/// A single complaint raised by a field validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// The key the complaint is about.
    pub key: SettingKey,
    /// Human readable message shown next to the field.
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(key: SettingKey, message: impl Into<String>) -> Self {
        ValidationIssue {
            key,
            message: message.into(),
        }
    }
}

/// Callback the host runs against every attempted write to a field's key.
/// An empty issue list accepts the value.
pub type SettingValidator = Arc<dyn Fn(&SettingKey, &JsonValue) -> Vec<ValidationIssue> + Send + Sync>;

/// A schema entry: one field plus its optional validator.
#[derive(Clone)]
pub struct SchemaEntry {
    /// The field declaration.
    pub field: SettingField,
    /// Validator run before commits to the field's key.
    pub validator: Option<SettingValidator>,
}

impl SchemaEntry {
    /// Creates a schema entry without a validator.
    pub fn new(field: SettingField) -> Self {
        SchemaEntry {
            field,
            validator: None,
        }
    }

    /// Creates a schema entry with a validator.
    pub fn with_validator(field: SettingField, validator: SettingValidator) -> Self {
        SchemaEntry {
            field,
            validator: Some(validator),
        }
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("field", &self.field)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Settings port error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A write was rejected by a field validator.
    #[error("Validation failed for '{key}': {}", issues_summary(.issues))]
    Validation {
        /// The rejected key.
        key: SettingKey,
        /// The complaints raised by the validator.
        issues: Vec<ValidationIssue>,
    },

    /// Schema registration failed.
    #[error("Schema registration failed: {0}")]
    SchemaRejected(String),

    /// Other error.
    #[error("Settings error: {0}")]
    Other(String),
}

fn issues_summary(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Trait for the host service that owns the settings store.
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Registers (or re-registers) schema entries for extension-owned keys.
    ///
    /// # Arguments
    ///
    /// * `entries` - The fields and validators to merge into the schema
    async fn change_schema(&self, entries: Vec<SchemaEntry>) -> Result<(), SettingsError>;

    /// Gets the current value for a key, falling back to the schema
    /// default if the store has no entry.
    fn setting(&self, key: &SettingKey) -> Option<JsonValue>;

    /// Gets a snapshot of the full settings store.
    fn snapshot(&self) -> SettingsSnapshot;

    /// Subscribes to settings changed events.
    fn subscribe(&self) -> broadcast::Receiver<SettingsChangedEvent>;
}
