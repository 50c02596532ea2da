//! Core types for the background extension.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ports::settings::{SettingKey, SettingsSnapshot};

/// Name under which the extension registers with the host.
pub const EXTENSION_NAME: &str = "extension-background";

/// Settings key holding the background image path or URL.
pub const SETTING_IMAGE_PATH: &str = "extension-background.image-path";

/// Settings key holding the configured backdrop opacity.
pub const SETTING_OPACITY: &str = "extension-background.opacity";

/// Palette id of the visibility toggle action.
pub const ACTION_TOGGLE: &str = "extension-background.toggle";

/// Image path used while the user has not configured one.
pub const DEFAULT_IMAGE_PATH: &str = "";

/// Opacity used while the user has not configured one.
pub const DEFAULT_OPACITY: f64 = 0.3;

/// Gets the image path key as a typed key.
pub fn image_path_key() -> SettingKey {
    SettingKey::new(SETTING_IMAGE_PATH)
}

/// Gets the opacity key as a typed key.
pub fn opacity_key() -> SettingKey {
    SettingKey::new(SETTING_OPACITY)
}

/// Typed view over the extension's two persisted settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundSettings {
    /// Local path or absolute URL of the background image.
    pub image_path: String,
    /// Configured opacity in `0.0..=1.0`.
    pub opacity: f64,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        BackgroundSettings {
            image_path: DEFAULT_IMAGE_PATH.to_string(),
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl BackgroundSettings {
    /// Creates new background settings.
    pub fn new(image_path: impl Into<String>, opacity: f64) -> Self {
        BackgroundSettings {
            image_path: image_path.into(),
            opacity,
        }
    }

    /// Reads both values out of a host snapshot. Missing or ill-typed
    /// entries fall back to the defaults.
    pub fn from_snapshot(snapshot: &SettingsSnapshot) -> Self {
        let image_path = snapshot
            .get(&image_path_key())
            .and_then(|value| value.as_str())
            .unwrap_or(DEFAULT_IMAGE_PATH)
            .to_string();
        let opacity = snapshot
            .get(&opacity_key())
            .and_then(|value| value.as_f64())
            .unwrap_or(DEFAULT_OPACITY);

        BackgroundSettings {
            image_path,
            opacity,
        }
    }
}

/// A URL the host's rendering layer can paint directly.
///
/// One of `http(s)://` passed through, `file://` built from a local path
/// or a base64 `data:` URL assembled from bridged bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedUrl(String);

impl ResolvedUrl {
    /// Creates a new resolved URL.
    pub fn new(url: impl Into<String>) -> Self {
        ResolvedUrl(url.into())
    }

    /// Gets the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
