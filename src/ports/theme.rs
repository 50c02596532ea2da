//! Theming port.
//!
//! The host owns a pool of style elements that feed its rendering layer.
//! Extensions obtain one at registration and keep mutating it for the rest
//! of the session instead of creating new elements per update.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a style element handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleId(Uuid);

impl StyleId {
    /// Creates a new unique style identifier.
    pub fn new() -> Self {
        StyleId(Uuid::new_v4())
    }

    /// Gets the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for StyleId {
    fn default() -> Self {
        StyleId::new()
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Theming port error type.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The host refused to create another style element.
    #[error("Style element rejected by the host: {0}")]
    StyleRejected(String),

    /// Other error.
    #[error("Theming error: {0}")]
    Other(String),
}

/// Mutable handle to a single host-owned style element.
///
/// The handle stays valid for the whole host session. Writes take effect
/// on the host's next style flush.
pub trait StyleHandle: Send + Sync {
    /// Gets the identifier of this style element.
    fn id(&self) -> StyleId;

    /// Replaces the full CSS text of this style element.
    fn set_css(&self, css: &str);

    /// Gets the current CSS text of this style element.
    fn css(&self) -> String;

    /// Enables or disables this style element without touching its text.
    fn set_disabled(&self, disabled: bool);

    /// Checks whether this style element is currently disabled.
    fn is_disabled(&self) -> bool;
}

/// Trait for the host service that manages style elements.
#[async_trait]
pub trait ThemeService: Send + Sync {
    /// Creates a new style element seeded with `initial_css` and returns
    /// a handle to it.
    ///
    /// # Arguments
    ///
    /// * `initial_css` - The initial CSS text, may be empty
    ///
    /// # Returns
    ///
    /// A handle to the new style element, or an error if the host
    /// refused to create one.
    async fn add_styles(&self, initial_css: &str) -> Result<Arc<dyn StyleHandle>, ThemeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_id_unique() {
        let a = StyleId::new();
        let b = StyleId::new();

        assert_ne!(a, b);
    }

    #[test]
    fn test_style_id_display_matches_uuid() {
        let id = StyleId::new();

        assert_eq!(format!("{}", id), id.as_uuid().to_string());
    }
}
