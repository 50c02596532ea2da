//! Editor port.
//!
//! Covers the part of the host's editor surface extensions talk to:
//! contributing palette actions with optional key bindings. The editor
//! becomes available some time after host startup, so the service hands
//! out its handle asynchronously.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

bitflags::bitflags! {
    /// Modifier keys participating in a key chord.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 1;
        const SHIFT = 2;
        const ALT = 4;
        const META = 8;
    }
}

/// A non-modifier key in a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character key, matched case-insensitively.
    Char(char),
    /// The enter key.
    Enter,
    /// The escape key.
    Escape,
    /// The tab key.
    Tab,
    /// The space bar.
    Space,
}

/// A key binding: modifiers plus one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// The modifier keys that must be held.
    pub modifiers: KeyModifiers,
    /// The non-modifier key.
    pub code: KeyCode,
}

impl KeyChord {
    /// Creates a new key chord.
    pub const fn new(modifiers: KeyModifiers, code: KeyCode) -> Self {
        KeyChord { modifiers, code }
    }

    /// Checks whether a pressed chord triggers this binding. Character
    /// keys compare case-insensitively so Shift does not change the key
    /// identity.
    pub fn matches(&self, pressed: &KeyChord) -> bool {
        if self.modifiers != pressed.modifiers {
            return false;
        }
        match (self.code, pressed.code) {
            (KeyCode::Char(a), KeyCode::Char(b)) => a.eq_ignore_ascii_case(&b),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CTRL, "Ctrl"),
            (KeyModifiers::SHIFT, "Shift"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::META, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{}+", name)?;
            }
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Escape => write!(f, "Escape"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::Space => write!(f, "Space"),
        }
    }
}

/// Callback run when an action is triggered.
pub type ActionCallback = Arc<dyn Fn() + Send + Sync>;

/// An action contributed to the editor's command palette.
#[derive(Clone)]
pub struct EditorAction {
    /// Stable identifier, prefixed with the extension name.
    pub id: String,
    /// Label shown in the palette.
    pub label: String,
    /// Key binding that also triggers the action.
    pub keybinding: Option<KeyChord>,
    /// The callback to run.
    pub run: ActionCallback,
}

impl fmt::Debug for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("keybinding", &self.keybinding)
            .finish()
    }
}

/// Editor port error type.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The editor surface never became available in this host session.
    #[error("Editor unavailable in this host session")]
    Unavailable,

    /// The editor refused an action contribution.
    #[error("Action '{id}' rejected by the editor: {reason}")]
    ActionRejected {
        /// The rejected action id.
        id: String,
        /// Why the editor refused it.
        reason: String,
    },

    /// Other error.
    #[error("Editor error: {0}")]
    Other(String),
}

/// Handle to a ready editor surface.
pub trait EditorHandle: Send + Sync {
    /// Contributes an action to the command palette.
    fn add_action(&self, action: EditorAction) -> Result<(), EditorError>;
}

/// Trait for the host service that exposes the editor surface.
#[async_trait]
pub trait EditorService: Send + Sync {
    /// Resolves once the editor is ready to accept contributions.
    async fn when_ready(&self) -> Result<Arc<dyn EditorHandle>, EditorError>;
}
