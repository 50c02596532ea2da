//! Host context port.
//!
//! The capability surface a host hands to an extension at registration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::editor::EditorService;
use crate::ports::remote::RemoteFileBridge;
use crate::ports::settings::SettingsService;
use crate::ports::theme::ThemeService;

/// The execution environment a host runs extensions in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostEnvironment {
    /// Desktop host with direct filesystem access.
    Native,
    /// Browser-style host; local files are reachable only through the
    /// remote file bridge.
    Sandboxed,
}

impl HostEnvironment {
    /// Checks whether the rendering layer can load local paths directly.
    pub fn has_direct_file_access(&self) -> bool {
        matches!(self, HostEnvironment::Native)
    }
}

/// Trait for the capability bundle passed to extensions at registration.
pub trait HostContext: Send + Sync {
    /// Gets the environment this host runs in.
    fn environment(&self) -> HostEnvironment;

    /// Gets the theming service.
    fn theme(&self) -> Arc<dyn ThemeService>;

    /// Gets the settings service.
    fn settings(&self) -> Arc<dyn SettingsService>;

    /// Gets the editor service.
    fn editor(&self) -> Arc<dyn EditorService>;

    /// Gets the privileged file bridge, if this host offers one.
    fn remote_files(&self) -> Option<Arc<dyn RemoteFileBridge>>;
}
