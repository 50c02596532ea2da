//! An in-process host implementing every capability port.
//!
//! State is plain memory behind locks: style elements are strings with a
//! disabled flag, the settings store is a map guarded by the registered
//! validators, the editor is an action list with chord dispatch. Commits
//! publish `SettingsChangedEvent`s over a broadcast channel exactly like
//! a real host would after a settings panel save.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use tracing::debug;

use crate::ports::context::{HostContext, HostEnvironment};
use crate::ports::editor::{EditorAction, EditorError, EditorHandle, EditorService, KeyChord};
use crate::ports::remote::RemoteFileBridge;
use crate::ports::settings::{
    SchemaEntry, SettingKey, SettingsChangedEvent, SettingsError, SettingsService,
    SettingsSnapshot,
};
use crate::ports::theme::{StyleHandle, StyleId, ThemeError, ThemeService};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A style element backed by a string and a disabled flag.
pub struct InMemoryStyle {
    id: StyleId,
    css: RwLock<String>,
    disabled: AtomicBool,
}

impl InMemoryStyle {
    /// Creates a new enabled style element.
    pub fn new(initial_css: &str) -> Self {
        InMemoryStyle {
            id: StyleId::new(),
            css: RwLock::new(initial_css.to_string()),
            disabled: AtomicBool::new(false),
        }
    }
}

impl StyleHandle for InMemoryStyle {
    fn id(&self) -> StyleId {
        self.id
    }

    fn set_css(&self, css: &str) {
        *self.css.write().unwrap() = css.to_string();
    }

    fn css(&self) -> String {
        self.css.read().unwrap().clone()
    }

    fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }
}

/// Theming service handing out in-memory style elements.
#[derive(Default)]
pub struct InMemoryTheme {
    styles: RwLock<Vec<Arc<InMemoryStyle>>>,
}

impl InMemoryTheme {
    /// Counts the style elements created so far.
    pub fn style_count(&self) -> usize {
        self.styles.read().unwrap().len()
    }
}

#[async_trait]
impl ThemeService for InMemoryTheme {
    async fn add_styles(&self, initial_css: &str) -> Result<Arc<dyn StyleHandle>, ThemeError> {
        let style = Arc::new(InMemoryStyle::new(initial_css));
        debug!("Created style element {}", style.id());
        self.styles.write().unwrap().push(style.clone());
        Ok(style)
    }
}

/// Settings store guarded by the registered validators.
pub struct InMemorySettings {
    values: RwLock<HashMap<SettingKey, JsonValue>>,
    schema: RwLock<Vec<SchemaEntry>>,
    events: broadcast::Sender<SettingsChangedEvent>,
}

impl InMemorySettings {
    fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        InMemorySettings {
            values: RwLock::new(HashMap::new()),
            schema: RwLock::new(Vec::new()),
            events,
        }
    }

    /// Writes a value without validation and without publishing an event,
    /// like persisted state present before the host starts.
    pub fn seed(&self, key: SettingKey, value: JsonValue) {
        self.values.write().unwrap().insert(key, value);
    }

    /// Commits values the way a settings panel save does: validators run
    /// first, then the store is written and one event is published.
    pub fn commit(&self, changes: Vec<(SettingKey, JsonValue)>) -> Result<(), SettingsError> {
        {
            let schema = self.schema.read().unwrap();
            for (key, value) in &changes {
                for entry in schema.iter().filter(|entry| &entry.field.key == key) {
                    if let Some(validator) = entry.validator.as_ref() {
                        let issues = validator(key, value);
                        if !issues.is_empty() {
                            return Err(SettingsError::Validation {
                                key: key.clone(),
                                issues,
                            });
                        }
                    }
                }
            }
        }
        let changed_keys: Vec<SettingKey> = changes.iter().map(|(key, _)| key.clone()).collect();
        {
            let mut values = self.values.write().unwrap();
            for (key, value) in changes {
                values.insert(key, value);
            }
        }
        debug!("Settings commit wrote {} keys", changed_keys.len());
        let event = SettingsChangedEvent::new(changed_keys, self.build_snapshot());
        // Nobody listening is fine.
        let _ = self.events.send(event);
        Ok(())
    }

    /// Lists the keys currently covered by the schema.
    pub fn schema_keys(&self) -> Vec<SettingKey> {
        self.schema
            .read()
            .unwrap()
            .iter()
            .map(|entry| entry.field.key.clone())
            .collect()
    }

    fn build_snapshot(&self) -> SettingsSnapshot {
        let mut snapshot: SettingsSnapshot = self
            .schema
            .read()
            .unwrap()
            .iter()
            .map(|entry| (entry.field.key.clone(), entry.field.default.clone()))
            .collect();
        for (key, value) in self.values.read().unwrap().iter() {
            snapshot.insert(key.clone(), value.clone());
        }
        snapshot
    }
}

#[async_trait]
impl SettingsService for InMemorySettings {
    async fn change_schema(&self, entries: Vec<SchemaEntry>) -> Result<(), SettingsError> {
        let mut schema = self.schema.write().unwrap();
        for entry in entries {
            // Re-registration replaces the previous entry for the key.
            schema.retain(|existing| existing.field.key != entry.field.key);
            debug!("Schema entry registered for '{}'", entry.field.key);
            schema.push(entry);
        }
        Ok(())
    }

    fn setting(&self, key: &SettingKey) -> Option<JsonValue> {
        if let Some(value) = self.values.read().unwrap().get(key) {
            return Some(value.clone());
        }
        self.schema
            .read()
            .unwrap()
            .iter()
            .find(|entry| &entry.field.key == key)
            .map(|entry| entry.field.default.clone())
    }

    fn snapshot(&self) -> SettingsSnapshot {
        self.build_snapshot()
    }

    fn subscribe(&self) -> broadcast::Receiver<SettingsChangedEvent> {
        self.events.subscribe()
    }
}

/// Action list shared between the editor service and chord dispatch.
#[derive(Default)]
struct ActionRegistry {
    actions: RwLock<Vec<EditorAction>>,
}

impl ActionRegistry {
    fn dispatch(&self, pressed: KeyChord) -> usize {
        // Collect first so callbacks run without the lock held.
        let matching: Vec<EditorAction> = self
            .actions
            .read()
            .unwrap()
            .iter()
            .filter(|action| {
                action
                    .keybinding
                    .map(|binding| binding.matches(&pressed))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        for action in &matching {
            (action.run)();
        }
        matching.len()
    }

    fn action_ids(&self) -> Vec<String> {
        self.actions
            .read()
            .unwrap()
            .iter()
            .map(|action| action.id.clone())
            .collect()
    }
}

impl EditorHandle for ActionRegistry {
    fn add_action(&self, action: EditorAction) -> Result<(), EditorError> {
        let mut actions = self.actions.write().unwrap();
        if actions.iter().any(|existing| existing.id == action.id) {
            return Err(EditorError::ActionRejected {
                id: action.id,
                reason: "duplicate action id".to_string(),
            });
        }
        debug!("Editor action '{}' contributed", action.id);
        actions.push(action);
        Ok(())
    }
}

/// Editor service whose surface is ready immediately.
pub struct InMemoryEditor {
    registry: Arc<ActionRegistry>,
}

impl InMemoryEditor {
    fn new() -> Self {
        InMemoryEditor {
            registry: Arc::new(ActionRegistry::default()),
        }
    }

    /// Simulates a chord press and returns how many actions ran.
    pub fn press(&self, chord: KeyChord) -> usize {
        self.registry.dispatch(chord)
    }

    /// Lists the contributed action ids.
    pub fn action_ids(&self) -> Vec<String> {
        self.registry.action_ids()
    }
}

#[async_trait]
impl EditorService for InMemoryEditor {
    async fn when_ready(&self) -> Result<Arc<dyn EditorHandle>, EditorError> {
        Ok(self.registry.clone())
    }
}

/// The in-process host bundling all capability ports.
pub struct InMemoryHost {
    environment: HostEnvironment,
    theme: Arc<InMemoryTheme>,
    settings: Arc<InMemorySettings>,
    editor: Arc<InMemoryEditor>,
    bridge: Option<Arc<dyn RemoteFileBridge>>,
}

impl InMemoryHost {
    /// Creates a host with direct filesystem access.
    pub fn native() -> Self {
        Self::with_environment(HostEnvironment::Native, None)
    }

    /// Creates a sandboxed host, optionally offering a file bridge.
    pub fn sandboxed(bridge: Option<Arc<dyn RemoteFileBridge>>) -> Self {
        Self::with_environment(HostEnvironment::Sandboxed, bridge)
    }

    /// Creates a host for an explicit environment and bridge combination.
    pub fn with_environment(
        environment: HostEnvironment,
        bridge: Option<Arc<dyn RemoteFileBridge>>,
    ) -> Self {
        InMemoryHost {
            environment,
            theme: Arc::new(InMemoryTheme::default()),
            settings: Arc::new(InMemorySettings::new()),
            editor: Arc::new(InMemoryEditor::new()),
            bridge,
        }
    }

    /// Writes persisted state present before extensions register.
    pub fn seed_setting(&self, key: SettingKey, value: JsonValue) {
        self.settings.seed(key, value);
    }

    /// Commits one setting the way a settings panel save does.
    pub async fn commit_setting(
        &self,
        key: SettingKey,
        value: JsonValue,
    ) -> Result<(), SettingsError> {
        self.settings.commit(vec![(key, value)])
    }

    /// Commits several settings as one change event.
    pub async fn commit_settings(
        &self,
        changes: Vec<(SettingKey, JsonValue)>,
    ) -> Result<(), SettingsError> {
        self.settings.commit(changes)
    }

    /// Lists the keys currently covered by the settings schema.
    pub fn schema_keys(&self) -> Vec<SettingKey> {
        self.settings.schema_keys()
    }

    /// Simulates a chord press and returns how many actions ran.
    pub fn press(&self, chord: KeyChord) -> usize {
        self.editor.press(chord)
    }

    /// Lists the contributed editor action ids.
    pub fn action_ids(&self) -> Vec<String> {
        self.editor.action_ids()
    }

    /// Counts the style elements created so far.
    pub fn style_count(&self) -> usize {
        self.theme.style_count()
    }
}

impl HostContext for InMemoryHost {
    fn environment(&self) -> HostEnvironment {
        self.environment
    }

    fn theme(&self) -> Arc<dyn ThemeService> {
        self.theme.clone()
    }

    fn settings(&self) -> Arc<dyn SettingsService> {
        self.settings.clone()
    }

    fn editor(&self) -> Arc<dyn EditorService> {
        self.editor.clone()
    }

    fn remote_files(&self) -> Option<Arc<dyn RemoteFileBridge>> {
        self.bridge.clone()
    }
}
