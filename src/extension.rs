//! Extension registration and event wiring.
//!
//! `BackgroundExtension::register` performs the one-time setup against a
//! host: obtain a style element, pick the URL resolution strategy,
//! contribute settings fields and the toggle action, then apply the
//! persisted configuration. `run` afterwards drives the settings-changed
//! reaction until the host shuts the channel down.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::background::resolver::resolver_for;
use crate::background::schema::settings_schema;
use crate::background::service::BackgroundStyler;
use crate::background::types::{image_path_key, opacity_key, BackgroundSettings, ACTION_TOGGLE, EXTENSION_NAME};
use crate::error::{ExtensionError, ExtensionResult};
use crate::ports::context::HostContext;
use crate::ports::editor::{EditorAction, KeyChord, KeyCode, KeyModifiers};
use crate::ports::settings::SettingsChangedEvent;

/// Chord bound to the visibility toggle.
pub const TOGGLE_CHORD: KeyChord = KeyChord::new(
    KeyModifiers::SHIFT.union(KeyModifiers::ALT),
    KeyCode::Char('b'),
);

/// The background extension, registered once per host session.
pub struct BackgroundExtension {
    styler: Arc<BackgroundStyler>,
    events: Mutex<Option<broadcast::Receiver<SettingsChangedEvent>>>,
}

impl BackgroundExtension {
    /// Name under which the extension registers.
    pub const NAME: &'static str = EXTENSION_NAME;

    /// Registers the extension against a host.
    ///
    /// Failing to apply the persisted configuration is not fatal; the
    /// extension comes up without a backdrop and recovers on the next
    /// settings commit. Schema, style element and action registration
    /// failures abort registration.
    pub async fn register(host: &dyn HostContext) -> ExtensionResult<Self> {
        let environment = host.environment();
        info!("Registering '{}' in a {:?} host", Self::NAME, environment);

        let style = host.theme().add_styles("").await?;
        let resolver = resolver_for(environment, host.remote_files());
        let styler = Arc::new(BackgroundStyler::new(style, resolver));

        let settings = host.settings();
        settings.change_schema(settings_schema(environment)).await?;

        let editor = host.editor().when_ready().await?;
        editor.add_action(toggle_action(styler.clone()))?;

        // Subscribe before the first snapshot read.
        let events = settings.subscribe();

        let persisted = BackgroundSettings::from_snapshot(&settings.snapshot());
        if let Err(error) = styler.apply_settings(&persisted).await {
            warn!("Initial backdrop apply failed, starting without one: {}", error);
        }

        Ok(BackgroundExtension {
            styler,
            events: Mutex::new(Some(events)),
        })
    }

    /// Reacts to one settings commit.
    ///
    /// Re-renders only when the commit touched the image path or opacity
    /// key, using the values from the event's snapshot.
    ///
    /// # Returns
    ///
    /// `true` when a re-render happened.
    pub async fn handle_settings_changed(
        &self,
        event: &SettingsChangedEvent,
    ) -> ExtensionResult<bool> {
        if !event.touches(&image_path_key()) && !event.touches(&opacity_key()) {
            return Ok(false);
        }
        let settings = BackgroundSettings::from_snapshot(&event.settings);
        debug!("Settings commit touched the backdrop, re-rendering");
        self.styler.apply_settings(&settings).await?;
        Ok(true)
    }

    /// Consumes settings-changed events until the host closes the channel.
    ///
    /// Render failures are logged and the style element keeps its previous
    /// content. Can only be called once per registration.
    pub async fn run(&self) -> ExtensionResult<()> {
        let mut events = self
            .events
            .lock()
            .await
            .take()
            .ok_or(ExtensionError::ListenerAlreadyRunning)?;
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(error) = self.handle_settings_changed(&event).await {
                        error!("Backdrop re-render failed: {}", error);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Skipped {} settings events, waiting for the next commit", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Settings channel closed, stopping the backdrop listener");
                    return Ok(());
                }
            }
        }
    }

    /// Gets the styler driving the style element.
    pub fn styler(&self) -> &Arc<BackgroundStyler> {
        &self.styler
    }
}

fn toggle_action(styler: Arc<BackgroundStyler>) -> EditorAction {
    EditorAction {
        id: ACTION_TOGGLE.to_string(),
        label: "background: toggle background image".to_string(),
        keybinding: Some(TOGGLE_CHORD),
        run: Arc::new(move || {
            styler.toggle();
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::types::{SETTING_IMAGE_PATH, SETTING_OPACITY};
    use crate::host::in_memory::InMemoryHost;
    use crate::ports::remote::FsRemoteBridge;
    use crate::ports::settings::{SettingKey, SettingsSnapshot};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_register_contributes_schema_and_action() -> anyhow::Result<()> {
        let host = InMemoryHost::native();

        let extension = BackgroundExtension::register(&host).await?;

        assert_eq!(BackgroundExtension::NAME, "extension-background");
        let keys = host.schema_keys();
        assert!(keys.contains(&SettingKey::new(SETTING_IMAGE_PATH)));
        assert!(keys.contains(&SettingKey::new(SETTING_OPACITY)));
        assert!(host.action_ids().contains(&ACTION_TOGGLE.to_string()));
        assert_eq!(host.style_count(), 1);
        assert_eq!(extension.styler().style().css(), "");
        Ok(())
    }

    #[tokio::test]
    async fn test_register_applies_persisted_settings() {
        let host = InMemoryHost::native();
        host.seed_setting(SettingKey::new(SETTING_IMAGE_PATH), json!("https://example.com/a.png"));
        host.seed_setting(SettingKey::new(SETTING_OPACITY), json!(1.0));

        let extension = BackgroundExtension::register(&host).await.unwrap();

        let css = extension.styler().style().css();
        assert!(css.contains("https://example.com/a.png"));
        assert!(css.contains("opacity: 0.5;"));
    }

    #[tokio::test]
    async fn test_register_survives_unloadable_initial_path() {
        let host = InMemoryHost::sandboxed(None);
        host.seed_setting(SettingKey::new(SETTING_IMAGE_PATH), json!("/tmp/bg.png"));

        let extension = BackgroundExtension::register(&host).await.unwrap();

        assert_eq!(extension.styler().style().css(), "");
    }

    #[tokio::test]
    async fn test_unrelated_commit_does_not_rerender() {
        let host = InMemoryHost::native();
        let extension = BackgroundExtension::register(&host).await.unwrap();
        extension.styler().apply("https://example.com/a.png", 0.3).await.unwrap();
        let before = extension.styler().style().css();

        let mut snapshot = SettingsSnapshot::new();
        snapshot.insert(SettingKey::new("unrelated.key"), json!(true));
        let event = SettingsChangedEvent::new(vec![SettingKey::new("unrelated.key")], snapshot);
        let rendered = extension.handle_settings_changed(&event).await.unwrap();

        assert!(!rendered);
        assert_eq!(extension.styler().style().css(), before);
    }

    #[tokio::test]
    async fn test_relevant_commit_rerenders_from_event_snapshot() {
        let host = InMemoryHost::native();
        let extension = BackgroundExtension::register(&host).await.unwrap();

        let mut snapshot = SettingsSnapshot::new();
        snapshot.insert(SettingKey::new(SETTING_IMAGE_PATH), json!("C:\\images\\bg.png"));
        snapshot.insert(SettingKey::new(SETTING_OPACITY), json!(0.3));
        let event = SettingsChangedEvent::new(vec![SettingKey::new(SETTING_IMAGE_PATH)], snapshot);
        let rendered = extension.handle_settings_changed(&event).await.unwrap();

        assert!(rendered);
        let css = extension.styler().style().css();
        assert!(css.contains(r#"url("file://C:/images/bg.png")"#));
        assert!(css.contains("opacity: 0.15;"));
    }

    #[tokio::test]
    async fn test_run_reacts_to_host_commits() -> anyhow::Result<()> {
        let host = InMemoryHost::native();
        let extension = Arc::new(BackgroundExtension::register(&host).await?);
        let listener = {
            let extension = extension.clone();
            tokio::spawn(async move { extension.run().await })
        };

        host.commit_setting(SettingKey::new(SETTING_IMAGE_PATH), json!("https://example.com/a.png"))
            .await?;

        let mut css = String::new();
        for _ in 0..100 {
            css = extension.styler().style().css();
            if !css.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(css.contains("https://example.com/a.png"));

        drop(host);
        listener.await??;
        Ok(())
    }

    #[tokio::test]
    async fn test_multi_key_commit_publishes_one_event() -> anyhow::Result<()> {
        let host = InMemoryHost::native();
        let extension = BackgroundExtension::register(&host).await?;
        let mut events = host.settings().subscribe();

        host.commit_settings(vec![
            (SettingKey::new(SETTING_IMAGE_PATH), json!("https://example.com/a.png")),
            (SettingKey::new(SETTING_OPACITY), json!(1.0)),
        ])
        .await?;

        let event = events.recv().await?;
        assert_eq!(event.changed_keys.len(), 2);
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        let rendered = extension.handle_settings_changed(&event).await?;
        assert!(rendered);
        let css = extension.styler().style().css();
        assert!(css.contains("https://example.com/a.png"));
        assert!(css.contains("opacity: 0.5;"));
        Ok(())
    }

    #[tokio::test]
    async fn test_run_can_only_start_once() {
        let host = InMemoryHost::native();
        let extension = BackgroundExtension::register(&host).await.unwrap();

        // Dropping the host closes the settings channel, so the first run
        // drains it and returns.
        drop(host);
        extension.run().await.unwrap();
        let second = extension.run().await;

        assert!(matches!(second, Err(ExtensionError::ListenerAlreadyRunning)));
    }

    #[tokio::test]
    async fn test_sandboxed_host_embeds_image_through_bridge() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("bg.png");
        std::fs::write(&image, b"ab").unwrap();
        let host = InMemoryHost::sandboxed(Some(Arc::new(FsRemoteBridge::new())));
        host.seed_setting(
            SettingKey::new(SETTING_IMAGE_PATH),
            json!(image.to_str().unwrap()),
        );

        let extension = BackgroundExtension::register(&host).await.unwrap();

        let css = extension.styler().style().css();
        assert!(css.contains(r#"url("data:image/png;base64,YWI=")"#));
        assert!(css.contains("opacity: 0.15;"));
    }

    #[tokio::test]
    async fn test_failed_bridged_rerender_keeps_previous_style() {
        let host = InMemoryHost::sandboxed(Some(Arc::new(FsRemoteBridge::new())));
        let extension = BackgroundExtension::register(&host).await.unwrap();
        extension.styler().apply("https://example.com/a.png", 0.3).await.unwrap();
        let before = extension.styler().style().css();

        let mut snapshot = SettingsSnapshot::new();
        snapshot.insert(SettingKey::new(SETTING_IMAGE_PATH), json!("/definitely/not/here.png"));
        let event = SettingsChangedEvent::new(vec![SettingKey::new(SETTING_IMAGE_PATH)], snapshot);
        let error = extension.handle_settings_changed(&event).await.unwrap_err();

        assert!(matches!(
            error,
            ExtensionError::Background(crate::background::BackgroundError::RemoteRead { .. })
        ));
        assert_eq!(extension.styler().style().css(), before);
    }

    #[tokio::test]
    async fn test_toggle_chord_matches_shift_alt_b() {
        assert_eq!(format!("{}", TOGGLE_CHORD), "Shift+Alt+B");
        assert!(TOGGLE_CHORD.matches(&KeyChord::new(
            KeyModifiers::SHIFT.union(KeyModifiers::ALT),
            KeyCode::Char('B'),
        )));
    }

    #[tokio::test]
    async fn test_pressed_chord_toggles_backdrop() {
        let host = InMemoryHost::native();
        let extension = BackgroundExtension::register(&host).await.unwrap();
        let style = extension.styler().style().clone();
        assert!(!style.is_disabled());

        let dispatched = host.press(TOGGLE_CHORD);

        assert_eq!(dispatched, 1);
        assert!(style.is_disabled());

        host.press(TOGGLE_CHORD);
        assert!(!style.is_disabled());
    }
}
