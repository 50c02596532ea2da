//! The background styler.
//!
//! Owns the style element for the session and rewrites its text whenever
//! the configuration changes. Rendering is split from applying so the
//! rule emission stays testable without a style element.

use std::sync::Arc;

use tracing::debug;

use crate::background::css;
use crate::background::errors::BackgroundError;
use crate::background::resolver::UrlResolver;
use crate::background::types::BackgroundSettings;
use crate::ports::theme::StyleHandle;

/// Renders the backdrop rule and writes it into the host-owned style
/// element.
pub struct BackgroundStyler {
    style: Arc<dyn StyleHandle>,
    resolver: Arc<dyn UrlResolver>,
}

impl BackgroundStyler {
    /// Creates a new styler around a style element and a URL resolver.
    pub fn new(style: Arc<dyn StyleHandle>, resolver: Arc<dyn UrlResolver>) -> Self {
        BackgroundStyler { style, resolver }
    }

    /// Produces the CSS text for `path` at the configured `opacity`
    /// without touching the style element.
    ///
    /// The path is trimmed first; if nothing remains the result is the
    /// empty string, which clears any existing backdrop when applied.
    pub async fn render(&self, path: &str, opacity: f64) -> Result<String, BackgroundError> {
        let path = path.trim();
        if path.is_empty() {
            return Ok(String::new());
        }
        let url = self.resolver.resolve(path).await?;
        Ok(css::background_rule(&url, opacity))
    }

    /// Renders and overwrites the style element's text.
    ///
    /// On render failure the element keeps its previous content.
    /// Overlapping calls are not serialized; the last write wins.
    pub async fn apply(&self, path: &str, opacity: f64) -> Result<(), BackgroundError> {
        let rule = self.render(path, opacity).await?;
        debug!("Writing backdrop rule into style {} ({} bytes)", self.style.id(), rule.len());
        self.style.set_css(&rule);
        Ok(())
    }

    /// Applies a typed settings view.
    pub async fn apply_settings(&self, settings: &BackgroundSettings) -> Result<(), BackgroundError> {
        self.apply(&settings.image_path, settings.opacity).await
    }

    /// Flips the style element's disabled flag without recomputing the
    /// rule.
    ///
    /// # Returns
    ///
    /// `true` when the backdrop is visible after the call.
    pub fn toggle(&self) -> bool {
        let disabled = !self.style.is_disabled();
        self.style.set_disabled(disabled);
        debug!("Backdrop toggled {}", if disabled { "off" } else { "on" });
        !disabled
    }

    /// Gets the style element this styler writes to.
    pub fn style(&self) -> &Arc<dyn StyleHandle> {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::resolver::DirectFileResolver;
    use crate::host::in_memory::InMemoryStyle;

    fn native_styler() -> (Arc<InMemoryStyle>, BackgroundStyler) {
        let style = Arc::new(InMemoryStyle::new(""));
        let styler = BackgroundStyler::new(style.clone(), Arc::new(DirectFileResolver));
        (style, styler)
    }

    #[tokio::test]
    async fn test_render_empty_path_yields_empty_string() {
        let (_, styler) = native_styler();

        assert_eq!(styler.render("", 0.3).await.unwrap(), "");
        assert_eq!(styler.render("   \t ", 0.9).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_render_trims_before_resolving() {
        let (_, styler) = native_styler();

        let rule = styler.render("  /tmp/bg.png  ", 0.3).await.unwrap();

        assert!(rule.contains(r#"url("file:///tmp/bg.png")"#));
    }

    #[tokio::test]
    async fn test_apply_overwrites_style_text() {
        let (style, styler) = native_styler();

        styler.apply("C:\\images\\bg.png", 0.3).await.unwrap();

        let css = style.css();
        assert!(css.contains(r#"background: url("file://C:/images/bg.png") no-repeat center/cover;"#));
        assert!(css.contains("opacity: 0.15;"));
    }

    #[tokio::test]
    async fn test_apply_empty_path_clears_style_text() {
        let (style, styler) = native_styler();
        styler.apply("/tmp/bg.png", 0.3).await.unwrap();
        assert!(!style.css().is_empty());

        styler.apply("", 0.3).await.unwrap();

        assert_eq!(style.css(), "");
    }

    #[tokio::test]
    async fn test_apply_settings_uses_both_values() {
        let (style, styler) = native_styler();
        let settings = BackgroundSettings::new("https://example.com/a.png", 1.0);

        styler.apply_settings(&settings).await.unwrap();

        let css = style.css();
        assert!(css.contains("https://example.com/a.png"));
        assert!(css.contains("opacity: 0.5;"));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_visibility() {
        let (style, styler) = native_styler();
        assert!(!style.is_disabled());

        assert!(!styler.toggle());
        assert!(style.is_disabled());
        assert!(styler.toggle());
        assert!(!style.is_disabled());
    }

    #[tokio::test]
    async fn test_toggle_keeps_style_text() {
        let (style, styler) = native_styler();
        styler.apply("/tmp/bg.png", 0.3).await.unwrap();
        let before = style.css();

        styler.toggle();

        assert_eq!(style.css(), before);
    }
}
