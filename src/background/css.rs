//! CSS emission for the backdrop rule.

use crate::background::types::ResolvedUrl;

/// Selector of the host's root container. The backdrop hangs off its
/// `::before` pseudo-element and never participates in layout.
pub const APP_ROOT_SELECTOR: &str = "#app";

/// Stacks the backdrop above ordinary UI layers. Hit testing is unaffected
/// since the rule also sets `pointer-events: none`.
pub const BACKDROP_Z_INDEX: u32 = 1_000_000;

/// Emits the full backdrop rule for one image URL.
///
/// `opacity` is the configured value; the emitted rule halves it so the
/// backdrop stays behind readable content even at the top of the range.
pub fn background_rule(url: &ResolvedUrl, opacity: f64) -> String {
    format!(
        r#"{selector}::before {{
    content: "";
    width: 100%;
    height: 100%;
    position: absolute;
    z-index: {z_index};
    pointer-events: none;
    background: url("{url}") no-repeat center/cover;
    opacity: {opacity};
}}
"#,
        selector = APP_ROOT_SELECTOR,
        z_index = BACKDROP_Z_INDEX,
        url = url.as_str(),
        opacity = opacity / 2.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_shape() {
        let url = ResolvedUrl::new("file://C:/images/bg.png");

        let rule = background_rule(&url, 0.3);

        assert_eq!(
            rule,
            r#"#app::before {
    content: "";
    width: 100%;
    height: 100%;
    position: absolute;
    z-index: 1000000;
    pointer-events: none;
    background: url("file://C:/images/bg.png") no-repeat center/cover;
    opacity: 0.15;
}
"#
        );
    }

    #[test]
    fn test_opacity_is_halved() {
        let url = ResolvedUrl::new("https://example.com/a.png");

        assert!(background_rule(&url, 1.0).contains("opacity: 0.5;"));
        assert!(background_rule(&url, 0.0).contains("opacity: 0;"));
    }

    #[test]
    fn test_url_is_quoted_verbatim() {
        let url = ResolvedUrl::new("https://example.com/a.png");

        let rule = background_rule(&url, 1.0);

        assert!(rule.contains(r#"background: url("https://example.com/a.png") no-repeat center/cover;"#));
    }

    #[test]
    fn test_backdrop_never_captures_input() {
        let url = ResolvedUrl::new("file:///tmp/bg.png");

        let rule = background_rule(&url, 0.3);

        assert!(rule.contains("pointer-events: none;"));
        assert!(rule.contains("z-index: 1000000;"));
    }
}
