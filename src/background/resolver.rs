//! Image URL resolution strategies.
//!
//! The configured image path is either an absolute `http(s)://` URL or a
//! local path. URLs pass through untouched in every environment; how a
//! local path turns into something the rendering layer can load depends
//! on the host. Native hosts take a `file://` URL, sandboxed hosts need
//! the bytes embedded as a base64 `data:` URL read through the bridge.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::background::errors::BackgroundError;
use crate::background::types::ResolvedUrl;
use crate::ports::context::HostEnvironment;
use crate::ports::remote::RemoteFileBridge;

static ABSOLUTE_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("pattern is valid"));

/// Checks whether the configured path is already an absolute URL.
pub fn is_absolute_url(path: &str) -> bool {
    ABSOLUTE_URL_PATTERN.is_match(path)
}

/// Image file extensions the extension knows how to embed, without dots.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "avif"];

/// Derives the MIME type for an image path from its extension.
/// Unknown extensions fall back to `application/octet-stream`.
pub fn mime_for_path(path: &str) -> &'static str {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let extension = match file_name.rsplit_once('.') {
        Some((_, extension)) => extension.to_ascii_lowercase(),
        None => return "application/octet-stream",
    };
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Strategy turning a configured path into a loadable URL.
///
/// Callers pass paths already trimmed and non-empty.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Resolves `path` to a URL the rendering layer can paint.
    async fn resolve(&self, path: &str) -> Result<ResolvedUrl, BackgroundError>;
}

/// Resolver for hosts with direct filesystem access.
///
/// Local paths become `file://` URLs; backslash separators are normalized
/// to forward slashes so Windows paths stay loadable.
#[derive(Debug, Default)]
pub struct DirectFileResolver;

#[async_trait]
impl UrlResolver for DirectFileResolver {
    async fn resolve(&self, path: &str) -> Result<ResolvedUrl, BackgroundError> {
        if is_absolute_url(path) {
            return Ok(ResolvedUrl::new(path));
        }
        Ok(ResolvedUrl::new(format!(
            "file://{}",
            path.replace('\\', "/")
        )))
    }
}

/// Resolver for sandboxed hosts.
///
/// Local paths are read through the remote file bridge and embedded as
/// base64 `data:` URLs. Without a bridge only absolute URLs work.
pub struct BridgedFileResolver {
    bridge: Option<Arc<dyn RemoteFileBridge>>,
}

impl BridgedFileResolver {
    /// Creates a new bridged resolver.
    pub fn new(bridge: Option<Arc<dyn RemoteFileBridge>>) -> Self {
        BridgedFileResolver { bridge }
    }
}

#[async_trait]
impl UrlResolver for BridgedFileResolver {
    async fn resolve(&self, path: &str) -> Result<ResolvedUrl, BackgroundError> {
        if is_absolute_url(path) {
            return Ok(ResolvedUrl::new(path));
        }
        let bridge = self
            .bridge
            .as_ref()
            .ok_or_else(|| BackgroundError::BridgeUnavailable {
                path: path.to_string(),
            })?;
        let bytes = bridge
            .read_file(path)
            .await
            .map_err(|source| BackgroundError::RemoteRead {
                path: path.to_string(),
                source,
            })?;
        let mime = mime_for_path(path);
        debug!("Embedding '{}' as {} data URL ({} bytes)", path, mime, bytes.len());
        let payload = BASE64_STANDARD.encode(bytes);
        Ok(ResolvedUrl::new(format!("data:{};base64,{}", mime, payload)))
    }
}

/// Picks the resolver matching the host environment.
pub fn resolver_for(
    environment: HostEnvironment,
    bridge: Option<Arc<dyn RemoteFileBridge>>,
) -> Arc<dyn UrlResolver> {
    match environment {
        HostEnvironment::Native => Arc::new(DirectFileResolver),
        HostEnvironment::Sandboxed => Arc::new(BridgedFileResolver::new(bridge)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::remote::RemoteAccessError;
    use mockall::mock;

    mock! {
        Bridge {}

        #[async_trait]
        impl RemoteFileBridge for Bridge {
            async fn read_file(&self, path: &str) -> Result<Vec<u8>, RemoteAccessError>;
        }
    }

    #[test]
    fn test_absolute_url_detection() {
        assert!(is_absolute_url("http://example.com/a.png"));
        assert!(is_absolute_url("https://example.com/a.png"));
        assert!(!is_absolute_url("C:\\images\\bg.png"));
        assert!(!is_absolute_url("/home/user/bg.png"));
        assert!(!is_absolute_url("ftp://example.com/a.png"));
        assert!(!is_absolute_url("images/https://nested"));
    }

    #[test]
    fn test_mime_table() {
        assert_eq!(mime_for_path("a.png"), "image/png");
        assert_eq!(mime_for_path("A.JPG"), "image/jpeg");
        assert_eq!(mime_for_path("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_for_path("anim.gif"), "image/gif");
        assert_eq!(mime_for_path("pic.webp"), "image/webp");
        assert_eq!(mime_for_path("icon.svg"), "image/svg+xml");
        assert_eq!(mime_for_path("noextension"), "application/octet-stream");
        assert_eq!(mime_for_path("dir.d/noextension"), "application/octet-stream");
        assert_eq!(mime_for_path("weird.xyz"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_direct_resolver_builds_file_url() {
        let resolver = DirectFileResolver;

        let url = resolver.resolve("C:\\images\\bg.png").await.unwrap();

        assert_eq!(url.as_str(), "file://C:/images/bg.png");
    }

    #[tokio::test]
    async fn test_direct_resolver_keeps_unix_paths() {
        let resolver = DirectFileResolver;

        let url = resolver.resolve("/home/user/bg.png").await.unwrap();

        assert_eq!(url.as_str(), "file:///home/user/bg.png");
    }

    #[tokio::test]
    async fn test_direct_resolver_passes_urls_through() {
        let resolver = DirectFileResolver;

        let url = resolver.resolve("https://example.com/a.png").await.unwrap();

        assert_eq!(url.as_str(), "https://example.com/a.png");
    }

    #[tokio::test]
    async fn test_bridged_resolver_embeds_data_url() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_read_file()
            .withf(|path| path == "/home/user/bg.png")
            .times(1)
            .returning(|_| Ok(b"ab".to_vec()));
        let resolver = BridgedFileResolver::new(Some(Arc::new(bridge)));

        let url = resolver.resolve("/home/user/bg.png").await.unwrap();

        assert_eq!(url.as_str(), "data:image/png;base64,YWI=");
    }

    #[tokio::test]
    async fn test_bridged_resolver_skips_bridge_for_urls() {
        // No expectation registered, so any bridge call would panic.
        let bridge = MockBridge::new();
        let resolver = BridgedFileResolver::new(Some(Arc::new(bridge)));

        let url = resolver.resolve("https://example.com/a.png").await.unwrap();

        assert_eq!(url.as_str(), "https://example.com/a.png");
    }

    #[tokio::test]
    async fn test_bridged_resolver_reports_read_failures() {
        let mut bridge = MockBridge::new();
        bridge
            .expect_read_file()
            .returning(|path| Err(RemoteAccessError::NotFound(path.to_string())));
        let resolver = BridgedFileResolver::new(Some(Arc::new(bridge)));

        let error = resolver.resolve("/gone.png").await.unwrap_err();

        assert!(matches!(error, BackgroundError::RemoteRead { .. }));
    }

    #[tokio::test]
    async fn test_bridged_resolver_without_bridge_rejects_local_paths() {
        let resolver = BridgedFileResolver::new(None);

        let error = resolver.resolve("/home/user/bg.png").await.unwrap_err();

        assert!(matches!(error, BackgroundError::BridgeUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_bridged_resolver_without_bridge_still_accepts_urls() {
        let resolver = BridgedFileResolver::new(None);

        let url = resolver.resolve("https://example.com/a.png").await.unwrap();

        assert_eq!(url.as_str(), "https://example.com/a.png");
    }
}
