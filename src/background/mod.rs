// Main module for background rendering: rule emission, URL resolution,
// settings schema and the styler around the host-owned style element.

pub mod css;
pub mod errors;
pub mod resolver;
pub mod schema;
pub mod service;
pub mod types;

// Re-exports for easier access by consumers of the crate.
pub use self::css::{background_rule, APP_ROOT_SELECTOR, BACKDROP_Z_INDEX};
pub use self::errors::BackgroundError;
pub use self::resolver::{
    is_absolute_url, mime_for_path, resolver_for, BridgedFileResolver, DirectFileResolver,
    UrlResolver, IMAGE_EXTENSIONS,
};
pub use self::schema::{path_exists_validator, settings_schema, PATH_INVALID_MESSAGE};
pub use self::service::BackgroundStyler;
pub use self::types::{
    image_path_key, opacity_key, BackgroundSettings, ResolvedUrl, ACTION_TOGGLE,
    DEFAULT_IMAGE_PATH, DEFAULT_OPACITY, EXTENSION_NAME, SETTING_IMAGE_PATH, SETTING_OPACITY,
};
