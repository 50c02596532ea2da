//! Settings panel contributions of the background extension.

use std::fs;
use std::sync::Arc;

use serde_json::json;

use crate::background::resolver::IMAGE_EXTENSIONS;
use crate::background::types::{image_path_key, opacity_key, DEFAULT_IMAGE_PATH, DEFAULT_OPACITY};
use crate::ports::context::HostEnvironment;
use crate::ports::settings::{
    FieldControl, SchemaEntry, SettingField, SettingGroup, SettingValidator, ValidationIssue,
};

/// Message shown next to the path field when validation rejects a value.
pub const PATH_INVALID_MESSAGE: &str = "path invalid";

/// Builds the schema entries this extension contributes.
///
/// Native hosts get an existence validator on the path field. Sandboxed
/// hosts cannot probe the filesystem from the settings panel, so they get
/// a file picker limited to image extensions instead.
pub fn settings_schema(environment: HostEnvironment) -> Vec<SchemaEntry> {
    vec![image_path_entry(environment), opacity_entry()]
}

fn image_path_entry(environment: HostEnvironment) -> SchemaEntry {
    let control = if environment.has_direct_file_access() {
        FieldControl::Text
    } else {
        FieldControl::FilePicker {
            extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    };
    let field = SettingField {
        key: image_path_key(),
        title: "Background image".to_string(),
        group: SettingGroup::Appearance,
        control,
        default: json!(DEFAULT_IMAGE_PATH),
    };
    if environment.has_direct_file_access() {
        SchemaEntry::with_validator(field, path_exists_validator())
    } else {
        SchemaEntry::new(field)
    }
}

fn opacity_entry() -> SchemaEntry {
    SchemaEntry::new(SettingField {
        key: opacity_key(),
        title: "Background image opacity".to_string(),
        group: SettingGroup::Appearance,
        control: FieldControl::Range {
            minimum: 0.0,
            maximum: 1.0,
            step: 0.01,
        },
        default: json!(DEFAULT_OPACITY),
    })
}

/// Validator for the path field on hosts with direct filesystem access.
///
/// Accepts the empty string (no background) and paths naming an existing
/// regular file. Everything else is reported as invalid.
pub fn path_exists_validator() -> SettingValidator {
    Arc::new(|key, value| {
        let Some(path) = value.as_str() else {
            return vec![ValidationIssue::new(key.clone(), PATH_INVALID_MESSAGE)];
        };
        let accepted = path.is_empty()
            || fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false);
        if accepted {
            Vec::new()
        } else {
            vec![ValidationIssue::new(key.clone(), PATH_INVALID_MESSAGE)]
        }
    })
}
