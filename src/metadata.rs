//! Sidecar metadata lookup.
//!
//! Two optional JSON objects can sit next to a data file:
//! a directory-wide `meta-data.json` and a file-specific
//! `<stem>-meta-data.json`, where `<stem>` is the file name up to its
//! first `.`. A missing sidecar is not an error.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::MetadataConfig;
use crate::error::SyncError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sidecars {
    pub directory: Option<Map<String, Value>>,
    pub file: Option<Map<String, Value>>,
}

/// File name up to the first `.`; the whole name when there is none.
pub fn file_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Name of the file-specific sidecar for `file_name`.
pub fn file_sidecar_name(file_name: &str, cfg: &MetadataConfig) -> String {
    format!("{}{}", file_stem(file_name), cfg.file_suffix)
}

pub fn load_sidecars(
    dir: &Path,
    file_name: &str,
    cfg: &MetadataConfig,
) -> Result<Sidecars, SyncError> {
    let directory = load_json_object(&dir.join(&cfg.directory_file))?;
    let file = load_json_object(&dir.join(file_sidecar_name(file_name, cfg)))?;
    Ok(Sidecars { directory, file })
}

/// Load a JSON object from `path`, or `None` if no such file exists.
pub fn load_json_object(path: &Path) -> Result<Option<Map<String, Value>>, SyncError> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
    let value: Value = serde_json::from_str(&content).map_err(|source| SyncError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => {
            debug!(path = %path.display(), keys = map.len(), "loaded sidecar metadata");
            Ok(Some(map))
        }
        _ => Err(SyncError::MetadataNotObject {
            path: path.to_path_buf(),
        }),
    }
}
