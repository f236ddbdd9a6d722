//! Document retrieval by filename.
//!
//! Fetches a stored document and writes it to the download directory as
//! JSON text. Store identifiers are rendered as plain strings.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::SyncError;
use crate::metadata::file_stem;
use crate::store::DocumentStore;

/// Where the document for `filename` is written: `<dir>/<stem>.<extension>`.
pub fn output_path(dir: &Path, filename: &str, extension: &str) -> PathBuf {
    dir.join(format!("{}.{}", file_stem(filename), extension))
}

/// Fetch the document stored for `filename` as JSON text.
pub async fn fetch_document_json(store: &dyn DocumentStore, filename: &str) -> Result<String> {
    let matches = store.count_by_filename(filename).await?;
    if matches > 1 {
        warn!(filename, matches, "several documents share this filename; using the first");
    }

    let doc = store
        .find_by_filename(filename)
        .await?
        .ok_or_else(|| SyncError::DocumentNotFound {
            filename: filename.to_string(),
        })?;

    Ok(serde_json::to_string(&doc)?)
}

/// Fetch `filename` and write it under `output_dir` (or the configured
/// download directory), creating the directory if needed.
pub async fn download_document(
    config: &Config,
    store: &dyn DocumentStore,
    filename: &str,
    output_dir: Option<&Path>,
) -> Result<PathBuf> {
    if filename.is_empty() || filename.contains(['/', '\\']) {
        return Err(SyncError::InvalidFilename {
            filename: filename.to_string(),
        }
        .into());
    }

    let json = fetch_document_json(store, filename).await?;

    let dir = output_dir.unwrap_or(config.download.output_dir.as_path());
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = output_path(dir, filename, &config.download.extension);
    std::fs::write(&path, &json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(filename, path = %path.display(), bytes = json.len(), "downloaded document");
    Ok(path)
}

/// CLI entry point: downloads and prints the written path.
pub async fn run_download(
    config: &Config,
    store: &dyn DocumentStore,
    filename: &str,
    output_dir: Option<&Path>,
) -> Result<()> {
    let path = download_document(config, store, filename, output_dir).await?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Document, Record};
    use crate::store::memory::InMemoryStore;
    use tempfile::TempDir;

    fn doc(name: &str, value: &str) -> Document {
        Document {
            filename: name.to_string(),
            filepath: format!("/sample-data/{}", name),
            data: vec![Record::new(vec![("v".to_string(), value.to_string())])],
            meta_data: None,
            test_meta_data: None,
        }
    }

    #[test]
    fn test_output_path_single_extension() {
        let p = output_path(Path::new("downloadedDataFiles"), "gui-sample-data.dat", "txt");
        assert_eq!(p, PathBuf::from("downloadedDataFiles/gui-sample-data.txt"));
        let p = output_path(Path::new("out"), "run.2020.dat", "json");
        assert_eq!(p, PathBuf::from("out/run.json"));
    }

    #[tokio::test]
    async fn test_download_writes_json() {
        let tmp = TempDir::new().unwrap();
        let store = InMemoryStore::new();
        let id = store.insert_document(&doc("gui.dat", "1")).await.unwrap();

        let config = Config::minimal(tmp.path());
        let out = tmp.path().join("downloads");
        let path = download_document(&config, &store, "gui.dat", Some(&out))
            .await
            .unwrap();

        assert_eq!(path, out.join("gui.txt"));
        let text = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["_id"], id.as_str());
        assert_eq!(v["filename"], "gui.dat");
        assert_eq!(v["data"][0]["v"], "1");
    }

    #[tokio::test]
    async fn test_duplicates_take_first() {
        let store = InMemoryStore::new();
        store.insert_document(&doc("a.dat", "first")).await.unwrap();
        store.insert_document(&doc("a.dat", "second")).await.unwrap();

        let json = fetch_document_json(&store, "a.dat").await.unwrap();
        assert!(json.contains("first"));
        assert!(!json.contains("second"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let tmp = TempDir::new().unwrap();
        let store = InMemoryStore::new();
        let config = Config::minimal(tmp.path());
        let out = tmp.path().join("downloads");
        let err = download_document(&config, &store, "missing.dat", Some(&out))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::DocumentNotFound { .. })
        ));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_filename_with_separator_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = InMemoryStore::new();
        store.insert_document(&doc("sub/run.dat", "1")).await.unwrap();

        let config = Config::minimal(tmp.path());
        let out = tmp.path().join("downloads");
        for name in ["sub/run.dat", "..\\run.dat", ""] {
            let err = download_document(&config, &store, name, Some(&out))
                .await
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<SyncError>(),
                Some(SyncError::InvalidFilename { .. })
            ));
        }
        assert!(!out.exists());
    }
}
