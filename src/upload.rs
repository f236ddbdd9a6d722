//! Upload pipeline orchestration.
//!
//! Coordinates one full sync pass: walk → wipe → (parse + sidecars →
//! insert) per file. Every run replaces the whole collection; there is no
//! incremental mode. Each insert is independent, so a failure mid-run
//! leaves whatever was inserted before it.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::metadata;
use crate::models::{DataFile, Document};
use crate::parser::{self, Grammar};
use crate::store::DocumentStore;
use crate::walker;

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Overrides `walk.root`.
    pub root: Option<PathBuf>,
    /// Only the root directory's own files; ORed with `walk.base_only`.
    pub base_only: bool,
    /// Walk and parse, but neither wipe nor insert.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub files_found: usize,
    pub documents_inserted: usize,
    pub rows_parsed: usize,
    pub rows_skipped: usize,
    pub documents_deleted: u64,
}

/// Parse one data file and attach its sidecars.
pub fn build_document(file: &DataFile, label: &str, config: &Config) -> Result<Document> {
    let grammar = Grammar::from(&config.parse);
    let parsed = parser::parse_file(&file.path, &grammar)?;
    if parsed.skipped_rows > 0 {
        warn!(
            file = %file.relative_path,
            skipped = parsed.skipped_rows,
            "rows with the wrong number of values were skipped"
        );
    }

    let sidecars = metadata::load_sidecars(&file.dir, &file.file_name, &config.metadata)?;

    Ok(Document {
        filename: file.file_name.clone(),
        filepath: walker::stored_filepath(label, &file.relative_path),
        data: parsed.rows,
        meta_data: sidecars.directory,
        test_meta_data: sidecars.file,
    })
}

/// Replace the collection's contents with one document per data file.
pub async fn upload_tree(
    config: &Config,
    store: &dyn DocumentStore,
    opts: &UploadOptions,
) -> Result<UploadStats> {
    let root = opts.root.clone().unwrap_or_else(|| config.walk.root.clone());
    let base_only = opts.base_only || config.walk.base_only;

    // Discover before wiping so a bad root never empties the collection.
    let files = walker::discover(&root, &config.walk, base_only)?;
    let label = walker::root_label(&root, &config.walk);
    info!(
        root = %root.display(),
        files = files.len(),
        base_only,
        "discovered data files"
    );

    let mut stats = UploadStats {
        files_found: files.len(),
        ..UploadStats::default()
    };

    if !opts.dry_run {
        stats.documents_deleted = store
            .delete_all()
            .await
            .context("Failed to clear the target collection")?;
        info!(deleted = stats.documents_deleted, "cleared collection");
    }

    for file in &files {
        let doc = build_document(file, &label, config)
            .with_context(|| format!("Failed to prepare {}", file.path.display()))?;
        stats.rows_parsed += doc.data.len();

        if opts.dry_run {
            continue;
        }

        let id = store
            .insert_document(&doc)
            .await
            .with_context(|| format!("Failed to insert {}", doc.filepath))?;
        stats.documents_inserted += 1;
        info!(
            id = %id,
            filepath = %doc.filepath,
            rows = doc.data.len(),
            has_meta = doc.meta_data.is_some(),
            has_file_meta = doc.test_meta_data.is_some(),
            "inserted document"
        );
    }

    Ok(stats)
}

/// CLI entry point: runs [`upload_tree`] and prints a summary to stdout.
pub async fn run_upload(
    config: &Config,
    store: &dyn DocumentStore,
    opts: &UploadOptions,
) -> Result<()> {
    let stats = upload_tree(config, store, opts).await?;

    if opts.dry_run {
        println!("upload {} (dry-run)", config.store.collection);
        println!("  files found: {}", stats.files_found);
        println!("  rows parsed: {}", stats.rows_parsed);
        return Ok(());
    }

    println!("upload {}", config.store.collection);
    println!("  documents deleted: {}", stats.documents_deleted);
    println!("  files found: {}", stats.files_found);
    println!("  documents inserted: {}", stats.documents_inserted);
    println!("  rows parsed: {}", stats.rows_parsed);
    println!("ok");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_document() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("sample-data");
        fs::create_dir_all(root.join("run1")).unwrap();
        fs::write(root.join("run1/gui.dat"), "# c\nt p\n0 4\n1 5\n").unwrap();
        fs::write(root.join("run1/gui-meta-data.json"), r#"{"peep": 5}"#).unwrap();

        let config = Config::minimal(&root);
        let files = walker::discover(&root, &config.walk, false).unwrap();
        let doc = build_document(&files[0], "sample-data", &config).unwrap();

        assert_eq!(doc.filename, "gui.dat");
        assert_eq!(doc.filepath, "/sample-data/run1/gui.dat");
        assert_eq!(doc.data.len(), 2);
        assert!(doc.meta_data.is_none());
        assert_eq!(doc.test_meta_data.unwrap()["peep"], 5);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.dat"), "x\n1\n2\n").unwrap();

        let store = InMemoryStore::new();
        let config = Config::minimal(tmp.path());
        let opts = UploadOptions {
            dry_run: true,
            ..UploadOptions::default()
        };
        let stats = upload_tree(&config, &store, &opts).await.unwrap();

        assert_eq!(stats.files_found, 1);
        assert_eq!(stats.rows_parsed, 2);
        assert_eq!(stats.documents_inserted, 0);
        assert_eq!(store.delete_calls(), 0);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_root_does_not_wipe() {
        let store = InMemoryStore::new();
        let config = Config::minimal("/nonexistent/sample-data");
        let err = upload_tree(&config, &store, &UploadOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert_eq!(store.delete_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_file_stops_run() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.dat"), "x y\n1 2\n").unwrap();
        fs::write(tmp.path().join("b.dat"), "x y\n1\n").unwrap();

        let store = InMemoryStore::new();
        let config = Config::minimal(tmp.path());
        let err = upload_tree(&config, &store, &UploadOptions::default())
            .await
            .unwrap_err();

        let chain = format!("{:#}", err);
        assert!(chain.contains("b.dat"), "{}", chain);
        assert!(chain.contains("expected 2 values, found 1"), "{}", chain);
        // a.dat was committed before the failure
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_root_override_and_config_base_only() {
        let tmp = TempDir::new().unwrap();
        let other = tmp.path().join("other");
        fs::create_dir_all(other.join("nested")).unwrap();
        fs::write(other.join("top.dat"), "x\n1\n").unwrap();
        fs::write(other.join("nested/low.dat"), "x\n1\n").unwrap();

        let store = InMemoryStore::new();
        let mut config = Config::minimal("/nonexistent");
        config.walk.base_only = true;
        let opts = UploadOptions {
            root: Some(other),
            ..UploadOptions::default()
        };
        let stats = upload_tree(&config, &store, &opts).await.unwrap();
        assert_eq!(stats.documents_inserted, 1);
        assert_eq!(store.documents()[0]["filepath"], "/other/top.dat");
    }
}
