//! In-memory [`DocumentStore`] implementation for tests.
//!
//! Documents are kept in insertion order behind a `std::sync::RwLock`.
//! Insert and delete calls are counted so tests can assert how many
//! store operations a run issued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Document, DocumentSummary};

use super::{row_count, with_id, DocumentStore};

struct StoredDoc {
    id: String,
    filename: String,
    body: serde_json::Value,
}

/// In-memory store for testing.
pub struct InMemoryStore {
    docs: RwLock<Vec<StoredDoc>>,
    inserts: AtomicU64,
    deletes: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            inserts: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
        }
    }

    /// Number of `insert_document` calls made so far.
    pub fn insert_calls(&self) -> u64 {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Number of `delete_all` calls made so far.
    pub fn delete_calls(&self) -> u64 {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored bodies in insertion order, without `_id`.
    pub fn documents(&self) -> Vec<serde_json::Value> {
        self.docs
            .read()
            .unwrap()
            .iter()
            .map(|d| d.body.clone())
            .collect()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        let mut docs = self.docs.write().unwrap();
        let removed = docs.len() as u64;
        docs.clear();
        Ok(removed)
    }

    async fn insert_document(&self, doc: &Document) -> Result<String> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let body = serde_json::to_value(doc)?;
        let id = Uuid::new_v4().to_string();
        self.docs.write().unwrap().push(StoredDoc {
            id: id.clone(),
            filename: doc.filename.clone(),
            body,
        });
        Ok(id)
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<serde_json::Value>> {
        let docs = self.docs.read().unwrap();
        Ok(docs
            .iter()
            .find(|d| d.filename == filename)
            .map(|d| with_id(&d.id, d.body.clone())))
    }

    async fn count_by_filename(&self, filename: &str) -> Result<u64> {
        let docs = self.docs.read().unwrap();
        Ok(docs.iter().filter(|d| d.filename == filename).count() as u64)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let docs = self.docs.read().unwrap();
        Ok(docs
            .iter()
            .map(|d| DocumentSummary {
                id: d.id.clone(),
                filename: d.filename.clone(),
                filepath: d
                    .body
                    .get("filepath")
                    .and_then(|p| p.as_str())
                    .unwrap_or_default()
                    .to_string(),
                rows: row_count(&d.body),
            })
            .collect())
    }

    async fn close(&self) {}
}
