//! Storage abstraction for synced documents.
//!
//! The [`DocumentStore`] trait covers everything the upload, download and
//! list commands need from a backend, so the same pipeline runs against a
//! hosted document database, a local SQLite file, or memory.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! | Backend | Module | Use |
//! |---------|--------|-----|
//! | [`InMemoryStore`](memory::InMemoryStore) | [`memory`] | tests |
//! | [`SqliteStore`](sqlite::SqliteStore) | [`sqlite`] | local, offline |
//! | `MongoStore` | `mongo` | hosted (feature `mongo`) |

pub mod memory;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Document, DocumentSummary};

/// Abstract document collection.
///
/// A store instance is bound to one collection. Every document is
/// inserted as new; there is no update path.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`delete_all`](DocumentStore::delete_all) | Empty the collection |
/// | [`insert_document`](DocumentStore::insert_document) | Insert one document |
/// | [`find_by_filename`](DocumentStore::find_by_filename) | First document with a filename |
/// | [`count_by_filename`](DocumentStore::count_by_filename) | Number of documents with a filename |
/// | [`list_documents`](DocumentStore::list_documents) | Summaries of every document |
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for log lines.
    fn backend(&self) -> &'static str;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<()>;

    /// Delete every document in the collection, returning how many were removed.
    async fn delete_all(&self) -> Result<u64>;

    /// Insert a document, returning the store-generated identifier.
    async fn insert_document(&self, doc: &Document) -> Result<String>;

    /// First document (in insertion order) whose `filename` matches.
    ///
    /// The identifier is rendered as a plain string under `_id`.
    async fn find_by_filename(&self, filename: &str) -> Result<Option<serde_json::Value>>;

    async fn count_by_filename(&self, filename: &str) -> Result<u64>;

    /// Summaries of all documents in insertion order.
    async fn list_documents(&self) -> Result<Vec<DocumentSummary>>;

    /// Release the underlying connection.
    async fn close(&self);
}

/// Put `_id` first in a stored JSON body.
pub(crate) fn with_id(id: &str, body: serde_json::Value) -> serde_json::Value {
    let mut out = serde_json::Map::new();
    out.insert("_id".to_string(), serde_json::Value::String(id.to_string()));
    if let serde_json::Value::Object(fields) = body {
        for (k, v) in fields {
            if k != "_id" {
                out.insert(k, v);
            }
        }
    }
    serde_json::Value::Object(out)
}

/// Row count of a stored JSON body's `data` array.
pub(crate) fn row_count(body: &serde_json::Value) -> usize {
    body.get("data")
        .and_then(|d| d.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}
