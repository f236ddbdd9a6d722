//! SQLite-backed [`DocumentStore`] implementation.
//!
//! Each document is one row in the `documents` table, with its full JSON
//! body in `body_json`. Several collections can share one file; every
//! query is scoped to the collection the store was opened for.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{Document, DocumentSummary};

use super::{row_count, with_id, DocumentStore};

/// SQLite implementation of the [`DocumentStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteStore {
    /// Wrap a pool whose schema has already been migrated.
    pub fn new(pool: SqlitePool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?")
            .bind(&self.collection)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_document(&self, doc: &Document) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let body_json = serde_json::to_string(doc)
            .with_context(|| format!("Failed to serialize document for {}", doc.filename))?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, filename, filepath, body_json, inserted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&self.collection)
        .bind(&doc.filename)
        .bind(&doc.filepath)
        .bind(&body_json)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query(
            "SELECT id, body_json FROM documents
             WHERE collection = ? AND filename = ?
             ORDER BY rowid ASC LIMIT 1",
        )
        .bind(&self.collection)
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let id: String = row.get("id");
        let body_json: String = row.get("body_json");
        let body: serde_json::Value = serde_json::from_str(&body_json)
            .with_context(|| format!("Stored document {} is not valid JSON", id))?;

        Ok(Some(with_id(&id, body)))
    }

    async fn count_by_filename(&self, filename: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE collection = ? AND filename = ?",
        )
        .bind(&self.collection)
        .bind(filename)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let rows = sqlx::query(
            "SELECT id, filename, filepath, body_json FROM documents
             WHERE collection = ? ORDER BY rowid ASC",
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            let body_json: String = row.get("body_json");
            let body: serde_json::Value =
                serde_json::from_str(&body_json).unwrap_or(serde_json::Value::Null);
            summaries.push(DocumentSummary {
                id: row.get("id"),
                filename: row.get("filename"),
                filepath: row.get("filepath"),
                rows: row_count(&body),
            });
        }
        Ok(summaries)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
