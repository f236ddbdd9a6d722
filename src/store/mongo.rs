//! MongoDB-backed [`DocumentStore`] implementation.
//!
//! The connection string is read from the environment variable named by
//! `store.uri_env`; it never appears in configuration files.

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document as BsonDocument};
use mongodb::{Client, Collection};

use crate::config::StoreConfig;
use crate::error::SyncError;
use crate::models::{Document, DocumentSummary};

use super::DocumentStore;

pub struct MongoStore {
    client: Client,
    database: String,
    collection: Collection<BsonDocument>,
}

impl MongoStore {
    /// Connect and verify the server answers a ping.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self> {
        let uri = std::env::var(&cfg.uri_env).map_err(|_| {
            SyncError::Connection(format!("environment variable {} is not set", cfg.uri_env))
        })?;

        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| SyncError::Connection(e.to_string()))?;
        let collection = client
            .database(&cfg.database)
            .collection::<BsonDocument>(&cfg.collection);

        let store = Self {
            client,
            database: cfg.database.clone(),
            collection,
        };
        store.ping().await?;
        Ok(store)
    }
}

/// Convert a stored document to JSON with `_id` as a plain hex string.
fn to_json(mut doc: BsonDocument) -> serde_json::Value {
    if let Ok(oid) = doc.get_object_id("_id") {
        doc.insert("_id", oid.to_hex());
    }
    Bson::Document(doc).into_relaxed_extjson()
}

fn id_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| SyncError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = self.collection.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn insert_document(&self, doc: &Document) -> Result<String> {
        let body = bson::to_document(doc)?;
        let result = self.collection.insert_one(body).await?;
        Ok(id_string(&result.inserted_id))
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<serde_json::Value>> {
        let found = self
            .collection
            .find_one(doc! { "filename": filename })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(found.map(to_json))
    }

    async fn count_by_filename(&self, filename: &str) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(doc! { "filename": filename })
            .await?)
    }

    async fn list_documents(&self) -> Result<Vec<DocumentSummary>> {
        let pipeline = vec![
            doc! { "$sort": { "_id": 1 } },
            doc! {
                "$project": {
                    "filename": 1,
                    "filepath": 1,
                    "rows": { "$size": { "$ifNull": ["$data", []] } }
                }
            },
        ];
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut summaries = Vec::new();
        while cursor.advance().await? {
            let d: BsonDocument = cursor.deserialize_current()?;
            summaries.push(DocumentSummary {
                id: d.get("_id").map(id_string).unwrap_or_default(),
                filename: d.get_str("filename").unwrap_or_default().to_string(),
                filepath: d.get_str("filepath").unwrap_or_default().to_string(),
                rows: d.get("rows").and_then(Bson::as_i32).unwrap_or(0) as usize,
            });
        }
        Ok(summaries)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
