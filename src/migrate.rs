use anyhow::Result;
use sqlx::SqlitePool;

/// Create the local document table. Safe to run repeatedly.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            filename TEXT NOT NULL,
            filepath TEXT NOT NULL,
            body_json TEXT NOT NULL,
            inserted_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection_filename
         ON documents(collection, filename)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
