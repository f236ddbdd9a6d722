use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::config::{Backend, Config};
use crate::migrate;
use crate::store::sqlite::SqliteStore;
use crate::store::DocumentStore;

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.store.path;

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    // One caller, one connection.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Open the configured backend, bound to the configured collection.
///
/// The caller owns the returned store and must `close()` it when done.
pub async fn open_store(config: &Config) -> Result<Box<dyn DocumentStore>> {
    let store: Box<dyn DocumentStore> = match config.store.backend {
        Backend::Sqlite => {
            let pool = connect(config).await?;
            migrate::run_migrations(&pool).await?;
            Box::new(SqliteStore::new(pool, config.store.collection.clone()))
        }
        #[cfg(feature = "mongo")]
        Backend::Mongodb => {
            Box::new(crate::store::mongo::MongoStore::connect(&config.store).await?)
        }
        #[cfg(not(feature = "mongo"))]
        Backend::Mongodb => anyhow::bail!(
            "store.backend = 'mongodb' requires building with the 'mongo' feature"
        ),
    };

    info!(
        backend = store.backend(),
        collection = %config.store.collection,
        "opened document store"
    );
    Ok(store)
}
