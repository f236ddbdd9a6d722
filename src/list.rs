use anyhow::Result;

use crate::config::Config;
use crate::store::DocumentStore;

pub async fn run_list(config: &Config, store: &dyn DocumentStore) -> Result<()> {
    let docs = store.list_documents().await?;

    println!("{:<32} {:>8}  FILEPATH", "FILENAME", "ROWS");
    for doc in &docs {
        println!("{:<32} {:>8}  {}", doc.filename, doc.rows, doc.filepath);
    }
    println!(
        "{} documents in {} ({})",
        docs.len(),
        config.store.collection,
        store.backend()
    );

    Ok(())
}
