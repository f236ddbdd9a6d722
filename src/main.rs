//! # dsync
//!
//! Command-line entry point. Every command opens the configured store
//! once, runs, and closes the store whether or not the command succeeded.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dsync init` | Create the SQLite schema or verify the remote connection |
//! | `dsync upload` | Wipe the collection and upload every data file |
//! | `dsync download <filename>` | Write a stored document to the download directory |
//! | `dsync list` | List stored documents |
//!
//! ## Examples
//!
//! ```bash
//! dsync --config ./config/dsync.toml upload --base-only
//! dsync download gui-sample-data.dat --output-dir /tmp/out
//! RUST_LOG=debug dsync upload --dry-run
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use datafile_sync::upload::UploadOptions;
use datafile_sync::{config, db, download, list, logging, upload};

/// Sync a tree of whitespace-delimited data files into a document store.
#[derive(Parser)]
#[command(
    name = "dsync",
    about = "Sync a tree of whitespace-delimited data files into a document store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// The store connection string is never read from this file; it comes
    /// from the environment variable named by `store.uri_env`.
    #[arg(long, global = true, default_value = "./config/dsync.toml")]
    config: PathBuf,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the local schema or check the remote connection.
    Init,

    /// Delete every document in the collection, then upload one document
    /// per data file found under the root.
    Upload {
        /// Data root; overrides `walk.root`.
        #[arg(long)]
        root: Option<PathBuf>,

        /// Do not descend into subdirectories.
        #[arg(long)]
        base_only: bool,

        /// Walk and parse only; the collection is left untouched.
        #[arg(long)]
        dry_run: bool,
    },

    /// Download a stored document by filename.
    Download {
        /// Filename as uploaded (e.g. `gui-sample-data.dat`).
        filename: String,

        /// Output directory; overrides `download.output_dir`.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// List stored documents.
    List,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.quiet)?;

    let cfg = config::load_config(&cli.config)?;
    let store = db::open_store(&cfg).await?;

    let result = match cli.command {
        Commands::Init => store.ping().await.map(|_| {
            println!("Store ready ({}).", store.backend());
        }),
        Commands::Upload {
            root,
            base_only,
            dry_run,
        } => {
            let opts = UploadOptions {
                root,
                base_only,
                dry_run,
            };
            upload::run_upload(&cfg, store.as_ref(), &opts).await
        }
        Commands::Download {
            filename,
            output_dir,
        } => {
            download::run_download(&cfg, store.as_ref(), &filename, output_dir.as_deref()).await
        }
        Commands::List => list::run_list(&cfg, store.as_ref()).await,
    };

    store.close().await;
    result
}
