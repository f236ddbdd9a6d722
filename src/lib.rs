//! # datafile-sync
//!
//! Walks a directory tree of whitespace-delimited data files, turns each
//! file into a document (parsed rows plus optional sidecar metadata), and
//! replaces the contents of a document-store collection with them. A
//! companion command downloads a stored document back to disk.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────────┐
//! │  Walker  │──▶│  Parser  │──▶│ Metadata  │──▶│    Store     │
//! │ (*.dat)  │   │ hdr+rows │   │ sidecars  │   │ Mongo/SQLite │
//! └──────────┘   └──────────┘   └───────────┘   └──────┬───────┘
//!                                                      │
//!                                          ┌───────────┴──┐
//!                                          ▼              ▼
//!                                     ┌──────────┐  ┌──────────┐
//!                                     │ download │  │   list   │
//!                                     └──────────┘  └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export DSYNC_MONGODB_URI='mongodb+srv://...'
//! dsync init                          # create schema / check connection
//! dsync upload                        # wipe the collection and reload it
//! dsync upload --base-only --dry-run  # parse the root directory only
//! dsync download gui-sample-data.dat  # -> downloadedDataFiles/gui-sample-data.txt
//! dsync list
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Records, documents, discovered files |
//! | [`parser`] | Header detection and row parsing |
//! | [`metadata`] | Sidecar metadata lookup |
//! | [`walker`] | Data file discovery |
//! | [`upload`] | Wipe-and-reload pipeline |
//! | [`download`] | Document retrieval to disk |
//! | [`store`] | Document store trait and backends |
//! | [`db`] | SQLite connection and backend selection |

pub mod config;
pub mod db;
pub mod download;
pub mod error;
pub mod list;
pub mod logging;
pub mod metadata;
pub mod migrate;
pub mod models;
pub mod parser;
pub mod store;
pub mod upload;
pub mod walker;
