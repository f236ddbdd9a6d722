//! Typed errors for parsing, sidecar loading, and store access.
//!
//! Command modules wrap these in `anyhow` with context; tests match on the
//! variants directly.

use std::path::PathBuf;
use thiserror::Error;

/// A data file that does not follow the header/row grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no header line found")]
    MissingHeader,

    #[error("duplicate column '{column}' in header on line {line}")]
    DuplicateColumn { column: String, line: usize },

    #[error("line {line}: expected {expected} values, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record in {}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("invalid metadata JSON in {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("metadata file {} is not a JSON object", path.display())]
    MetadataNotObject { path: PathBuf },

    #[error("document store connection failed: {0}")]
    Connection(String),

    #[error("no document with filename '{filename}'")]
    DocumentNotFound { filename: String },

    #[error("filename '{filename}' must be a bare file name without path separators")]
    InvalidFilename { filename: String },
}

impl SyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}
