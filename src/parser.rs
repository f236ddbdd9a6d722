//! Whitespace-delimited data file parsing.
//!
//! A data file is a header line followed by value rows:
//!
//! ```text
//! # free-form preamble, skipped
//!   indented notes, skipped
//! time  pressure  flow
//! 0.00  4.1       0.0
//! 0.01  4.3       1.2
//! ```
//!
//! The header is the first line that is non-empty, does not start with the
//! comment prefix, and (when `skip_indented` is set) does not start with
//! whitespace. Every later non-blank, non-comment line is split on
//! whitespace and zipped to the header columns. Values stay strings.

use std::path::Path;

use tracing::{debug, warn};

use crate::config::{MismatchPolicy, ParseConfig};
use crate::error::{ParseError, SyncError};
use crate::models::Record;

/// Line grammar for data files.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub comment_prefix: String,
    pub skip_indented: bool,
    pub on_mismatch: MismatchPolicy,
}

impl Default for Grammar {
    fn default() -> Self {
        Self {
            comment_prefix: "#".to_string(),
            skip_indented: true,
            on_mismatch: MismatchPolicy::Reject,
        }
    }
}

impl From<&ParseConfig> for Grammar {
    fn from(cfg: &ParseConfig) -> Self {
        Self {
            comment_prefix: cfg.comment_prefix.clone(),
            skip_indented: cfg.skip_indented,
            on_mismatch: cfg.on_mismatch,
        }
    }
}

impl Grammar {
    fn is_header(&self, line: &str) -> bool {
        if line.trim().is_empty() || line.starts_with(self.comment_prefix.as_str()) {
            return false;
        }
        !(self.skip_indented && line.starts_with(char::is_whitespace))
    }

    fn is_data(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        !trimmed.is_empty() && !trimmed.starts_with(self.comment_prefix.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFile {
    pub headers: Vec<String>,
    /// 1-based line number of the header.
    pub header_line: usize,
    pub rows: Vec<Record>,
    /// Rows dropped under [`MismatchPolicy::Skip`].
    pub skipped_rows: usize,
}

/// Locate the header: returns its 1-based line number and column names.
pub fn find_header<'a, I>(lines: I, grammar: &Grammar) -> Result<(usize, Vec<String>), ParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    for (idx, line) in lines.into_iter().enumerate() {
        if grammar.is_header(line) {
            let line_no = idx + 1;
            let headers: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            for (i, name) in headers.iter().enumerate() {
                if headers[..i].contains(name) {
                    return Err(ParseError::DuplicateColumn {
                        column: name.clone(),
                        line: line_no,
                    });
                }
            }
            return Ok((line_no, headers));
        }
    }
    Err(ParseError::MissingHeader)
}

/// Parse file contents into records.
pub fn parse_str(content: &str, grammar: &Grammar) -> Result<ParsedFile, ParseError> {
    let lines: Vec<&str> = content.lines().collect();
    let (header_line, headers) = find_header(lines.iter().copied(), grammar)?;

    let mut rows = Vec::new();
    let mut skipped_rows = 0;

    // header_line is 1-based, so it is also the index of the first data line
    for (idx, line) in lines.iter().enumerate().skip(header_line) {
        if !grammar.is_data(line) {
            continue;
        }

        let values: Vec<&str> = line.split_whitespace().collect();
        if values.len() != headers.len() {
            let err = ParseError::ColumnCount {
                line: idx + 1,
                expected: headers.len(),
                found: values.len(),
            };
            match grammar.on_mismatch {
                MismatchPolicy::Reject => return Err(err),
                MismatchPolicy::Skip => {
                    warn!(line = idx + 1, "skipping row: {}", err);
                    skipped_rows += 1;
                    continue;
                }
            }
        }

        let fields = headers
            .iter()
            .cloned()
            .zip(values.into_iter().map(str::to_string))
            .collect();
        rows.push(Record::new(fields));
    }

    Ok(ParsedFile {
        headers,
        header_line,
        rows,
        skipped_rows,
    })
}

/// Read and parse one data file.
pub fn parse_file(path: &Path, grammar: &Grammar) -> Result<ParsedFile, SyncError> {
    let content = std::fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
    let parsed = parse_str(&content, grammar).map_err(|source| SyncError::MalformedRecord {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        columns = parsed.headers.len(),
        rows = parsed.rows.len(),
        "parsed data file"
    );
    Ok(parsed)
}
