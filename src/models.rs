//! Core data models used throughout the sync pipeline.
//!
//! A data file becomes a list of [`Record`]s, which are wrapped together
//! with the file's location and sidecar metadata into a [`Document`], the
//! unit written to the store.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One data row: column names zipped positionally to cell values.
///
/// Column order follows the header line and is preserved on serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A discovered data file, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFile {
    /// Absolute or root-joined path to the file.
    pub path: PathBuf,
    /// Directory containing the file (where sidecars are looked up).
    pub dir: PathBuf,
    pub file_name: String,
    /// Path of the file relative to the walk root, `/`-separated.
    pub relative_path: String,
    /// Directory depth below the walk root (0 = root itself).
    pub level: usize,
}

/// The unit persisted in the store, one per data file.
///
/// Field names match the stored document layout. Absent sidecar metadata
/// is omitted rather than written as an empty object.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Document {
    pub filename: String,
    pub filepath: String,
    pub data: Vec<Record>,
    #[serde(rename = "metaData", skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Map<String, Value>>,
    #[serde(
        rename = "metaDataSpecificToThisTest",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_meta_data: Option<Map<String, Value>>,
}

/// Lightweight listing entry for a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: String,
    pub filename: String,
    pub filepath: String,
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_record_serializes_in_header_order() {
        let r = record(&[("time", "0.1"), ("pressure", "12"), ("flow", "-3")]);
        let s = serde_json::to_string(&r).unwrap();
        assert_eq!(s, r#"{"time":"0.1","pressure":"12","flow":"-3"}"#);
    }

    #[test]
    fn test_record_lookup() {
        let r = record(&[("a", "1"), ("b", "2")]);
        assert_eq!(r.get("b"), Some("2"));
        assert_eq!(r.get("c"), None);
        assert_eq!(r.len(), 2);
        assert_eq!(r.values().collect::<Vec<_>>(), vec!["1", "2"]);
    }

    #[test]
    fn test_document_omits_absent_metadata() {
        let doc = Document {
            filename: "a.dat".to_string(),
            filepath: "/sample-data/a.dat".to_string(),
            data: vec![record(&[("x", "1")])],
            meta_data: None,
            test_meta_data: None,
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            v,
            json!({
                "filename": "a.dat",
                "filepath": "/sample-data/a.dat",
                "data": [{"x": "1"}]
            })
        );
    }

    #[test]
    fn test_document_field_names() {
        let mut meta = Map::new();
        meta.insert("operator".to_string(), json!("jk"));
        let doc = Document {
            filename: "a.dat".to_string(),
            filepath: "/a.dat".to_string(),
            data: Vec::new(),
            meta_data: Some(meta.clone()),
            test_meta_data: Some(meta),
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["metaData"]["operator"], "jk");
        assert_eq!(v["metaDataSpecificToThisTest"]["operator"], "jk");
    }
}
