//! Loading tender collections from static JSON documents.
//!
//! The document is either a top-level array of tender objects, or an object
//! wrapping that array under `tenders` or `data`.

use std::{
    collections::HashSet,
    fmt, io,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::domain::TenderRecord;

const WRAPPER_KEYS: &[&str] = &["tenders", "data"];

/// Loads every tender in the JSON file at `path`.
///
/// # Errors
///
/// Fails if the file cannot be read, is not JSON, or does not have a tender
/// array at the top level. Records that do not parse (for example because
/// they lack a `tender_id`) are skipped with a warning when
/// `allow_invalid_records` is `true`; otherwise any such record fails the
/// load.
pub fn load_file(path: &Path, allow_invalid_records: bool) -> Result<Vec<TenderRecord>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let tenders = parse_str(&content, allow_invalid_records)?;
    tracing::info!("Loaded {} tenders from {}", tenders.len(), path.display());
    Ok(tenders)
}

/// Parses a JSON document into tenders.
///
/// # Errors
///
/// See [`load_file`].
pub fn parse_str(content: &str, allow_invalid_records: bool) -> Result<Vec<TenderRecord>, LoadError> {
    let root: Value = serde_json::from_str(content)?;
    let entries = into_entries(root)?;

    let (tenders, invalid): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<TenderRecord>(entry).map_err(|e| InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .partition(Result::is_ok);

    let tenders: Vec<_> = tenders.into_iter().filter_map(Result::ok).collect();
    let invalid: Vec<_> = invalid.into_iter().filter_map(Result::err).collect();

    if !invalid.is_empty() {
        if !allow_invalid_records {
            return Err(LoadError::InvalidRecords(invalid));
        }
        for record in &invalid {
            tracing::warn!("Skipping {record}");
        }
    }

    warn_duplicate_ids(&tenders);

    Ok(tenders)
}

fn into_entries(root: Value) -> Result<Vec<Value>, LoadError> {
    match root {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(entries)) => Some(entries),
                _ => None,
            })
            .ok_or(LoadError::Shape),
        _ => Err(LoadError::Shape),
    }
}

fn warn_duplicate_ids(tenders: &[TenderRecord]) {
    let mut seen = HashSet::with_capacity(tenders.len());
    for tender in tenders {
        if !seen.insert(tender.tender_id.as_str()) {
            tracing::warn!("Duplicate tender_id {}", tender.tender_id);
        }
    }
}

/// A record that could not be parsed as a tender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRecord {
    /// Position of the record in the source array.
    pub index: usize,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for InvalidRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record {}: {}", self.index, self.reason)
    }
}

/// Errors that can occur while loading tenders.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The content is not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON has no tender array where one was expected.
    #[error("expected a JSON array of tenders, or an object with a `tenders` or `data` array")]
    Shape,

    /// Some records were invalid and invalid records are not allowed.
    #[error("{}", InvalidRecordsDisplay(.0))]
    InvalidRecords(Vec<InvalidRecord>),
}

impl fmt::Display for InvalidRecordsDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid tender records: ")?;
        for (i, record) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{record}")?;
        }
        Ok(())
    }
}

struct InvalidRecordsDisplay<'a>(&'a [InvalidRecord]);
