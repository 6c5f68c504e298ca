//! Top-level shape check for exported records.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Keys every record must carry. Their contents are not inspected.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "metadata",
    "full_transcription",
    "layout_structure",
    "ordinance_summary",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaReport {
    Valid,
    /// The first required key that is absent, in [`REQUIRED_FIELDS`] order.
    Invalid { missing: &'static str },
    NotAnObject,
}

impl SchemaReport {
    pub fn is_valid(&self) -> bool {
        matches!(self, SchemaReport::Valid)
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaReport::Valid => write!(f, "OK"),
            SchemaReport::Invalid { missing } => {
                write!(f, "INVALID - '{missing}' is a required property")
            }
            SchemaReport::NotAnObject => write!(f, "INVALID - record is not of type 'object'"),
        }
    }
}

pub fn check_record(value: &Value) -> SchemaReport {
    let Some(object) = value.as_object() else {
        return SchemaReport::NotAnObject;
    };
    match REQUIRED_FIELDS
        .iter()
        .find(|field| !object.contains_key(**field))
    {
        Some(missing) => SchemaReport::Invalid { missing },
        None => SchemaReport::Valid,
    }
}

/// Reads and checks one record file. Unreadable or malformed JSON is an
/// error, not a report.
pub fn validate_file(path: &Path) -> Result<SchemaReport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    Ok(check_record(&value))
}
