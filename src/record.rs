use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

/// One question/answer pair from the input file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    /// Toggle label, always plain text
    pub q: String,
    /// Nested answer, if any
    #[serde(default)]
    pub a: Option<String>,
    /// Whether `a` is inline markdown. `null` counts as false.
    #[serde(default, deserialize_with = "null_as_false")]
    pub m: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Decode a JSON array of records.
pub fn parse_records(json: &str, path: &Path) -> Result<Vec<Record>> {
    serde_json::from_str(json).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and decode the input file.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let json = fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(&json, path)?;
    tracing::debug!(path = %path.display(), count = records.len(), "loaded records");
    Ok(records)
}
