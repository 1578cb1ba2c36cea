//! DataGroomer domain types
//!
//! Shapes of the entities the server hands back once response keys have been
//! normalized to camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Server-assigned data file identity
///
/// Serialized as a bare JSON number. When used as a JSON object key (as in
/// comparison results) it appears as its decimal string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct DataFileId(pub i64);

impl fmt::Display for DataFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for DataFileId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// An uploaded CSV file as stored by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFile {
    /// Server-assigned identity
    pub id: DataFileId,
    /// Original filename of the upload
    pub filename: String,
    /// Opaque reference to the stored file content
    #[serde(default)]
    pub blob_key: Option<String>,
    /// Content type tag, when the server recorded one
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// One discrepant row: its column values, in column order
///
/// Cells are kept as the server sent them. CSV cells normally arrive as
/// strings, but numbers and nulls are accepted too.
pub type DiscrepantRow = Vec<Value>;

/// Discrepancy map produced by the server for one comparison request
///
/// `data file id → (row key → column values)`. Row keys are the row numbers
/// within the respective file, as strings.
pub type Comparison = BTreeMap<DataFileId, BTreeMap<String, DiscrepantRow>>;
