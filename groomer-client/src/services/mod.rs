//! Services talking to the DataGroomer server
//!
//! Each service owns the request shapes and response schemas for its
//! endpoints. Responses are decoded into typed schemas; a response that does
//! not match fails with [`Error::InvalidResponse`] carrying the raw body.

pub mod comparison;
pub mod data_files;

pub use comparison::ComparisonService;
pub use data_files::{DataFileService, UploadOutcome, UploadReceipt};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Endpoint, Error, Result};
use crate::models::DataFileId;

/// Build `?id=<id>&id=<id>...` for an endpoint path
pub(crate) fn id_query_url(path: &str, ids: &[DataFileId]) -> String {
    let query = ids
        .iter()
        .map(|id| format!("id={}", id))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}

/// Decode a normalized response into an endpoint schema
pub(crate) fn decode<T: DeserializeOwned>(endpoint: Endpoint, response: Value) -> Result<T> {
    match T::deserialize(&response) {
        Ok(decoded) => Ok(decoded),
        Err(e) => {
            tracing::debug!(endpoint = %endpoint, error = %e, "Response did not match schema");
            Err(Error::InvalidResponse {
                endpoint,
                reason: e.to_string(),
                raw: response,
            })
        }
    }
}
