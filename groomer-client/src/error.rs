//! Error types for groomer-client
//!
//! Failures are never retried or recovered internally; they propagate to the
//! immediate caller.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::services::data_files::UploadReceipt;
use crate::transport::TransportError;

/// Server endpoint a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Multipart upload to the current session URL
    Upload,
    /// Data file entity lookup
    DataFiles,
    /// CSV comparison
    Comparison,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Endpoint::Upload => "upload",
            Endpoint::DataFiles => "data files",
            Endpoint::Comparison => "comparison",
        };
        f.write_str(name)
    }
}

/// Client error type
#[derive(Debug, Error)]
pub enum Error {
    /// Request could not be completed (network, HTTP status, JSON parse)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response parsed as JSON but does not match the endpoint schema
    #[error("Invalid {endpoint} response: {reason}")]
    InvalidResponse {
        endpoint: Endpoint,
        reason: String,
        /// Normalized response body as received
        raw: Value,
    },

    /// Upload accepted, but fetching the created data files failed
    ///
    /// The receipt holds the created ids and the next session; the session
    /// the upload used has already been consumed by the server.
    #[error("Upload accepted but fetching the created data files failed: {source}")]
    UploadIncomplete {
        receipt: UploadReceipt,
        source: Box<Error>,
    },

    /// Reading a local file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compare requested with no data files loaded
    #[error("No data files to compare")]
    NothingToCompare,

    /// Compare requested while another comparison is running
    #[error("A comparison is already in progress")]
    ComparisonInProgress,

    /// groomer-common error
    #[error("Common error: {0}")]
    Common(#[from] groomer_common::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;
