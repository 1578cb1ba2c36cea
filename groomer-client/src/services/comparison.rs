//! Data file comparison service
//!
//! Asks the server to compare the CSV content of a set of data files. The
//! comparison itself runs server-side; the client only receives the
//! resulting discrepancy map.

use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

use super::{decode, id_query_url};
use crate::error::{Endpoint, Result};
use crate::models::{Comparison, DataFileId};
use crate::transport::Transport;

/// Endpoint for running a data file comparison
pub const COMPARISON_PATH: &str = "/files/csv/compare";

#[derive(Debug, Deserialize)]
struct ComparisonResponse {
    data: ComparisonData,
}

#[derive(Debug, Deserialize)]
struct ComparisonData {
    comparison: Comparison,
}

/// Comparison service
pub struct ComparisonService {
    transport: Arc<Transport>,
}

impl ComparisonService {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Run a comparison over the given data files
    pub async fn run_comparison_on(&self, ids: &[DataFileId]) -> Result<Comparison> {
        let url = id_query_url(COMPARISON_PATH, ids);
        tracing::debug!(files = ids.len(), "Requesting comparison");

        let response = self.transport.send(&url, Method::GET, None, None).await?;
        let comparison: ComparisonResponse = decode(Endpoint::Comparison, response)?;

        let rows: usize = comparison.data.comparison.values().map(|rows| rows.len()).sum();
        tracing::info!(files = ids.len(), discrepant_rows = rows, "Comparison complete");

        Ok(comparison.data.comparison)
    }
}
