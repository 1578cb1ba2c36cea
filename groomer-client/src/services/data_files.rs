//! Data file service
//!
//! Uploads batches of CSV files and resolves the data file entities the
//! server creates for them.
//!
//! Endpoints:
//! - `POST <upload session URL>`: multipart body, repeated `file[]` field
//! - `GET /files/data_files/?id=<id>&id=<id>...`: entity lookup

use reqwest::Method;
use serde::Deserialize;
use std::sync::Arc;

use super::{decode, id_query_url};
use crate::error::{Endpoint, Error, Result};
use crate::models::{DataFile, DataFileId};
use crate::session::UploadSession;
use crate::transport::{MultipartBody, ProgressFn, Transport, UploadFile};

/// Endpoint for data file entities
pub const DATA_FILES_PATH: &str = "/files/data_files/";

/// Multipart field name every uploaded file is sent under
pub const UPLOAD_FIELD: &str = "file[]";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    next_blob_upload_url: Option<String>,
    data: UploadData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    data_file_ids: Vec<DataFileId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataFilesResponse {
    data: DataFilesData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataFilesData {
    data_files: Vec<DataFile>,
}

/// Result of the upload request alone, before entities are fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// IDs of the data files the server created, in upload order
    pub data_file_ids: Vec<DataFileId>,
    /// Session for the next upload
    pub next_session: UploadSession,
}

/// Result of a complete upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    /// Entities created by the upload
    pub data_files: Vec<DataFile>,
    /// Session for the next upload
    pub next_session: UploadSession,
}

/// Data file service
pub struct DataFileService {
    transport: Arc<Transport>,
}

impl DataFileService {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Upload files to the session URL and return the created IDs
    ///
    /// Fails with `InvalidResponse` when the response carries no
    /// `data.dataFileIds`.
    pub async fn upload_batch(
        &self,
        session: &UploadSession,
        files: Vec<UploadFile>,
        on_progress: Option<ProgressFn>,
    ) -> Result<UploadReceipt> {
        let file_count = files.len();
        let body = files
            .into_iter()
            .fold(MultipartBody::new(), |body, file| body.file(UPLOAD_FIELD, file));
        let total_bytes = body.total_bytes();

        tracing::debug!(
            session = %session,
            files = file_count,
            bytes = total_bytes,
            "Uploading data files"
        );

        let response = self
            .transport
            .send(session.url(), Method::POST, Some(body), on_progress)
            .await?;

        let upload: UploadResponse = decode(Endpoint::Upload, response)?;

        Ok(UploadReceipt {
            data_file_ids: upload.data.data_file_ids,
            next_session: session.advance(upload.next_blob_upload_url),
        })
    }

    /// Upload files and resolve the created entities
    ///
    /// Any failure fails the whole operation. `session` is only borrowed; the
    /// caller switches to `next_session` from the outcome, or from the receipt
    /// in [`Error::UploadIncomplete`] when only the entity fetch failed.
    pub async fn upload(
        &self,
        session: &UploadSession,
        files: Vec<UploadFile>,
        on_progress: Option<ProgressFn>,
    ) -> Result<UploadOutcome> {
        let receipt = self.upload_batch(session, files, on_progress).await?;
        self.resolve(receipt).await
    }

    /// Fetch the entities created by an accepted upload
    ///
    /// A failed fetch is returned as [`Error::UploadIncomplete`] carrying the
    /// receipt.
    pub async fn resolve(&self, receipt: UploadReceipt) -> Result<UploadOutcome> {
        match self.get(&receipt.data_file_ids).await {
            Ok(data_files) => {
                tracing::info!(count = data_files.len(), "Upload complete");
                Ok(UploadOutcome {
                    data_files,
                    next_session: receipt.next_session,
                })
            }
            Err(e) => Err(Error::UploadIncomplete {
                receipt,
                source: Box::new(e),
            }),
        }
    }

    /// Fetch data file entities by ID
    pub async fn get(&self, ids: &[DataFileId]) -> Result<Vec<DataFile>> {
        let url = id_query_url(DATA_FILES_PATH, ids);
        let response = self.transport.send(&url, Method::GET, None, None).await?;

        let files: DataFilesResponse = decode(Endpoint::DataFiles, response)?;
        Ok(files.data.data_files)
    }

    /// Fetch a single data file entity
    pub async fn get_single(&self, id: DataFileId) -> Result<Option<DataFile>> {
        Ok(self.get(&[id]).await?.into_iter().next())
    }
}
