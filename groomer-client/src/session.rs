//! Upload session handling
//!
//! The server accepts each batch of files at an opaque, single-use upload URL
//! and hands out the URL for the next batch in every upload response. The
//! current URL is an explicit [`UploadSession`] value: uploads take the
//! current session and return the next one.
//!
//! [`SerialUploader`] owns a session for callers that do not want to thread
//! it through themselves. It holds the session lock for the whole upload, so
//! overlapping uploads run one after another and never lose a session URL.

use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::services::data_files::{DataFileService, UploadOutcome};
use crate::transport::{ProgressFn, UploadFile};

/// Opaque server-issued URL the next upload must be sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    url: String,
}

impl UploadSession {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Session to use after an upload response
    ///
    /// Keeps the current URL when the server did not issue a new one.
    pub fn advance(&self, next_url: Option<String>) -> UploadSession {
        match next_url {
            Some(url) if !url.is_empty() => UploadSession::new(url),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for UploadSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Uploader that serializes uploads over one owned session
pub struct SerialUploader {
    service: Arc<DataFileService>,
    session: Mutex<UploadSession>,
}

impl SerialUploader {
    pub fn new(service: Arc<DataFileService>, initial: UploadSession) -> Self {
        Self {
            service,
            session: Mutex::new(initial),
        }
    }

    /// Session the next upload will use
    pub async fn current_session(&self) -> UploadSession {
        self.session.lock().await.clone()
    }

    /// Upload files and resolve the created entities
    ///
    /// The session advances as soon as the upload response is accepted, even
    /// if the follow-up entity fetch then fails (`UploadIncomplete`): the
    /// server has already consumed the old URL. Transport failures and invalid
    /// upload responses leave the session unchanged.
    pub async fn upload(
        &self,
        files: Vec<UploadFile>,
        on_progress: Option<ProgressFn>,
    ) -> Result<UploadOutcome> {
        let mut session = self.session.lock().await;

        let receipt = self.service.upload_batch(&session, files, on_progress).await?;
        if receipt.next_session != *session {
            tracing::debug!(next = %receipt.next_session, "Upload session advanced");
        }
        *session = receipt.next_session.clone();

        self.service.resolve(receipt).await
    }
}
