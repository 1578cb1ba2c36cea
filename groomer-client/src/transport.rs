//! HTTP transport
//!
//! Wraps a single HTTP request to the DataGroomer server. Every successful
//! response body is parsed as JSON and passed through the key normalizer, so
//! callers always see camelCase keys.
//!
//! One call to [`Transport::send`] issues exactly one request. There is no
//! retry, no timeout and no cancellation: once started, a request runs to
//! success or failure.

use futures::StreamExt;
use groomer_common::case::camel_case_keys;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, Url};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

const USER_AGENT: &str = concat!("DataGroomer/", env!("CARGO_PKG_VERSION"));

/// Size of the chunks file content is streamed in
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Upload progress callback, receives `bytes sent / bytes total` in `[0, 1]`
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, bad part metadata, client setup)
    #[error("Invalid request to {url:?}: {reason}")]
    Request { url: String, reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Could not parse response into JSON ({reason}): {body}")]
    Parse { reason: String, body: String },
}

/// A file to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, keeping only its final path component as name
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, content })
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn mime_type(&self) -> &'static str {
        if self.filename.to_ascii_lowercase().ends_with(".csv") {
            "text/csv"
        } else {
            "application/octet-stream"
        }
    }
}

/// Multipart request body made of named file parts
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    parts: Vec<(String, UploadFile)>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file under `field`; repeated field names are allowed
    pub fn file(mut self, field: impl Into<String>, file: UploadFile) -> Self {
        self.parts.push((field.into(), file));
        self
    }

    /// Number of file parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total file content bytes across all parts
    pub fn total_bytes(&self) -> u64 {
        self.parts.iter().map(|(_, file)| file.len() as u64).sum()
    }

    fn into_form(self, progress: Option<Arc<ProgressTracker>>) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();

        for (field, file) in self.parts {
            let length = file.len() as u64;
            let mime = file.mime_type();
            let chunks: Vec<Vec<u8>> = file
                .content
                .chunks(UPLOAD_CHUNK_BYTES)
                .map(<[u8]>::to_vec)
                .collect();

            let tracker = progress.clone();
            let stream = futures::stream::iter(chunks).map(move |chunk| {
                if let Some(tracker) = &tracker {
                    tracker.record(chunk.len() as u64);
                }
                Ok::<Vec<u8>, std::io::Error>(chunk)
            });

            let part = Part::stream_with_length(Body::wrap_stream(stream), length)
                .file_name(file.filename)
                .mime_str(mime)?;
            form = form.part(field, part);
        }

        Ok(form)
    }
}

/// Shared byte counter feeding a [`ProgressFn`]
///
/// Progress counts bytes handed to the HTTP client for sending. Reports only
/// while the request is in flight: the finished flag is checked and the
/// callback invoked under one lock, so once [`finish`] returns the callback
/// is never invoked again.
///
/// [`finish`]: ProgressTracker::finish
struct ProgressTracker {
    callback: ProgressFn,
    total: u64,
    /// `(bytes sent, finished)`
    state: Mutex<(u64, bool)>,
}

impl ProgressTracker {
    fn new(callback: ProgressFn, total: u64) -> Self {
        Self {
            callback,
            total,
            state: Mutex::new((0, false)),
        }
    }

    fn record(&self, bytes: u64) {
        if bytes == 0 || self.total == 0 {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (sent, finished) = &mut *state;
        if *finished {
            return;
        }
        *sent += bytes;
        let fraction = (*sent as f64 / self.total as f64).min(1.0);
        (self.callback)(fraction);
    }

    fn finish(&self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).1 = true;
    }
}

/// HTTP transport bound to one server
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: reqwest::Client,
    base_url: Url,
}

impl Transport {
    /// Create a transport resolving relative URLs against `base_url`
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let parsed = Url::parse(base_url).map_err(|e| TransportError::Request {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TransportError::Request {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path or absolute URL against the base URL
    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(url)
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Send one request and return the normalized JSON body
    ///
    /// `on_progress` only fires for requests with a non-empty body. Any
    /// non-2xx status is a failure regardless of the body.
    pub async fn send(
        &self,
        url: &str,
        method: Method,
        body: Option<MultipartBody>,
        on_progress: Option<ProgressFn>,
    ) -> Result<Value, TransportError> {
        let target = self.resolve(url)?;
        tracing::debug!(method = %method, url = %target, "Sending request");

        let mut request = self.http_client.request(method.clone(), target.clone());

        let mut tracker = None;
        if let Some(body) = body {
            tracker = on_progress.map(|cb| Arc::new(ProgressTracker::new(cb, body.total_bytes())));
            let form = body
                .into_form(tracker.clone())
                .map_err(|e| TransportError::Request {
                    url: target.to_string(),
                    reason: e.to_string(),
                })?;
            request = request.multipart(form);
        }

        let result = request.send().await;
        if let Some(tracker) = &tracker {
            tracker.finish();
        }
        let response = result.map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown status").to_string();
            tracing::debug!(url = %target, status = status.as_u16(), "Request failed");
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        tracing::debug!(method = %method, url = %target, bytes = text.len(), "Response received");
        Self::parse_response(&text)
    }

    /// Parse a response body as JSON and normalize its keys to camelCase
    pub fn parse_response(text: &str) -> Result<Value, TransportError> {
        let value: Value = serde_json::from_str(text).map_err(|e| TransportError::Parse {
            reason: e.to_string(),
            body: text.to_string(),
        })?;
        Ok(camel_case_keys(&value))
    }
}
