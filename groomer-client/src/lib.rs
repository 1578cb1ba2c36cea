//! DataGroomer client library
//!
//! Uploads CSV files to a DataGroomer server, asks it to compare them and
//! keeps the results in observer stores:
//!
//! ```text
//! files → DataFileService::upload → Transport (POST, then GET entities)
//!       → DataFileAction::Add → DataFileStore → subscribers
//!
//! compare → ComparisonService::run_comparison_on → Transport (GET)
//!         → ComparisonAction::SetResults → ComparisonStore → subscribers
//! ```

pub mod error;
pub mod models;
pub mod report;
pub mod services;
pub mod session;
pub mod stores;
pub mod transport;
pub mod workbench;

pub use crate::error::{Endpoint, Error, Result};
pub use crate::models::{Comparison, DataFile, DataFileId};
pub use crate::session::{SerialUploader, UploadSession};
pub use crate::transport::{ProgressFn, Transport, TransportError, UploadFile};
pub use crate::workbench::Workbench;
