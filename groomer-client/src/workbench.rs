//! Compare workbench
//!
//! Page-level orchestration tying services to stores:
//! - dropping files uploads them and adds the resulting entities to the
//!   data file store
//! - comparing runs a comparison over every stored data file and publishes
//!   the result to the comparison store
//!
//! Failures leave both stores in their prior state. They are logged and
//! returned to the caller; nothing is retried.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{Comparison, DataFile, DataFileId};
use crate::services::{ComparisonService, DataFileService};
use crate::session::{SerialUploader, UploadSession};
use crate::stores::{
    ComparisonAction, ComparisonState, ComparisonStore, DataFileAction, DataFileState,
    DataFileStore,
};
use crate::transport::{ProgressFn, Transport, UploadFile};

/// Holds an in-progress flag set until dropped
///
/// Clears the flag on every exit path, including a compare future that is
/// dropped mid-request.
struct InProgressGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InProgressGuard<'a> {
    /// Set the flag, or return `None` if it is already set
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Upload/compare orchestration over the two application stores
pub struct Workbench {
    uploader: SerialUploader,
    data_file_service: Arc<DataFileService>,
    comparison_service: ComparisonService,
    data_files: Arc<DataFileStore>,
    comparisons: Arc<ComparisonStore>,
    comparison_in_progress: AtomicBool,
}

impl Workbench {
    /// Create a workbench with fresh stores
    pub fn new(transport: Arc<Transport>, initial_session: UploadSession) -> Self {
        let data_file_service = Arc::new(DataFileService::new(Arc::clone(&transport)));
        Self {
            uploader: SerialUploader::new(Arc::clone(&data_file_service), initial_session),
            data_file_service,
            comparison_service: ComparisonService::new(transport),
            data_files: Arc::new(DataFileStore::new()),
            comparisons: Arc::new(ComparisonStore::new()),
            comparison_in_progress: AtomicBool::new(false),
        }
    }

    /// Data file store, for subscribing
    pub fn data_file_store(&self) -> &Arc<DataFileStore> {
        &self.data_files
    }

    /// Comparison store, for subscribing
    pub fn comparison_store(&self) -> &Arc<ComparisonStore> {
        &self.comparisons
    }

    pub fn data_files(&self) -> DataFileState {
        self.data_files.snapshot()
    }

    pub fn comparison(&self) -> ComparisonState {
        self.comparisons.snapshot()
    }

    pub fn is_comparison_in_progress(&self) -> bool {
        self.comparison_in_progress.load(Ordering::Acquire)
    }

    /// Session the next upload will use
    pub async fn upload_session(&self) -> UploadSession {
        self.uploader.current_session().await
    }

    /// Upload dropped files and add the created entities to the store
    pub async fn drop_files(
        &self,
        files: Vec<UploadFile>,
        on_progress: Option<ProgressFn>,
    ) -> Result<Vec<DataFile>> {
        match self.uploader.upload(files, on_progress).await {
            Ok(outcome) => {
                self.data_files
                    .dispatch(DataFileAction::Add(outcome.data_files.clone()));
                Ok(outcome.data_files)
            }
            Err(e) => {
                tracing::error!(error = %e, "Upload failed");
                Err(e)
            }
        }
    }

    /// Load already uploaded data files into the store by id
    pub async fn load_files(&self, ids: &[DataFileId]) -> Result<Vec<DataFile>> {
        let files = self.data_file_service.get(ids).await.map_err(|e| {
            tracing::error!(error = %e, "Fetching data files failed");
            e
        })?;
        self.data_files.dispatch(DataFileAction::Add(files.clone()));
        Ok(files)
    }

    /// Compare every stored data file and publish the result
    pub async fn compare(&self) -> Result<Comparison> {
        let ids = self.data_files.snapshot().ids();
        if ids.is_empty() {
            return Err(Error::NothingToCompare);
        }

        let in_progress = InProgressGuard::acquire(&self.comparison_in_progress)
            .ok_or(Error::ComparisonInProgress)?;
        let result = self.comparison_service.run_comparison_on(&ids).await;
        drop(in_progress);

        match result {
            Ok(comparison) => {
                self.comparisons
                    .dispatch(ComparisonAction::SetResults(comparison.clone()));
                Ok(comparison)
            }
            Err(e) => {
                tracing::error!(error = %e, "Comparison failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_guard_is_exclusive_and_clears_on_drop() {
        let flag = AtomicBool::new(false);

        let guard = InProgressGuard::acquire(&flag).unwrap();
        assert!(flag.load(Ordering::Acquire));
        assert!(InProgressGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InProgressGuard::acquire(&flag).is_some());
    }
}
