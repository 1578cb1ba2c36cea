//! Data file store

use groomer_common::{Store, StoreState};
use std::collections::BTreeMap;

use crate::models::{DataFile, DataFileId};

/// Actions accepted by the data file store
#[derive(Debug, Clone)]
pub enum DataFileAction {
    /// Add entities, replacing any already stored under the same id
    Add(Vec<DataFile>),
}

/// All known data files keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFileState {
    pub files: BTreeMap<DataFileId, DataFile>,
}

impl DataFileState {
    /// Stored ids in ascending order
    pub fn ids(&self) -> Vec<DataFileId> {
        self.files.keys().copied().collect()
    }

    pub fn get(&self, id: DataFileId) -> Option<&DataFile> {
        self.files.get(&id)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl StoreState for DataFileState {
    type Action = DataFileAction;

    fn reduce(&mut self, action: DataFileAction) {
        match action {
            DataFileAction::Add(files) => {
                for file in files {
                    self.files.insert(file.id, file);
                }
            }
        }
    }
}

pub type DataFileStore = Store<DataFileState>;
