//! Comparison result store

use groomer_common::{Store, StoreState};

use crate::models::Comparison;

/// Actions accepted by the comparison store
#[derive(Debug, Clone)]
pub enum ComparisonAction {
    /// Replace the current result wholesale
    SetResults(Comparison),
}

/// Latest comparison result; empty until the first comparison completes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonState {
    pub comparison: Comparison,
}

impl StoreState for ComparisonState {
    type Action = ComparisonAction;

    fn reduce(&mut self, action: ComparisonAction) {
        match action {
            ComparisonAction::SetResults(comparison) => self.comparison = comparison,
        }
    }
}

pub type ComparisonStore = Store<ComparisonState>;
