//! Application stores
//!
//! Two independent stores, each accepting only its own actions:
//! - [`DataFileStore`]: every data file uploaded during the session
//! - [`ComparisonStore`]: the most recent comparison result

pub mod comparison;
pub mod data_files;

pub use comparison::{ComparisonAction, ComparisonState, ComparisonStore};
pub use data_files::{DataFileAction, DataFileState, DataFileStore};
