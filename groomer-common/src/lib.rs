//! # DataGroomer Common Library
//!
//! Shared code for the DataGroomer client crates including:
//! - Error and result types
//! - Configuration loading (TOML bootstrap + environment overrides)
//! - Response key normalization (snake_case → camelCase)
//! - Generic observer store with typed actions

pub mod case;
pub mod config;
pub mod error;
pub mod store;

pub use error::{Error, Result};
pub use store::{Store, StoreState, SubscriptionId};
