//! Test helper modules for DataGroomer client integration tests
//!
//! Provides an in-process mock of the DataGroomer server:
//! - MockServer: bind a router on an ephemeral port
//! - RequestLog: record `METHOD path?query` for every request
//! - Canned handlers for the data file and comparison endpoints

#![allow(dead_code, unused_imports)]

pub mod mock_server;

pub use mock_server::{
    count_file_parts, data_file_routes, data_files_json, ids_from_query, lookup_routes, MockServer,
    RequestLog,
};
