//! Mock DataGroomer server for integration tests
//!
//! Responses use the server's snake_case keys so every test also exercises
//! key normalization.

use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

/// Shared log of handled requests
#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<String>>>);

impl RequestLog {
    pub fn record(&self, method: &str, path: &str, query: Option<&str>) {
        let entry = match query {
            Some(q) => format!("{} {}?{}", method, path, q),
            None => format!("{} {}", method, path),
        };
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Mock server bound to 127.0.0.1 on an ephemeral port
pub struct MockServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    pub async fn start(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Mock server has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Mock server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Parse repeated `id=` parameters
pub fn ids_from_query(query: Option<&str>) -> Vec<i64> {
    query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.strip_prefix("id="))
        .filter_map(|id| id.parse().ok())
        .collect()
}

/// Number of `file[]` parts in a raw multipart body
pub fn count_file_parts(body: &[u8]) -> usize {
    String::from_utf8_lossy(body)
        .matches("name=\"file[]\"")
        .count()
}

/// Server response for the data file lookup, `<id>.csv` per requested id
pub fn data_files_json(ids: &[i64]) -> Value {
    let files: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "filename": format!("{}.csv", (b'a' + (*id as u8 - 1) % 26) as char),
                "blob_key": format!("blob-{}", id),
                "type": null
            })
        })
        .collect();
    json!({"result": "success", "data": {"data_files": files}})
}

/// Router serving the data file and comparison endpoints
///
/// The comparison reports row `0` of every requested file as discrepant.
pub fn lookup_routes(log: RequestLog) -> Router {
    Router::new()
        .route("/files/data_files/", get(data_files_handler))
        .route("/files/csv/compare", get(compare_handler))
        .with_state(log)
}

/// Router serving only the data file lookup
pub fn data_file_routes(log: RequestLog) -> Router {
    Router::new()
        .route("/files/data_files/", get(data_files_handler))
        .with_state(log)
}

async fn data_files_handler(
    State(log): State<RequestLog>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    log.record("GET", "/files/data_files/", query.as_deref());
    let ids = ids_from_query(query.as_deref());
    (StatusCode::OK, data_files_json(&ids).to_string())
}

async fn compare_handler(
    State(log): State<RequestLog>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    log.record("GET", "/files/csv/compare", query.as_deref());
    let ids = ids_from_query(query.as_deref());

    let mut comparison = serde_json::Map::new();
    for (column, id) in ids.iter().enumerate() {
        comparison.insert(
            id.to_string(),
            json!({"0": [format!("row0-{}", column), "x"]}),
        );
    }
    let body = json!({"result": "success", "data": {"comparison": comparison}});
    (StatusCode::OK, body.to_string())
}
