//! Integration tests for the compare workbench
//!
//! Drives uploads and comparisons through the workbench against the mock
//! server and checks what the two stores hold and broadcast.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use groomer_client::stores::{ComparisonState, DataFileState};
use groomer_client::{DataFileId, Error, Transport, UploadFile, UploadSession, Workbench};

use helpers::{data_file_routes, lookup_routes, MockServer, RequestLog};

const UPLOAD_RESPONSE: &str =
    r#"{"result":"success","next_blob_upload_url":"/u2","data":{"data_file_ids":[1,2]}}"#;

fn two_files() -> Vec<UploadFile> {
    vec![
        UploadFile::new("a.csv", "1,alpha\n2,beta\n"),
        UploadFile::new("b.csv", "1,alpha\n2,gamma\n"),
    ]
}

async fn start_server(log: RequestLog) -> MockServer {
    let router = Router::new()
        .route("/u1", post(|| async { UPLOAD_RESPONSE }))
        .route("/u2", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .merge(lookup_routes(log));
    MockServer::start(router).await
}

fn new_workbench(server: &MockServer) -> Workbench {
    let transport = Arc::new(Transport::new(&server.base_url).unwrap());
    Workbench::new(transport, UploadSession::new("/u1"))
}

#[tokio::test]
async fn test_drop_files_populates_data_file_store() {
    let server = start_server(RequestLog::default()).await;
    let workbench = new_workbench(&server);

    let broadcasts = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&broadcasts);
    workbench
        .data_file_store()
        .subscribe(move |state: &DataFileState| sink.lock().unwrap().push(state.ids()));

    let added = workbench.drop_files(two_files(), None).await.unwrap();

    assert_eq!(added.len(), 2);
    assert_eq!(
        *broadcasts.lock().unwrap(),
        vec![vec![DataFileId(1), DataFileId(2)]]
    );
    assert_eq!(workbench.data_files().get(DataFileId(2)).unwrap().filename, "b.csv");
    assert_eq!(workbench.upload_session().await.url(), "/u2");
}

#[tokio::test]
async fn test_failed_upload_leaves_stores_unchanged() {
    let server = start_server(RequestLog::default()).await;
    let workbench = new_workbench(&server);
    workbench.drop_files(two_files(), None).await.unwrap();

    let broadcasts = Arc::new(Mutex::new(0));
    let sink = Arc::clone(&broadcasts);
    workbench
        .data_file_store()
        .subscribe(move |_: &DataFileState| *sink.lock().unwrap() += 1);

    // The second upload goes to /u2, which fails
    let result = workbench.drop_files(two_files(), None).await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert_eq!(*broadcasts.lock().unwrap(), 0);
    assert_eq!(workbench.data_files().len(), 2);
    assert_eq!(workbench.upload_session().await.url(), "/u2");
}

#[tokio::test]
async fn test_compare_publishes_results() {
    let log = RequestLog::default();
    let server = start_server(log.clone()).await;
    let workbench = new_workbench(&server);
    workbench.drop_files(two_files(), None).await.unwrap();

    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    workbench
        .comparison_store()
        .subscribe(move |state: &ComparisonState| sink.lock().unwrap().push(state.clone()));

    let comparison = workbench.compare().await.unwrap();

    assert_eq!(comparison.len(), 2);
    assert_eq!(comparison[&DataFileId(1)]["0"], vec!["row0-0", "x"]);
    assert_eq!(results.lock().unwrap().len(), 1);
    assert_eq!(workbench.comparison().comparison, comparison);
    assert!(!workbench.is_comparison_in_progress());
    assert!(log
        .entries()
        .contains(&"GET /files/csv/compare?id=1&id=2".to_string()));
}

#[tokio::test]
async fn test_load_files_then_compare() {
    let log = RequestLog::default();
    let server = start_server(log.clone()).await;
    let workbench = new_workbench(&server);

    let loaded = workbench.load_files(&[DataFileId(3)]).await.unwrap();
    let comparison = workbench.compare().await.unwrap();

    assert_eq!(loaded[0].filename, "c.csv");
    assert_eq!(workbench.data_files().ids(), vec![DataFileId(3)]);
    assert_eq!(comparison.keys().copied().collect::<Vec<_>>(), vec![DataFileId(3)]);
    assert_eq!(workbench.upload_session().await.url(), "/u1");
    assert_eq!(
        log.entries(),
        vec!["GET /files/data_files/?id=3", "GET /files/csv/compare?id=3"]
    );
}

#[tokio::test]
async fn test_compare_without_files() {
    let server = start_server(RequestLog::default()).await;
    let workbench = new_workbench(&server);

    let result = workbench.compare().await;

    assert!(matches!(result, Err(Error::NothingToCompare)));
}

#[tokio::test]
async fn test_failed_comparison_keeps_previous_results() {
    // First comparison succeeds, every later one fails
    let calls = Arc::new(AtomicUsize::new(0));
    let compare = get(move || {
        let calls = Arc::clone(&calls);
        async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                (StatusCode::OK, r#"{"data":{"comparison":{"1":{"3":["a","b"]}}}}"#)
            } else {
                (StatusCode::BAD_GATEWAY, "")
            }
        }
    });
    let router = Router::new()
        .route("/u1", post(|| async { UPLOAD_RESPONSE }))
        .route("/files/csv/compare", compare)
        .merge(data_file_routes(RequestLog::default()));
    let server = MockServer::start(router).await;
    let workbench = new_workbench(&server);
    workbench.drop_files(two_files(), None).await.unwrap();
    let first = workbench.compare().await.unwrap();

    let result = workbench.compare().await;

    assert!(matches!(result, Err(Error::Transport(_))));
    assert!(!workbench.is_comparison_in_progress());
    assert_eq!(workbench.comparison().comparison, first);
    assert_eq!(first[&DataFileId(1)]["3"], vec!["a", "b"]);
}

async fn slow_compare() -> &'static str {
    tokio::time::sleep(Duration::from_millis(200)).await;
    r#"{"data":{"comparison":{}}}"#
}

async fn start_slow_compare_server() -> MockServer {
    let router = Router::new()
        .route("/files/csv/compare", get(slow_compare))
        .merge(data_file_routes(RequestLog::default()));
    MockServer::start(router).await
}

#[tokio::test]
async fn test_abandoned_comparison_does_not_block_the_next_one() {
    let server = start_slow_compare_server().await;
    let workbench = new_workbench(&server);
    workbench.load_files(&[DataFileId(1)]).await.unwrap();

    let abandoned = tokio::time::timeout(Duration::from_millis(20), workbench.compare()).await;

    assert!(abandoned.is_err());
    assert!(!workbench.is_comparison_in_progress());
    let comparison = workbench.compare().await.unwrap();
    assert!(comparison.is_empty());
}

#[tokio::test]
async fn test_overlapping_compare_is_rejected() {
    let server = start_slow_compare_server().await;
    let workbench = Arc::new(new_workbench(&server));
    workbench.load_files(&[DataFileId(1)]).await.unwrap();

    let running = {
        let workbench = Arc::clone(&workbench);
        tokio::spawn(async move { workbench.compare().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(workbench.is_comparison_in_progress());
    assert!(matches!(
        workbench.compare().await,
        Err(Error::ComparisonInProgress)
    ));

    running.await.unwrap().unwrap();
    assert!(!workbench.is_comparison_in_progress());
}

#[tokio::test]
async fn test_stores_only_react_to_their_own_actions() {
    let server = start_server(RequestLog::default()).await;
    let workbench = new_workbench(&server);

    let file_events = Arc::new(Mutex::new(0));
    let comparison_events = Arc::new(Mutex::new(0));
    {
        let sink = Arc::clone(&file_events);
        workbench
            .data_file_store()
            .subscribe(move |_: &DataFileState| *sink.lock().unwrap() += 1);
        let sink = Arc::clone(&comparison_events);
        workbench
            .comparison_store()
            .subscribe(move |_: &ComparisonState| *sink.lock().unwrap() += 1);
    }

    workbench.drop_files(two_files(), None).await.unwrap();
    assert_eq!(*file_events.lock().unwrap(), 1);
    assert_eq!(*comparison_events.lock().unwrap(), 0);

    workbench.compare().await.unwrap();
    assert_eq!(*file_events.lock().unwrap(), 1);
    assert_eq!(*comparison_events.lock().unwrap(), 1);
}
