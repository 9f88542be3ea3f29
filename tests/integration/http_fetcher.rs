//! Integration tests for the HTTP blob fetcher against a local listener

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use frameview::cas::{BlobFetcher, ContentCache, HttpBlobFetcher};
use frameview::error::FetchError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone)]
struct BlobServer {
    blobs: Arc<HashMap<String, String>>,
    hits: Arc<AtomicUsize>,
}

async fn blob_handler(
    State(server): State<BlobServer>,
    Path(hash): Path<String>,
) -> Result<String, StatusCode> {
    server.hits.fetch_add(1, Ordering::SeqCst);
    server.blobs.get(&hash).cloned().ok_or(StatusCode::NOT_FOUND)
}

/// Blob store serving `GET /api/cas/:hash` from `blobs`, 404 otherwise
async fn serve_blobs(blobs: HashMap<String, String>) -> (String, Arc<AtomicUsize>) {
    let server = BlobServer {
        blobs: Arc::new(blobs),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let hits = Arc::clone(&server.hits);
    let app = Router::new()
        .route("/api/cas/:hash", get(blob_handler))
        .with_state(server);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("blob server error: {}", e);
        }
    });

    (format!("http://{}/api/cas", addr), hits)
}

#[tokio::test]
async fn test_fetches_blob_body() {
    let mut blobs = HashMap::new();
    blobs.insert("sha256-aa".to_string(), "hello\nworld".to_string());
    let (base_url, _) = serve_blobs(blobs).await;

    let fetcher = HttpBlobFetcher::new(format!("{}/", base_url)).unwrap();
    assert_eq!(fetcher.base_url(), base_url);
    assert_eq!(fetcher.fetch("sha256-aa").await.unwrap(), "hello\nworld");
}

#[tokio::test]
async fn test_missing_blob_is_not_found() {
    let (base_url, _) = serve_blobs(HashMap::new()).await;
    let fetcher = HttpBlobFetcher::new(base_url).unwrap();

    let err = fetcher.fetch("sha256-missing").await.unwrap_err();
    assert_eq!(err, FetchError::NotFound("sha256-missing".to_string()));
}

#[tokio::test]
async fn test_unreachable_store_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpBlobFetcher::with_timeouts(
        format!("http://{}/api/cas", addr),
        Duration::from_secs(2),
        Duration::from_secs(2),
    )
    .unwrap();

    let err = fetcher.fetch("sha256-aa").await.unwrap_err();
    assert!(
        matches!(err, FetchError::Transport(_) | FetchError::Timeout(_)),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cache_over_http_fetches_once() {
    let mut blobs = HashMap::new();
    blobs.insert("sha256-bb".to_string(), "cached body".to_string());
    let (base_url, hits) = serve_blobs(blobs).await;

    let cache = Arc::new(ContentCache::new(Arc::new(
        HttpBlobFetcher::new(base_url).unwrap(),
    )));

    let results = futures::future::join_all((0..10).map(|_| {
        let cache = Arc::clone(&cache);
        async move { cache.get("sha256-bb").await }
    }))
    .await;

    for result in results {
        assert_eq!(&*result.unwrap(), "cached body");
    }
    assert_eq!(cache.get("sha256-bb").await.unwrap().as_ref(), "cached body");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
