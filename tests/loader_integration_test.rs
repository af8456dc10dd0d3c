/// Integration test for the data loader over real HTTP
///
/// Runs an axum server on loopback that serves the resource documents and
/// drives the ureq-backed fetcher against it:
/// 1. Per-resource failure isolation (status, timeout, bad JSON, non-2xx)
/// 2. Value shapes preserved
/// 3. Cache-busting query parameter
/// 4. Unreachable endpoint
/// 5. Auto-refresh end to end

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use botdash::loader::{DataLoader, FetchError, LoaderConfig, OverlapPolicy, Poller, Snapshot};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Clone)]
enum MockBody {
    Json(String),
    Status(u16),
    /// non-2xx status with a parseable body
    StatusJson(u16, String),
    Sleep(Duration),
}

struct MockData {
    bodies: HashMap<String, MockBody>,
    fallback: MockBody,
    /// (path, t) of every request
    requests: Mutex<Vec<(String, String)>>,
}

impl MockData {
    fn new(fallback: MockBody) -> Self {
        Self {
            bodies: HashMap::new(),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with(mut self, path: &str, body: MockBody) -> Self {
        self.bodies.insert(path.to_string(), body);
        self
    }

    async fn respond(&self, path: String, query: HashMap<String, String>) -> (StatusCode, String) {
        let stamp = query.get("t").cloned().unwrap_or_default();
        self.requests.lock().unwrap().push((path.clone(), stamp));

        match self.bodies.get(&path).unwrap_or(&self.fallback).clone() {
            MockBody::Json(body) => (StatusCode::OK, body),
            MockBody::Status(code) => (
                StatusCode::from_u16(code).unwrap(),
                "error".to_string(),
            ),
            MockBody::StatusJson(code, body) => (StatusCode::from_u16(code).unwrap(), body),
            MockBody::Sleep(delay) => {
                tokio::time::sleep(delay).await;
                (StatusCode::OK, "{}".to_string())
            }
        }
    }
}

async fn resource(
    State(data): State<Arc<MockData>>,
    Path(file): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    data.respond(file, query).await
}

async fn agent(
    State(data): State<Arc<MockData>>,
    Path(file): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    data.respond(format!("agents/{}", file), query).await
}

/// Helper: serve `data` on an ephemeral loopback port, return the base URL
async fn serve(data: Arc<MockData>) -> String {
    let app = Router::new()
        .route("/data/:file", get(resource))
        .route("/data/agents/:file", get(agent))
        .with_state(data);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/data", addr)
}

fn config(base_url: String) -> LoaderConfig {
    LoaderConfig {
        base_url,
        request_timeout_secs: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_cron_timeout_others_succeed() {
    let data = Arc::new(
        MockData::new(MockBody::Json("{}".to_string()))
            .with("cron.json", MockBody::Sleep(Duration::from_secs(3))),
    );
    let loader = DataLoader::from_config(&config(serve(data).await)).unwrap();

    let snapshot = loader.load_all().await.unwrap();

    assert_eq!(
        serde_json::to_value(snapshot.as_ref()).unwrap(),
        json!({
            "status": {}, "relationship": {}, "sessions": {}, "cron": null,
            "memory": {}, "scores": {}, "suggestions": {}, "capabilities": {},
            "analytics": {}, "tasks": {},
            "agents": {"main": {}, "fast": {}, "learning": {}}
        })
    );
    assert_eq!(snapshot.failures().len(), 1);
    assert!(loader.get("cron").is_none());
}

#[tokio::test]
async fn test_failures_isolated_per_resource() {
    let data = Arc::new(
        MockData::new(MockBody::Json(r#"{"ok":true}"#.to_string()))
            .with("scores.json", MockBody::Status(500))
            .with("memory.json", MockBody::Status(404))
            .with("tasks.json", MockBody::Json("{not json".to_string()))
            .with("agents/fast.json", MockBody::Status(503)),
    );
    let loader = DataLoader::from_config(&config(serve(data).await)).unwrap();

    let snapshot = loader.load_all().await.unwrap();

    for failed in ["scores", "memory", "tasks"] {
        assert!(snapshot.contains(failed));
        assert!(loader.get(failed).is_none(), "{} should be null", failed);
    }
    assert!(loader.get_agent("fast").is_none());
    assert_eq!(loader.get("status"), Some(json!({"ok": true})));
    assert_eq!(loader.get_agent("main"), Some(json!({"ok": true})));
    assert_eq!(snapshot.failures()["scores"], "HTTP 500");
    assert_eq!(snapshot.failures()["agent fast"], "HTTP 503");
    assert!(snapshot.failures()["tasks"].starts_with("invalid JSON"));
    assert_eq!(snapshot.loaded_count(), 13 - 4);
}

#[tokio::test]
async fn test_shapes_round_trip() {
    let data = Arc::new(
        MockData::new(MockBody::Json("null".to_string()))
            .with("status.json", MockBody::Json(r#"{"a":1}"#.to_string()))
            .with("scores.json", MockBody::Json("[1,2,3]".to_string()))
            .with("tasks.json", MockBody::Json(r#""plain-string""#.to_string())),
    );
    let loader = DataLoader::from_config(&config(serve(data).await)).unwrap();
    loader.load_all().await.unwrap();

    assert_eq!(loader.get("status"), Some(json!({"a": 1})));
    assert_eq!(loader.get("scores"), Some(json!([1, 2, 3])));
    assert_eq!(loader.get("tasks"), Some(json!("plain-string")));
}

#[tokio::test]
async fn test_cache_buster_sent_per_cycle() {
    let data = Arc::new(MockData::new(MockBody::Json("{}".to_string())));
    let loader = DataLoader::from_config(&config(serve(data.clone()).await)).unwrap();

    let first = loader.load_all().await.unwrap();
    let second = loader.load_all().await.unwrap();

    let requests = data.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 26);
    let paths: HashSet<&str> = requests.iter().map(|(p, _)| p.as_str()).collect();
    assert!(paths.contains("agents/learning.json"));
    assert!(paths.contains("relationship.json"));

    let stamps: HashSet<&str> = requests.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(stamps.len(), 2);
    assert!(stamps.contains(first.cache_buster().to_string().as_str()));
    assert!(stamps.contains(second.cache_buster().to_string().as_str()));
}

#[tokio::test]
async fn test_unreachable_endpoint_resolves_all_null() {
    // grab a free port, then close it
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let loader = DataLoader::from_config(&config(format!("http://{}/data", addr))).unwrap();
    let snapshot = loader.load_all().await.unwrap();

    assert_eq!(snapshot.loaded_count(), 0);
    assert_eq!(snapshot.total_count(), 13);
    let value = serde_json::to_value(snapshot.as_ref()).unwrap();
    assert_eq!(value["status"], json!(null));
    assert_eq!(value["agents"]["learning"], json!(null));
}

#[tokio::test]
async fn test_single_load_errors() {
    let data = Arc::new(
        MockData::new(MockBody::Json(r#"{"jobs":[]}"#.to_string()))
            .with("scores.json", MockBody::Status(502)),
    );
    let loader = DataLoader::from_config(&config(serve(data).await)).unwrap();

    assert_eq!(loader.load("cron").await.unwrap(), json!({"jobs": []}));
    assert!(loader.load("scores").await.is_err());
    assert!(loader.load_agent("main").await.is_ok());
    assert!(loader.snapshot().is_none());
}

#[tokio::test]
async fn test_non_success_status_with_json_body_is_failure() {
    let data = Arc::new(
        MockData::new(MockBody::Json("{}".to_string()))
            .with("status.json", MockBody::StatusJson(300, r#"{"stale":true}"#.to_string()))
            .with("agents/main.json", MockBody::StatusJson(203, r#"{"ok":1}"#.to_string())),
    );
    let loader = DataLoader::from_config(&config(serve(data).await)).unwrap();

    assert!(matches!(loader.load("status").await, Err(FetchError::Status(300))));
    // 2xx other than 200 still counts as success
    assert_eq!(loader.load_agent("main").await.unwrap(), json!({"ok": 1}));

    let snapshot = loader.load_all().await.unwrap();
    assert!(snapshot.contains("status"));
    assert!(loader.get("status").is_none());
    assert_eq!(snapshot.failures()["status"], "HTTP 300");
}

#[tokio::test]
async fn test_auto_refresh_end_to_end() {
    let data = Arc::new(MockData::new(MockBody::Json(r#"{"online":true}"#.to_string())));
    let loader = Arc::new(DataLoader::from_config(&config(serve(data.clone()).await)).unwrap());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = Poller::new(loader.clone(), Duration::from_millis(300), OverlapPolicy::Skip)
        .start_auto_refresh(move |snapshot: Arc<Snapshot>| {
            let _ = tx.send(snapshot);
        });

    let snapshots = tokio::time::timeout(Duration::from_secs(10), async {
        let mut snapshots = Vec::new();
        while snapshots.len() < 3 {
            snapshots.push(rx.recv().await.unwrap());
        }
        snapshots
    })
    .await
    .expect("three refresh cycles");
    handle.stop().await;

    let stamps: HashSet<u64> = snapshots.iter().map(|s| s.cache_buster()).collect();
    assert_eq!(stamps.len(), 3);
    assert!(snapshots.iter().all(|s| s.loaded_count() == 13));
    assert_eq!(loader.get("status"), Some(json!({"online": true})));
    assert!(data.requests.lock().unwrap().len() >= 3 * 13);
}
