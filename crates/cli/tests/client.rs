use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use serde_json::json;

use gateway_cli::client::{Clusters, Resources};
use gateway_cli::{CliError, Connection, Credentials};
use gateway_core::ErrorKind;

struct StubGateway {
    port: u16,
    hits: Arc<AtomicUsize>,
    handle: tokio::task::JoinHandle<()>,
}

impl StubGateway {
    async fn spawn() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/resources/summary", post(summary))
            .route("/clusters/list", post(denied))
            .route("/clusters/labels/add", post(echo_labels))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { port, hits, handle }
    }

    fn connection(&self) -> Connection {
        Connection::new("127.0.0.1", self.port, true).unwrap()
    }
}

impl Drop for StubGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// Echoes what arrived so tests can check headers.
async fn summary(
    State(hits): State<Arc<AtomicUsize>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let budget: u64 = headers
        .get("x-request-timeout-ms")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();

    if auth != "Bearer tok-1" || budget == 0 || budget > 60_000 {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthenticated", "message": "bad session" })),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "organization_id": body["organization_id"],
            "total_clusters": 2,
            "total_nodes": 8,
        })),
    )
}

async fn denied(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, Json<serde_json::Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "permission_denied", "message": "cannot access requested organization_id" })),
    )
}

async fn echo_labels(
    State(hits): State<Arc<AtomicUsize>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "organization_id": body["organization_id"],
        "cluster_id": body["cluster_id"],
        "labels": body["labels"],
    }))
}

fn stored_credentials(dir: &tempfile::TempDir) -> Credentials {
    Credentials::new(dir.path(), "tok-1", "refresh-1").store().unwrap();
    Credentials::empty(dir.path())
}

#[tokio::test]
async fn summary_sends_bearer_token_and_deadline() {
    let srv = StubGateway::spawn().await;
    let dir = tempfile::TempDir::new().unwrap();

    let summary = Resources::new(srv.connection(), stored_credentials(&dir))
        .summary("org-1")
        .await
        .unwrap();

    assert_eq!(summary.organization_id.as_str(), "org-1");
    assert_eq!(summary.total_clusters, 2);
    assert_eq!(summary.total_nodes, 8);
}

#[tokio::test]
async fn gateway_errors_keep_their_kind() {
    let srv = StubGateway::spawn().await;
    let dir = tempfile::TempDir::new().unwrap();

    let err = Clusters::new(srv.connection(), stored_credentials(&dir))
        .list("org-2")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    assert_eq!(err.to_string(), "cannot access requested organization_id");
}

#[tokio::test]
async fn invalid_request_is_rejected_locally() {
    let srv = StubGateway::spawn().await;
    let dir = tempfile::TempDir::new().unwrap();

    let err = Clusters::new(srv.connection(), stored_credentials(&dir))
        .info("org-1", "")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(srv.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_credentials_are_not_found_before_any_request() {
    let srv = StubGateway::spawn().await;
    let dir = tempfile::TempDir::new().unwrap();

    let err = Resources::new(srv.connection(), Credentials::empty(dir.path()))
        .summary("org-1")
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::CredentialsNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(srv.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn labels_are_sent_as_a_map() {
    let srv = StubGateway::spawn().await;
    let dir = tempfile::TempDir::new().unwrap();
    let labels = gateway_cli::cli::parse_labels("env:prod;tier:db").unwrap();

    let cluster = Clusters::new(srv.connection(), stored_credentials(&dir))
        .add_labels("org-1", "C1", labels.clone())
        .await
        .unwrap();

    assert_eq!(cluster.cluster_id.as_str(), "C1");
    assert_eq!(cluster.labels, labels);
    assert_eq!(srv.hits.load(Ordering::SeqCst), 1);
}
