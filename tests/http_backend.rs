use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use code_navigator::backend::{Backend, DirectoryContents, HttpBackend, NodeKind, RetryPolicy};
use code_navigator::config::BackendConfig;
use code_navigator::loader::{self, RegionEvent, Request};
use code_navigator::region::{AsyncRegion, RegionPolicy};
use code_navigator::ErrorCode;

const TOKEN: &str = "session-token";

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn analyze_repo(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        );
    }
    state.bodies.lock().unwrap().push(body.clone());
    if body["repoUrl"] == "https://github.com/acme/missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Repository not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "name": "widgets",
            "url": body["repoUrl"],
            "structure": [
                {"name": "src", "path": "src", "type": "directory", "children": [
                    {"name": "lib.rs", "path": "src/lib.rs", "type": "file"}
                ]},
                {"name": "docs", "path": "docs", "type": "directory", "children": []},
                {"name": "vendor", "path": "vendor", "type": "directory", "children": null},
                {"name": "README.md", "path": "README.md", "type": "file"}
            ]
        })),
    )
}

async fn file_content(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "content": format!("{} @ {}", params["file_path"], params["repo_url"])
    }))
}

async fn explain_code(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    let is_correct = form["code"].contains(':');
    Json(json!({
        "is_correct": is_correct,
        "explanation": format!("context was: {}", form["context"]),
        "corrected_code": if is_correct { Value::Null } else { json!("def f():") }
    }))
}

async fn find_issues(State(state): State<MockState>) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::INTERNAL_SERVER_ERROR, String::new())
}

async fn chat() -> &'static str {
    "this is not json"
}

async fn user_stats() -> Json<Value> {
    Json(json!({"public_repos": 3, "followers": 1, "following": 4}))
}

async fn spawn_mock_server() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/api/analyze/repo", post(analyze_repo))
        .route("/api/repo/file_content", get(file_content))
        .route("/api/explain/code", post(explain_code))
        .route("/api/issues/find", post(find_issues))
        .route("/api/chat", post(chat))
        .route("/api/user/stats", get(user_stats))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{address}"), state)
}

fn backend(base_url: &str, max_retries: u32) -> HttpBackend {
    HttpBackend::new(&BackendConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        max_retries,
        retry_backoff_ms: 10,
    })
    .unwrap()
}

#[tokio::test]
async fn test_analyze_repo_decodes_tri_state_children() {
    let (base_url, state) = spawn_mock_server().await;
    let analysis = backend(&base_url, 0)
        .analyze_repo(TOKEN, "https://github.com/acme/widgets")
        .await
        .unwrap();

    assert_eq!(analysis.name.as_deref(), Some("widgets"));
    let kinds: Vec<_> = analysis.structure.iter().map(|n| &n.kind).collect();
    assert!(matches!(
        kinds[0],
        NodeKind::Directory(DirectoryContents::Populated(children)) if children.len() == 1
    ));
    assert!(matches!(kinds[1], NodeKind::Directory(DirectoryContents::Empty)));
    assert!(matches!(kinds[2], NodeKind::Directory(DirectoryContents::NotExpanded)));
    assert!(matches!(kinds[3], NodeKind::File));

    let bodies = state.bodies.lock().unwrap();
    assert_eq!(bodies[0], json!({"repoUrl": "https://github.com/acme/widgets"}));
}

#[tokio::test]
async fn test_error_detail_becomes_backend_error() {
    let (base_url, _state) = spawn_mock_server().await;
    let err = backend(&base_url, 0)
        .analyze_repo(TOKEN, "https://github.com/acme/missing")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendError);
    assert_eq!(err.message, "Repository not found");
}

#[tokio::test]
async fn test_missing_bearer_is_rejected_by_backend() {
    let (base_url, _state) = spawn_mock_server().await;
    let err = backend(&base_url, 0)
        .analyze_repo("wrong", "https://github.com/acme/widgets")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendError);
    assert_eq!(err.message, "Not authenticated");
}

#[tokio::test]
async fn test_status_without_detail_is_not_retried() {
    let (base_url, state) = spawn_mock_server().await;
    let err = backend(&base_url, 3)
        .find_issues(TOKEN, "rust")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendError);
    assert_eq!(
        err.message,
        "Request failed with status 500: Internal Server Error"
    );
    assert_eq!(state.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_body_is_backend_error() {
    let (base_url, _state) = spawn_mock_server().await;
    let err = backend(&base_url, 2)
        .with_retry(RetryPolicy::none())
        .chat(TOKEN, "hi")
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BackendError);
    assert!(err.message.starts_with("Malformed response from backend"));
}

#[tokio::test]
async fn test_file_content_sends_query_parameters() {
    let (base_url, _state) = spawn_mock_server().await;
    let file = backend(&base_url, 0)
        .file_content(TOKEN, "https://github.com/acme/widgets", "src/lib.rs")
        .await
        .unwrap();

    assert_eq!(file.content, "src/lib.rs @ https://github.com/acme/widgets");
}

#[tokio::test]
async fn test_explain_code_posts_form() {
    let (base_url, _state) = spawn_mock_server().await;
    let analysis = backend(&base_url, 0)
        .explain_code(TOKEN, "def f()", "a tiny function")
        .await
        .unwrap();

    assert!(!analysis.is_correct);
    assert_eq!(analysis.explanation, "context was: a tiny function");
    assert_eq!(analysis.correction(), Some("def f():"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_failure() {
    // 空きポートを確保してすぐ閉じる
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(&format!("http://{address}"), 2)
        .with_retry(RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(5),
        })
        .user_stats(TOKEN)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NetworkFailure);
}

#[tokio::test]
async fn test_dropped_connections_are_retried_up_to_limit() {
    // 接続を受け付けた直後に切断するサーバー
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(stream);
        }
    });

    let err = backend(&format!("http://{address}"), 0)
        .with_retry(RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(5),
        })
        .user_stats(TOKEN)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::NetworkFailure);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_loader_execute_wraps_result_with_token() {
    let (base_url, _state) = spawn_mock_server().await;
    let backend = backend(&base_url, 0);
    let mut region: AsyncRegion<code_navigator::backend::UserStats> =
        AsyncRegion::new("user_stats", RegionPolicy::REPLACE_REJECT);
    let token = region.start().unwrap();

    let event = loader::execute(&backend, TOKEN, Request::UserStats { token }).await;
    let RegionEvent::UserStats { token: t, result } = event else {
        panic!("expected a user stats event");
    };
    assert_eq!(t, token);
    let stats = result.unwrap();
    region.succeed(t, stats).unwrap();
    assert_eq!(region.data().map(|s| s.following), Some(4));
}
