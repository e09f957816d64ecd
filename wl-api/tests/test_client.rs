//! ApiClient against a local axum server standing in for the backend.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde_json::json;

use wl_api::ApiClient;
use wl_core::config::ServerConfig;
use wl_core::error::WlError;
use wl_models::models::task::{TaskFilter, TaskStatus};

const TOKEN: &str = "tok-123";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn token(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    if form.get("password").map(String::as_str) == Some("secret") {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": TOKEN,
                "token_type": "bearer",
                "user": {"id": 1, "username": form["username"], "email": "a@x.io", "role": "admin"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
    }
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})));
    }
    (
        StatusCode::OK,
        Json(json!({"id": 1, "username": "alice", "email": "a@x.io", "role": "admin"})),
    )
}

async fn tasks(Query(query): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let status = query.get("status").cloned().unwrap_or_else(|| "pending".into());
    Json(json!({
        "status": "success",
        "data": {
            "items": [{"id": 1, "title": "Write docs", "status": status}],
            "total": 7,
            "page": 1,
            "page_size": 1,
            "total_pages": 7
        },
        "timestamp": "2024-05-01T10:00:00"
    }))
}

async fn task(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 9 {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Task not found"})));
    }
    (StatusCode::OK, Json(json!({"id": id, "title": "Found", "status": "review"})))
}

async fn mark_all_read(Query(query): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let marked = if query.get("message_type").map(String::as_str) == Some("task") { 2 } else { 5 };
    Json(json!({"marked_count": marked}))
}

async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/users/token", post(token))
        .route("/api/v1/users/me", get(me))
        .route("/api/v1/tasks", get(tasks))
        .route("/api/v1/tasks/{id}", get(task))
        .route(
            "/api/v1/teams",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({"detail": "not a member"}))) }),
        )
        .route(
            "/api/v1/projects",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/api/v1/messages/unread-count",
            get(|| async { Json(json!({"unread_count": 4})) }),
        )
        .route("/api/v1/messages/mark-all-read", put(mark_all_read));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    let config = ServerConfig {
        api_base: format!("http://{addr}/api/v1"),
        ..ServerConfig::default()
    };
    ApiClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_login_and_bearer_auth() {
    let client = client_for(spawn_backend().await);

    let resp = client.login("alice", "secret").await.unwrap();
    assert_eq!(resp.access_token, TOKEN);
    assert_eq!(resp.user.unwrap().username, "alice");

    // Not installed automatically.
    assert!(matches!(client.current_user().await, Err(WlError::SessionExpired)));

    client.set_token(Some(resp.access_token)).await;
    let me = client.current_user().await.unwrap();
    assert_eq!(me.username, "alice");
}

#[tokio::test]
async fn test_bad_password_is_not_session_expiry() {
    let client = client_for(spawn_backend().await);
    let err = client.login("alice", "wrong").await.unwrap_err();
    assert!(!err.is_session_expired());
    assert_eq!(err.user_message(), "Incorrect username or password");
}

#[tokio::test]
async fn test_401_clears_token() {
    let client = client_for(spawn_backend().await);
    client.set_token(Some("stale".into())).await;

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(!client.has_token().await);
}

#[tokio::test]
async fn test_enveloped_paged_list_with_filter() {
    let client = client_for(spawn_backend().await);
    let filter = TaskFilter {
        status: Some(TaskStatus::InProgress),
        ..TaskFilter::default()
    };
    let (tasks, total) = client.list_tasks(&filter).await.unwrap();
    assert_eq!(total, 7);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status(), Some(TaskStatus::InProgress));
}

#[tokio::test]
async fn test_error_statuses_map_to_variants() {
    let client = client_for(spawn_backend().await);

    let err = client.get_task(9).await.unwrap_err();
    assert!(matches!(err, WlError::NotFound(ref p) if p == "/tasks/9"));
    assert_eq!(err.user_message(), "Requested resource not found");

    let err = client.list_teams().await.unwrap_err();
    assert_eq!(err.user_message(), "Permission denied");

    let err = client.list_projects(None).await.unwrap_err();
    assert!(matches!(err, WlError::ServerError { status: 500, .. }));
    assert_eq!(err.user_message(), "Server error");

    assert_eq!(client.get_task(3).await.unwrap().status(), Some(TaskStatus::Review));
}

#[tokio::test]
async fn test_message_counters() {
    let client = client_for(spawn_backend().await);
    assert_eq!(client.unread_count().await.unwrap(), 4);
    assert_eq!(client.mark_all_messages_read(Some("task")).await.unwrap(), 2);
    assert_eq!(client.mark_all_messages_read(None).await.unwrap(), 5);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr).unread_count().await.unwrap_err();
    assert_eq!(err.user_message(), "Network error, check your connection");
}
