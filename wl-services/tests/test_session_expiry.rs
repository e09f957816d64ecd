//! Session expiry across the REST client, session gate and socket.
//!
//! A local axum server stands in for the backend; the socket runs over the
//! in-memory transport.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use common::Harness;
use wl_api::ApiClient;
use wl_core::config::ServerConfig;
use wl_core::error::WlError;
use wl_models::models::task::TaskFilter;
use wl_models::KeyValueStore;
use wl_services::{AppEvent, ErrorReporter, Service};
use wl_socket::{ConnectionState, Outbound};

const TOKEN: &str = "tok-abc";

async fn me(headers: HeaderMap) -> impl IntoResponse {
    let ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    if !ok {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})));
    }
    (
        StatusCode::OK,
        Json(json!({"id": 3, "username": "bob", "email": "b@x.io", "role": "member"})),
    )
}

async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/v1/users/token",
            post(|| async {
                Json(json!({
                    "access_token": TOKEN,
                    "token_type": "bearer",
                    "user": {"id": 3, "username": "bob", "email": "b@x.io", "role": "member"}
                }))
            }),
        )
        .route("/api/v1/users/me", get(me))
        .route(
            "/api/v1/tasks",
            get(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"detail": "Could not validate credentials"})),
                )
            }),
        )
        .route(
            "/api/v1/teams",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({"detail": "not a member"}))) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn logged_in() -> (Harness, ApiClient, ErrorReporter) {
    let addr = spawn_backend().await;
    let api = ApiClient::new(&ServerConfig {
        api_base: format!("http://{addr}/api/v1"),
        ..ServerConfig::default()
    })
    .unwrap();
    let mut h = Harness::with_api(api.clone()).await;
    h.realtime.init().unwrap();

    let login = api.login("bob", "pw").await.unwrap();
    h.gate.set_session(&login).await.unwrap();
    let reporter = ErrorReporter::new(h.presenter.clone(), h.gate.clone(), h.bus.clone());
    (h, api, reporter)
}

#[tokio::test]
async fn login_installs_token_everywhere() {
    let (mut h, api, _reporter) = logged_in().await;

    assert_eq!(api.token().await.as_deref(), Some(TOKEN));
    assert_eq!(h.shell.token().as_deref(), Some(TOKEN));
    assert_eq!(h.gate.profile().unwrap().unwrap().username, "bob");
    assert_eq!(api.current_user().await.unwrap().id, 3);

    let server = h.accept().await;
    assert!(server.url.ends_with(&format!("?token={TOKEN}")));
    h.wait_for_state(ConnectionState::Open).await;
}

#[tokio::test]
async fn unauthorized_response_ends_the_session() {
    let (mut h, api, reporter) = logged_in().await;
    let mut server = h.accept().await;
    h.wait_for_state(ConnectionState::Open).await;

    let err = api.list_tasks(&TaskFilter::default()).await.unwrap_err();
    assert!(err.is_session_expired());
    reporter.report(&err).await;

    h.next_event(|e| *e == AppEvent::SessionExpired).await;
    assert!(matches!(
        tokio::time::timeout(Duration::from_secs(5), server.recv()).await.unwrap(),
        Some(Outbound::Close { code: 1000, .. })
    ));
    h.wait_for_state(ConnectionState::Closed).await;

    assert!(!h.gate.has_credential());
    assert!(api.token().await.is_none());
    assert!(h.store.keys().unwrap().is_empty());
    assert_eq!(
        h.status.texts(),
        vec!["Session expired, please log in again".to_string()]
    );

    // A second failing call after expiry stays quiet.
    let again = api.list_tasks(&TaskFilter::default()).await.unwrap_err();
    reporter.report(&again).await;
    assert_eq!(h.status.texts().len(), 1);
}

#[tokio::test]
async fn forbidden_keeps_the_session() {
    let (mut h, api, reporter) = logged_in().await;
    let _server = h.accept().await;
    h.wait_for_state(ConnectionState::Open).await;

    let teams = reporter.check(api.list_teams().await).await;
    assert!(teams.is_none());

    assert!(h.gate.has_credential());
    assert_eq!(h.realtime.connection_state(), ConnectionState::Open);
    assert_eq!(h.status.texts(), vec!["Permission denied".to_string()]);
}

#[tokio::test]
async fn network_failure_is_reported_once() {
    let (h, _api, reporter) = logged_in().await;
    reporter
        .report(&WlError::Http("connection refused".into()))
        .await;
    assert!(h.gate.has_credential());
    assert_eq!(
        h.status.texts(),
        vec!["Network error, check your connection".to_string()]
    );
}
