//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast;

use wl_api::ApiClient;
use wl_core::config::{AppConfig, NotificationConfig, StorageConfig};
use wl_models::{Database, KeyValueStore, LocalStore, MemoryStore};
use wl_services::{
    AppEvent, EventBus, NativeShell, NotificationPresenter, RealtimeService, SessionGate,
    StatusLine, StatusMessage, ToastList, WorkArea,
};
use wl_socket::{
    ConnectionState, Dispatcher, HeartbeatConfig, MemoryListener, MemoryTransport,
    ReconnectConfig, ServerEnd, SocketManager,
};

/// Create a temporary on-disk store with migrations applied.
/// Returns the store and the TempDir (must be held alive for the duration of the test).
pub fn create_test_store() -> (LocalStore, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db = Database::init(&dir.path().join("test.db"), &StorageConfig::default())
        .expect("failed to init test database");
    (LocalStore::new(db), dir)
}

/// Create a default test configuration.
pub fn create_test_config() -> AppConfig {
    AppConfig::default()
}

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// Status line that keeps every message.
#[derive(Default)]
pub struct RecordingStatus {
    messages: Mutex<Vec<StatusMessage>>,
}

impl RecordingStatus {
    pub fn texts(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }

    pub fn messages(&self) -> Vec<StatusMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl StatusLine for RecordingStatus {
    fn show(&self, message: &StatusMessage) {
        self.messages.lock().unwrap().push(message.clone());
    }
}

/// Everything the realtime flow needs, wired over an in-memory transport.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub shell: Arc<NativeShell>,
    pub status: Arc<RecordingStatus>,
    pub toasts: Arc<ToastList>,
    pub presenter: Arc<NotificationPresenter>,
    pub bus: EventBus,
    pub events: broadcast::Receiver<AppEvent>,
    pub gate: SessionGate,
    pub transport: Arc<MemoryTransport>,
    pub listener: MemoryListener,
    pub socket: SocketManager,
    pub realtime: RealtimeService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    /// Build on a store that may already hold a session.
    pub async fn with_store(store: Arc<MemoryStore>) -> Self {
        Self::build(store, None).await
    }

    /// Build with a REST client behind the session gate.
    pub async fn with_api(api: ApiClient) -> Self {
        Self::build(Arc::new(MemoryStore::new()), Some(api)).await
    }

    async fn build(store: Arc<MemoryStore>, api: Option<ApiClient>) -> Self {
        let config = create_test_config();
        let shell = Arc::new(NativeShell::new(WorkArea::default()));
        let status = Arc::new(RecordingStatus::default());
        let toasts = Arc::new(ToastList::new(config.notifications.toast_capacity));
        let presenter = Arc::new(NotificationPresenter::new(
            NotificationConfig {
                // Keep OS notifications out of test runs.
                desktop: false,
                ..config.notifications.clone()
            },
            shell.clone(),
            status.clone(),
        ));
        presenter.set_surface(toasts.clone());

        let bus = create_test_event_bus();
        let events = bus.subscribe();
        let gate = SessionGate::new(store.clone(), shell.clone(), api)
            .await
            .expect("failed to build session gate");

        let (transport, listener) = MemoryTransport::new();
        let transport = Arc::new(transport);
        let socket = SocketManager::new(
            "ws://test/api/v1/ws/messages/",
            transport.clone(),
            Dispatcher::new(64),
            ReconnectConfig::from(&config.socket),
            HeartbeatConfig::from(&config.socket),
        );
        let realtime = RealtimeService::new(socket.clone(), gate.clone(), presenter.clone(), bus.clone());

        Self {
            store,
            shell,
            status,
            toasts,
            presenter,
            bus,
            events,
            gate,
            transport,
            listener,
            socket,
            realtime,
        }
    }

    /// Accept the next connection attempt.
    pub async fn accept(&mut self) -> ServerEnd {
        tokio::time::timeout(Duration::from_secs(60), self.listener.accept())
            .await
            .expect("no connection attempt")
            .expect("transport dropped")
    }

    /// Wait until the socket reaches `state`.
    pub async fn wait_for_state(&self, state: ConnectionState) {
        let mut rx = self.socket.state_receiver();
        tokio::time::timeout(Duration::from_secs(60), rx.wait_for(|s| *s == state))
            .await
            .expect("timed out waiting for connection state")
            .expect("socket task stopped");
    }

    /// Next app event matching `pred`, skipping the rest.
    pub async fn next_event(&mut self, pred: impl Fn(&AppEvent) -> bool) -> AppEvent {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(60), self.events.recv())
                .await
                .expect("timed out waiting for app event")
                .expect("event bus closed");
            if pred(&event) {
                return event;
            }
        }
    }

    pub fn persisted_token(&self) -> Option<String> {
        self.store.get("token").unwrap()
    }
}
