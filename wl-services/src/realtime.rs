//! Realtime service.
//!
//! Connects the session gate to the socket manager and turns socket traffic
//! into application events:
//! - the socket connects when a credential appears and disconnects when it
//!   goes away (the unread counter resets then)
//! - `new_message`, `task_update` and `team_notification` frames get
//!   dedicated handlers
//! - task, project and system notifications arrive on the dispatcher's
//!   broadcast channels; the typed channel drives presentation and list
//!   refresh, the generic one drives the unread counter
//!
//! Only connection exhaustion is shown to the user; other connection errors
//! are logged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use wl_core::constants::frame_types;
use wl_core::error::{WlError, WlResult};
use wl_models::{MessageNotification, NotificationCategory, NotificationEvent};
use wl_socket::{format, ConnectionEvent, ConnectionState, SocketManager};

use crate::event_bus::{AppEvent, EventBus};
use crate::notification::NotificationPresenter;
use crate::service::{Service, ServiceState};
use crate::session::SessionGate;

/// Frame types this service registers handlers for.
const HANDLED_TYPES: [&str; 3] = [
    frame_types::NEW_MESSAGE,
    frame_types::TASK_UPDATE,
    frame_types::TEAM_NOTIFICATION,
];

/// What handlers and listener tasks share.
#[derive(Clone)]
struct Outlets {
    presenter: Arc<NotificationPresenter>,
    bus: EventBus,
    unread: Arc<AtomicU64>,
}

impl Outlets {
    fn bump_unread(&self) {
        let count = self.unread.fetch_add(1, Ordering::SeqCst) + 1;
        self.bus.emit(AppEvent::MessageCountUpdated { count });
    }

    fn reset_unread(&self) {
        self.unread.store(0, Ordering::SeqCst);
        self.bus.emit(AppEvent::MessageCountUpdated { count: 0 });
    }

    fn show(&self, event: NotificationEvent) {
        self.presenter.present(&event);
        self.bus.emit(AppEvent::NotificationReceived { event });
    }

    fn on_new_message(&self, data: &Value) {
        let message: MessageNotification = match serde_json::from_value(data.clone()) {
            Ok(message) => message,
            Err(e) => {
                warn!("ignoring new_message with unexpected payload: {e}");
                return;
            }
        };
        self.bump_unread();
        self.show(format::new_message(&message));
    }

    fn on_task_update(&self, data: &Value) {
        debug!("task update: {data}");
        self.show(format::task_update(data));
        self.bus.emit(AppEvent::TaskListRefresh);
    }

    fn on_team_notification(&self, data: &Value) {
        let event = format::team_notification(data);
        self.presenter.present(&event);
        self.bus.emit(AppEvent::TeamNotification { event });
    }

    fn on_notification(&self, event: NotificationEvent) {
        let refresh = event.category == NotificationCategory::Task;
        self.show(event);
        if refresh {
            self.bus.emit(AppEvent::TaskListRefresh);
        }
    }

    fn on_connection_event(&self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Failed { attempts } => {
                error!("realtime connection gave up after {attempts} attempts");
                self.presenter.show_error(
                    "Realtime connection lost, check your network connection",
                );
                self.bus.emit(AppEvent::ConnectionFailed { attempts });
            }
            ConnectionEvent::Error { message } => warn!("realtime connection error: {message}"),
            other => debug!("realtime connection: {other}"),
        }
    }
}

/// Service wiring the session, socket and presenter together.
pub struct RealtimeService {
    state: ServiceState,
    socket: SocketManager,
    gate: SessionGate,
    outlets: Outlets,
    tasks: Vec<JoinHandle<()>>,
}

impl RealtimeService {
    pub fn new(
        socket: SocketManager,
        gate: SessionGate,
        presenter: Arc<NotificationPresenter>,
        bus: EventBus,
    ) -> Self {
        Self {
            state: ServiceState::Created,
            socket,
            gate,
            outlets: Outlets {
                presenter,
                bus,
                unread: Arc::new(AtomicU64::new(0)),
            },
            tasks: Vec::new(),
        }
    }

    pub fn socket(&self) -> &SocketManager {
        &self.socket
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.socket.state()
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_connected()
    }

    pub fn unread_count(&self) -> u64 {
        self.outlets.unread.load(Ordering::SeqCst)
    }

    pub fn reset_unread_count(&self) {
        self.outlets.reset_unread();
    }

    /// Replace the counter, e.g. with the server's count after a fetch.
    pub fn set_unread_count(&self, count: u64) {
        self.outlets.unread.store(count, Ordering::SeqCst);
        self.outlets.bus.emit(AppEvent::MessageCountUpdated { count });
    }

    /// Send a frame to the server while connected.
    pub fn send(&self, message: &Value) -> WlResult<()> {
        self.socket.send(message)
    }

    /// Connect with the gate's current credential.
    pub async fn connect(&self) {
        let credential = self.gate.credential();
        if credential.is_none() {
            warn!("not logged in, realtime connection skipped");
        }
        self.socket.connect(credential.as_deref()).await;
    }

    pub async fn disconnect(&self) {
        self.socket.disconnect().await;
    }

    fn register_handlers(&self) {
        let dispatcher = self.socket.dispatcher();

        let outlets = self.outlets.clone();
        dispatcher.on(frame_types::NEW_MESSAGE, move |data| outlets.on_new_message(data));

        let outlets = self.outlets.clone();
        dispatcher.on(frame_types::TASK_UPDATE, move |data| outlets.on_task_update(data));

        let outlets = self.outlets.clone();
        dispatcher.on(frame_types::TEAM_NOTIFICATION, move |data| {
            outlets.on_team_notification(data)
        });
    }

    fn spawn_listeners(&mut self) {
        let dispatcher = self.socket.dispatcher();

        let outlets = self.outlets.clone();
        let notifications = dispatcher.subscribe_notifications();
        self.tasks.push(tokio::spawn(listen(notifications, "notifications", move |event| {
            outlets.on_notification(event)
        })));

        let outlets = self.outlets.clone();
        let new_messages = dispatcher.subscribe_new_messages();
        self.tasks.push(tokio::spawn(listen(new_messages, "new messages", move |_| {
            outlets.bump_unread()
        })));

        let outlets = self.outlets.clone();
        let connection = self.socket.subscribe_events();
        self.tasks.push(tokio::spawn(listen(connection, "connection events", move |event| {
            outlets.on_connection_event(event)
        })));

        self.tasks.push(tokio::spawn(forward_state(
            self.socket.state_receiver(),
            self.outlets.bus.clone(),
        )));

        self.tasks.push(tokio::spawn(follow_credential(
            self.gate.subscribe(),
            self.socket.clone(),
            self.outlets.clone(),
        )));
    }
}

impl Service for RealtimeService {
    fn name(&self) -> &str {
        "realtime"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> WlResult<()> {
        if self.state == ServiceState::Running {
            return Ok(());
        }
        if tokio::runtime::Handle::try_current().is_err() {
            self.state = ServiceState::Failed;
            return Err(WlError::Service(
                "realtime service must start inside a tokio runtime".into(),
            ));
        }

        self.register_handlers();
        self.spawn_listeners();
        self.state = ServiceState::Running;
        info!("realtime service started");
        Ok(())
    }

    fn shutdown(&mut self) -> WlResult<()> {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        for frame_type in HANDLED_TYPES {
            self.socket.dispatcher().off(frame_type);
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let socket = self.socket.clone();
            handle.spawn(async move { socket.disconnect().await });
        }

        self.state = ServiceState::Stopped;
        info!("realtime service stopped");
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.state == ServiceState::Running && self.socket.state() != ConnectionState::Closed
    }
}

/// Drain a broadcast channel into `f` until it closes.
async fn listen<T, F>(mut rx: broadcast::Receiver<T>, label: &'static str, f: F)
where
    T: Clone + Send + 'static,
    F: Fn(T) + Send + 'static,
{
    loop {
        match rx.recv().await {
            Ok(item) => f(item),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("realtime {label} listener lagged, {n} event(s) skipped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn forward_state(mut rx: watch::Receiver<ConnectionState>, bus: EventBus) {
    while rx.changed().await.is_ok() {
        let state = *rx.borrow_and_update();
        bus.emit(AppEvent::ConnectionStateChanged { state });
    }
}

/// Connect on none→some, disconnect on some→none, reconnect when the
/// token itself changes.
async fn follow_credential(
    mut rx: watch::Receiver<Option<String>>,
    socket: SocketManager,
    outlets: Outlets,
) {
    let mut current = rx.borrow_and_update().clone();
    if current.is_some() {
        socket.connect(current.as_deref()).await;
    }

    while rx.changed().await.is_ok() {
        let next = rx.borrow_and_update().clone();
        match (&current, &next) {
            (None, Some(_)) => {
                info!("logged in, opening realtime connection");
                socket.connect(next.as_deref()).await;
            }
            (Some(_), None) => {
                info!("logged out, closing realtime connection");
                socket.disconnect().await;
                outlets.reset_unread();
            }
            (Some(old), Some(new)) if old != new => {
                debug!("credential changed, reconnecting");
                socket.disconnect().await;
                socket.connect(Some(new)).await;
            }
            _ => {}
        }
        current = next;
    }
}
