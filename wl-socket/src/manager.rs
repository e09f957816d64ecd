//! Socket connection manager.
//!
//! One background task owns the connection state and the retry budget.
//! Commands, transport events and timers are handled one at a time, so
//! state changes never interleave. The manager handle only sends commands
//! and reads the published state.
//!
//! Lifecycle:
//! - `connect(token)` opens `<endpoint>?token=<token>`.
//! - An abnormal close (or a failed open) schedules a reconnect after
//!   `base_delay * attempts`: 3s, 6s, 9s, ... Once `attempts` reaches
//!   `max_attempts` the manager gives up, moves to `Closed` and reports
//!   `Failed` once.
//! - A successful open resets `attempts` to 0 and starts the heartbeat.
//! - A close with code 1000 and `disconnect()` are terminal.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use wl_core::config::{AppConfig, SocketConfig};
use wl_core::constants::{CLOSE_ABNORMAL, CLOSE_NORMAL};
use wl_core::error::{WlError, WlResult};

use crate::dispatcher::Dispatcher;
use crate::events::{ConnectionEvent, ConnectionState};
use crate::frame::heartbeat_frame;
use crate::transport::{Link, Outbound, Transport, TransportEvent, WsTransport};

const EVENT_CAPACITY: usize = 64;

/// Configuration for socket reconnection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay unit; the Nth reconnect waits `base_delay * N`.
    pub base_delay: Duration,
    /// Attempts after which reconnection is abandoned.
    pub max_attempts: u32,
}

impl ReconnectConfig {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::from(&SocketConfig::default())
    }
}

impl From<&SocketConfig> for ReconnectConfig {
    fn from(config: &SocketConfig) -> Self {
        Self {
            base_delay: config.reconnect_base_delay(),
            max_attempts: config.max_reconnect_attempts,
        }
    }
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self::from(&SocketConfig::default())
    }
}

impl From<&SocketConfig> for HeartbeatConfig {
    fn from(config: &SocketConfig) -> Self {
        Self {
            interval: config.heartbeat_interval(),
        }
    }
}

enum Command {
    Connect {
        token: String,
        done: oneshot::Sender<()>,
    },
    Disconnect {
        done: oneshot::Sender<()>,
    },
    Send(String),
}

/// Handle to the socket connection.
///
/// Cloning is cheap. The background task stops once every handle is dropped.
#[derive(Clone)]
pub struct SocketManager {
    endpoint: String,
    commands: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<ConnectionEvent>,
    dispatcher: Dispatcher,
}

impl SocketManager {
    /// Create the manager and spawn its task. Must be called inside a tokio runtime.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn Transport>,
        dispatcher: Dispatcher,
        reconnect: ReconnectConfig,
        heartbeat: HeartbeatConfig,
    ) -> Self {
        let endpoint = endpoint.into();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let controller = Controller {
            endpoint: endpoint.clone(),
            transport,
            dispatcher: dispatcher.clone(),
            reconnect,
            heartbeat,
            state_tx,
            events: events.clone(),
            token: None,
            attempts: 0,
            link: None,
            opening: None,
            retry_at: None,
            heartbeat_timer: None,
        };
        tokio::spawn(controller.run(command_rx));

        Self {
            endpoint,
            commands,
            state_rx,
            events,
            dispatcher,
        }
    }

    /// WebSocket manager for the configured server.
    pub fn from_config(config: &AppConfig, dispatcher: Dispatcher) -> Self {
        Self::new(
            config.server.messages_socket_url(),
            Arc::new(WsTransport::default()),
            dispatcher,
            ReconnectConfig::from(&config.socket),
            HeartbeatConfig::from(&config.socket),
        )
    }

    /// Endpoint without the credential.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open the connection with `credential`.
    ///
    /// Without a credential nothing is attempted. Ignored while already
    /// open or connecting. Resolves once the command has been applied.
    pub async fn connect(&self, credential: Option<&str>) {
        let Some(token) = credential.filter(|t| !t.is_empty()) else {
            error!("no credential available, socket connect skipped");
            return;
        };
        let (done, applied) = oneshot::channel();
        let command = Command::Connect {
            token: token.to_string(),
            done,
        };
        if self.commands.send(command).is_err() {
            warn!("socket task has stopped");
            return;
        }
        let _ = applied.await;
    }

    /// Close with code 1000 and cancel any pending reconnect and heartbeat.
    pub async fn disconnect(&self) {
        let (done, applied) = oneshot::channel();
        if self.commands.send(Command::Disconnect { done }).is_err() {
            return;
        }
        let _ = applied.await;
    }

    /// Serialize and send `message` if the connection is open; otherwise it
    /// is dropped with a warning. Never queued.
    pub fn send<T: Serialize + ?Sized>(&self, message: &T) -> WlResult<()> {
        let text = serde_json::to_string(message)?;
        self.commands
            .send(Command::Send(text))
            .map_err(|_| WlError::Socket("socket task has stopped".into()))
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Subscribe to connection state changes.
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Subscribe to connection lifecycle events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Socket endpoint with the credential appended as `token`.
fn socket_url(endpoint: &str, token: &str) -> WlResult<String> {
    let mut url = reqwest::Url::parse(endpoint)
        .map_err(|e| WlError::Config(format!("invalid socket endpoint '{endpoint}': {e}")))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.to_string())
}

enum Step {
    Command(Command),
    Shutdown,
    Opened(WlResult<Link>),
    Inbound(Option<TransportEvent>),
    RetryDue,
    Heartbeat,
}

struct Controller {
    endpoint: String,
    transport: Arc<dyn Transport>,
    dispatcher: Dispatcher,
    reconnect: ReconnectConfig,
    heartbeat: HeartbeatConfig,
    state_tx: watch::Sender<ConnectionState>,
    events: broadcast::Sender<ConnectionEvent>,
    token: Option<String>,
    attempts: u32,
    link: Option<Link>,
    opening: Option<BoxFuture<'static, WlResult<Link>>>,
    retry_at: Option<Instant>,
    heartbeat_timer: Option<Interval>,
}

impl Controller {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            let step = tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => Step::Command(command),
                    None => Step::Shutdown,
                },
                result = pending_open(&mut self.opening) => Step::Opened(result),
                event = next_inbound(&mut self.link) => Step::Inbound(event),
                _ = retry_due(self.retry_at) => Step::RetryDue,
                _ = next_tick(&mut self.heartbeat_timer) => Step::Heartbeat,
            };

            match step {
                Step::Command(Command::Connect { token, done }) => {
                    self.handle_connect(token);
                    let _ = done.send(());
                }
                Step::Command(Command::Disconnect { done }) => {
                    self.handle_disconnect();
                    let _ = done.send(());
                }
                Step::Command(Command::Send(text)) => self.handle_send(text),
                Step::Shutdown => {
                    self.handle_disconnect();
                    break;
                }
                Step::Opened(result) => self.handle_opened(result),
                Step::Inbound(Some(TransportEvent::Message(text))) => {
                    self.dispatcher.dispatch(&text);
                }
                Step::Inbound(Some(TransportEvent::Error(message))) => {
                    warn!("socket error: {message}");
                    self.emit(ConnectionEvent::Error { message });
                }
                Step::Inbound(Some(TransportEvent::Closed { code, reason })) => {
                    self.handle_closed(code, &reason);
                }
                Step::Inbound(None) => self.handle_closed(CLOSE_ABNORMAL, "connection lost"),
                Step::RetryDue => self.handle_retry_due(),
                Step::Heartbeat => self.handle_heartbeat(),
            }
        }
        debug!("socket task stopped");
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, next: ConnectionState) {
        self.state_tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            info!("socket state: {state} -> {next}");
            *state = next;
            true
        });
    }

    fn emit(&self, event: ConnectionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn handle_connect(&mut self, token: String) {
        let state = self.state();
        if state.is_active() {
            debug!("socket already {state}, connect ignored");
            return;
        }
        self.token = Some(token);
        self.attempts = 0;
        self.start_open();
    }

    fn start_open(&mut self) {
        let Some(token) = self.token.as_deref() else {
            error!("no credential available, socket connect skipped");
            self.set_state(ConnectionState::Closed);
            return;
        };
        let url = match socket_url(&self.endpoint, token) {
            Ok(url) => url,
            Err(e) => {
                error!("{e}");
                self.emit(ConnectionEvent::Error {
                    message: e.to_string(),
                });
                self.set_state(ConnectionState::Closed);
                return;
            }
        };

        info!("socket connecting to {}", self.endpoint);
        self.set_state(ConnectionState::Connecting);
        self.retry_at = None;
        let transport = Arc::clone(&self.transport);
        self.opening = Some(async move { transport.open(&url).await }.boxed());
    }

    fn handle_opened(&mut self, result: WlResult<Link>) {
        self.opening = None;
        match result {
            Ok(link) => {
                self.link = Some(link);
                self.attempts = 0;
                self.set_state(ConnectionState::Open);
                self.emit(ConnectionEvent::Connected);

                let period = self.heartbeat.interval;
                let mut timer = interval_at(Instant::now() + period, period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.heartbeat_timer = Some(timer);
            }
            Err(e) => {
                warn!("socket open failed: {e}");
                self.emit(ConnectionEvent::Error {
                    message: e.to_string(),
                });
                self.schedule_retry();
            }
        }
    }

    fn handle_closed(&mut self, code: u16, reason: &str) {
        self.link = None;
        self.heartbeat_timer = None;
        self.emit(ConnectionEvent::Disconnected { code });

        if code == CLOSE_NORMAL {
            info!("socket closed normally");
            self.set_state(ConnectionState::Closed);
            return;
        }
        warn!("socket closed abnormally (code {code}) {reason}");
        self.schedule_retry();
    }

    fn schedule_retry(&mut self) {
        self.attempts += 1;
        if self.attempts >= self.reconnect.max_attempts {
            error!(
                "giving up on socket after {} attempt(s)",
                self.attempts
            );
            self.retry_at = None;
            self.set_state(ConnectionState::Closed);
            self.emit(ConnectionEvent::Failed {
                attempts: self.attempts,
            });
            return;
        }

        let delay = self.reconnect.delay_for(self.attempts);
        info!(
            "socket reconnect #{} in {:.1}s",
            self.attempts,
            delay.as_secs_f64()
        );
        self.set_state(ConnectionState::Connecting);
        self.retry_at = Some(Instant::now() + delay);
        self.emit(ConnectionEvent::Reconnecting {
            attempt: self.attempts,
            delay,
        });
    }

    fn handle_retry_due(&mut self) {
        self.retry_at = None;
        let state = self.state();
        if state != ConnectionState::Connecting {
            debug!("reconnect timer fired while {state}, ignored");
            return;
        }
        self.start_open();
    }

    fn handle_heartbeat(&mut self) {
        if !self.state().is_open() {
            self.heartbeat_timer = None;
            return;
        }
        let frame = heartbeat_frame(chrono::Utc::now().timestamp_millis());
        self.write(frame.to_string());
    }

    fn handle_send(&mut self, text: String) {
        let state = self.state();
        if !state.is_open() {
            warn!("socket is {state}, outbound frame dropped");
            return;
        }
        self.write(text);
    }

    fn write(&mut self, text: String) {
        let Some(link) = &self.link else {
            return;
        };
        if link.outbound.send(Outbound::Text(text)).is_err() {
            warn!("socket writer is gone, outbound frame dropped");
        }
    }

    fn handle_disconnect(&mut self) {
        self.retry_at = None;
        self.opening = None;
        self.heartbeat_timer = None;
        self.token = None;

        let was = self.state();
        if let Some(link) = self.link.take() {
            self.set_state(ConnectionState::Closing);
            let _ = link.outbound.send(Outbound::Close {
                code: CLOSE_NORMAL,
                reason: "client disconnect".into(),
            });
        }
        if was != ConnectionState::Idle {
            self.set_state(ConnectionState::Closed);
        }
        if was == ConnectionState::Open {
            self.emit(ConnectionEvent::Disconnected { code: CLOSE_NORMAL });
        }
    }
}

async fn pending_open(opening: &mut Option<BoxFuture<'static, WlResult<Link>>>) -> WlResult<Link> {
    match opening.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}

async fn next_inbound(link: &mut Option<Link>) -> Option<TransportEvent> {
    match link.as_mut() {
        Some(link) => link.inbound.recv().await,
        None => std::future::pending().await,
    }
}

async fn retry_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_tick(timer: &mut Option<Interval>) {
    match timer.as_mut() {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryListener, MemoryTransport, ServerEnd};
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use wl_models::NotificationCategory;

    const ENDPOINT: &str = "ws://localhost:8000/api/v1/ws/messages/";

    fn setup() -> (SocketManager, Arc<MemoryTransport>, MemoryListener) {
        let (transport, listener) = MemoryTransport::new();
        let transport = Arc::new(transport);
        let manager = SocketManager::new(
            ENDPOINT,
            transport.clone(),
            Dispatcher::new(16),
            ReconnectConfig::default(),
            HeartbeatConfig::default(),
        );
        (manager, transport, listener)
    }

    async fn open(manager: &SocketManager, listener: &mut MemoryListener) -> ServerEnd {
        manager.connect(Some("secret")).await;
        listener.accept().await.unwrap()
    }

    /// Next event that is not a transport error.
    async fn next_event(events: &mut broadcast::Receiver<ConnectionEvent>) -> ConnectionEvent {
        loop {
            match events.recv().await.unwrap() {
                ConnectionEvent::Error { .. } => continue,
                event => return event,
            }
        }
    }

    #[test]
    fn test_linear_backoff() {
        let config = ReconnectConfig::default();
        let delays: Vec<u64> = (1..=4).map(|n| config.delay_for(n).as_secs()).collect();
        assert_eq!(delays, vec![3, 6, 9, 12]);
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_socket_url_carries_token() {
        assert_eq!(
            socket_url(ENDPOINT, "abc").unwrap(),
            "ws://localhost:8000/api/v1/ws/messages/?token=abc"
        );
        assert!(socket_url(ENDPOINT, "a b&c").unwrap().ends_with("?token=a+b%26c"));
        assert!(socket_url("not a url", "abc").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_opens_with_token() {
        let (manager, _transport, mut listener) = setup();
        let mut events = manager.subscribe_events();
        assert_eq!(manager.state(), ConnectionState::Idle);

        let server = open(&manager, &mut listener).await;
        assert_eq!(server.url, format!("{ENDPOINT}?token=secret"));
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
        assert!(manager.is_connected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credential_skips_connect() {
        let (manager, transport, _listener) = setup();
        manager.connect(None).await;
        manager.connect(Some("")).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.open_count(), 0);
        assert_eq!(manager.state(), ConnectionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_is_idempotent() {
        let (manager, transport, mut listener) = setup();
        let mut events = manager.subscribe_events();
        manager.connect(Some("secret")).await;
        manager.connect(Some("secret")).await;
        let _server = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

        manager.connect(Some("other")).await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(transport.open_count(), 1);
        assert!(listener.try_accept().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delays_grow_linearly_until_exhausted() {
        let (manager, transport, _listener) = setup();
        let mut events = manager.subscribe_events();
        transport.fail_next(100);
        let start = Instant::now();

        manager.connect(Some("secret")).await;
        for attempt in 1..=4u32 {
            assert_eq!(
                next_event(&mut events).await,
                ConnectionEvent::Reconnecting {
                    attempt,
                    delay: Duration::from_secs(3 * attempt as u64),
                }
            );
            assert_eq!(manager.state(), ConnectionState::Connecting);
        }
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Failed { attempts: 5 }
        );
        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(transport.open_count(), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(3 + 6 + 9 + 12));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(transport.open_count(), 5);
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_open_resets_budget() {
        let (manager, _transport, mut listener) = setup();
        let mut events = manager.subscribe_events();

        let first = open(&manager, &mut listener).await;
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
        first.close(CLOSE_ABNORMAL);
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Disconnected { code: CLOSE_ABNORMAL }
        );
        assert!(matches!(
            next_event(&mut events).await,
            ConnectionEvent::Reconnecting { attempt: 1, .. }
        ));

        let second = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
        drop(second);
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Disconnected { code: CLOSE_ABNORMAL }
        );
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Reconnecting {
                attempt: 1,
                delay: Duration::from_secs(3),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_cancels_pending_reconnect() {
        let (manager, transport, mut listener) = setup();
        let mut events = manager.subscribe_events();
        let server = open(&manager, &mut listener).await;
        server.close(CLOSE_ABNORMAL);
        loop {
            if let ConnectionEvent::Reconnecting { .. } = next_event(&mut events).await {
                break;
            }
        }

        manager.disconnect().await;
        assert_eq!(manager.state(), ConnectionState::Closed);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.open_count(), 1);
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_sends_normal_close() {
        let (manager, _transport, mut listener) = setup();
        let mut events = manager.subscribe_events();
        let mut server = open(&manager, &mut listener).await;
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);

        manager.disconnect().await;
        assert_eq!(
            server.recv().await,
            Some(Outbound::Close {
                code: CLOSE_NORMAL,
                reason: "client disconnect".into()
            })
        );
        assert_eq!(server.recv().await, None);
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Disconnected { code: CLOSE_NORMAL }
        );
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_normal_close_is_terminal() {
        let (manager, transport, mut listener) = setup();
        let server = open(&manager, &mut listener).await;
        let mut state = manager.state_receiver();
        server.close(CLOSE_NORMAL);

        state
            .wait_for(|s| *s == ConnectionState::Closed)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport.open_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_every_interval_while_open() {
        let (manager, _transport, mut listener) = setup();
        let mut server = open(&manager, &mut listener).await;
        let start = Instant::now();

        for n in 1..=2u64 {
            let Some(Outbound::Text(text)) = server.recv().await else {
                panic!("expected a heartbeat frame");
            };
            let frame: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(frame["type"], "heartbeat");
            assert!(frame["timestamp"].as_i64().is_some());
            assert_eq!(start.elapsed(), Duration::from_secs(30 * n));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_stops_after_disconnect() {
        let (manager, _transport, mut listener) = setup();
        let mut server = open(&manager, &mut listener).await;
        manager.disconnect().await;
        assert!(matches!(server.recv().await, Some(Outbound::Close { .. })));
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(server.try_recv(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_only_while_open() {
        let (manager, _transport, mut listener) = setup();
        manager.send(&json!({"type": "ping"})).unwrap();

        let mut server = open(&manager, &mut listener).await;
        tokio::task::yield_now().await;
        assert_eq!(server.try_recv(), None);

        manager.send(&json!({"type": "ping"})).unwrap();
        assert_eq!(
            server.recv().await,
            Some(Outbound::Text(r#"{"type":"ping"}"#.into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_exhaustion() {
        let (manager, transport, mut listener) = setup();
        let mut events = manager.subscribe_events();
        transport.fail_next(5);
        manager.connect(Some("secret")).await;
        loop {
            if let ConnectionEvent::Failed { .. } = next_event(&mut events).await {
                break;
            }
        }

        manager.connect(Some("secret")).await;
        let _server = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
        assert_eq!(transport.open_count(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_handler_keeps_controller_alive() {
        let (manager, transport, mut listener) = setup();
        let mut events = manager.subscribe_events();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        manager.dispatcher().on("custom", move |data| {
            let first = data["items"].as_array().unwrap()[0].clone();
            sink.lock().unwrap().push(first);
        });

        let server = open(&manager, &mut listener).await;
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
        server.send_text(r#"{"type":"custom","data":{}}"#);
        server.send_text(r#"{"type":"custom","data":{"items":[7]}}"#);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*seen.lock().unwrap(), vec![json!(7)]);

        server.close(CLOSE_ABNORMAL);
        assert_eq!(
            next_event(&mut events).await,
            ConnectionEvent::Disconnected { code: CLOSE_ABNORMAL }
        );
        assert!(matches!(
            next_event(&mut events).await,
            ConnectionEvent::Reconnecting { attempt: 1, .. }
        ));
        let _second = listener.accept().await.unwrap();
        assert_eq!(next_event(&mut events).await, ConnectionEvent::Connected);
        assert_eq!(transport.open_count(), 2);

        manager.disconnect().await;
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inbound_frames_dispatched_in_order() {
        let (manager, _transport, mut listener) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        manager
            .dispatcher()
            .on("custom", move |data| {
                sink.lock().unwrap().push(data["n"].as_i64().unwrap_or(-1))
            });
        let mut notes = manager.dispatcher().subscribe_notifications();

        let server = open(&manager, &mut listener).await;
        for n in 0..10 {
            server.send_text(json!({"type": "custom", "data": {"n": n}}).to_string());
        }
        server.send_text("{not json");
        server.send_text(r#"{"type":"heartbeat"}"#);
        server.send_text(r#"{"type":"system_notification","title":"Done"}"#);

        let event = notes.recv().await.unwrap();
        assert_eq!(event.category, NotificationCategory::System);
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
        assert_eq!(manager.state(), ConnectionState::Open);
    }
}
