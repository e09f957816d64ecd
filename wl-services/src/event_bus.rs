//! Typed event bus for application-level events.
//!
//! Uses a tokio broadcast channel so the front end can react to realtime
//! activity without knowing where it came from. Unsubscribing is dropping
//! the receiver.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use wl_models::NotificationEvent;
use wl_socket::ConnectionState;

/// Application events derived from socket traffic and session changes.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The unread message counter changed.
    MessageCountUpdated { count: u64 },
    /// Task lists shown anywhere should be reloaded.
    TaskListRefresh,
    /// A notification was presented.
    NotificationReceived { event: NotificationEvent },
    /// A team notification arrived.
    TeamNotification { event: NotificationEvent },
    /// The socket connection changed state.
    ConnectionStateChanged { state: ConnectionState },
    /// The socket gave up reconnecting.
    ConnectionFailed { attempts: u32 },
    /// The server rejected the credential; the user must log in again.
    SessionExpired,
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Every subscriber gets every event. Subscribers that fall behind receive
/// `Lagged` and miss events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Human-readable label for an event (for logging).
fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::MessageCountUpdated { .. } => "MessageCountUpdated",
        AppEvent::TaskListRefresh => "TaskListRefresh",
        AppEvent::NotificationReceived { .. } => "NotificationReceived",
        AppEvent::TeamNotification { .. } => "TeamNotification",
        AppEvent::ConnectionStateChanged { .. } => "ConnectionStateChanged",
        AppEvent::ConnectionFailed { .. } => "ConnectionFailed",
        AppEvent::SessionExpired => "SessionExpired",
    }
}
