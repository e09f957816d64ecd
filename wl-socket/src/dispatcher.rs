//! Inbound frame routing.
//!
//! Each frame is routed by its `type`, first match wins:
//! 1. heartbeat / pong are swallowed
//! 2. a registered handler receives `data` (null when absent); a panicking
//!    handler is caught and reported as `HandlerFailed`
//! 3. task, project and system notifications become a `NotificationEvent`
//!    broadcast on the notification channel and the new-message channel
//! 4. anything else is dropped
//!
//! There is exactly one handler per type; registering again replaces it.
//! Fan-out to several consumers happens on the broadcast channels.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use wl_models::{NotificationCategory, NotificationEvent};

use crate::format;
use crate::frame::InboundFrame;

/// Callback for an application-registered frame type.
pub type Handler = Arc<dyn Fn(&Value) + Send + Sync>;

/// What `dispatch` did with a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Heartbeat or pong.
    Keepalive,
    /// Passed to the handler registered for this type.
    Handled(String),
    /// The registered handler panicked.
    HandlerFailed(String),
    /// Turned into a notification and broadcast.
    Notified(NotificationCategory),
    /// No route for this type.
    Dropped(String),
    /// Not a JSON object with a `type`.
    Malformed,
}

/// Routes inbound frames. Cloning shares the handler table and channels.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<RwLock<HashMap<String, Handler>>>,
    notifications: broadcast::Sender<NotificationEvent>,
    new_messages: broadcast::Sender<NotificationEvent>,
}

impl Dispatcher {
    /// Create a new Dispatcher with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (notifications, _) = broadcast::channel(capacity);
        let (new_messages, _) = broadcast::channel(capacity);
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            notifications,
            new_messages,
        }
    }

    /// Register the handler for `frame_type`, replacing any previous one.
    pub fn on<F>(&self, frame_type: &str, handler: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let replaced = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(frame_type.to_string(), Arc::new(handler))
            .is_some();
        if replaced {
            debug!("handler for '{frame_type}' replaced");
        }
    }

    /// Remove the handler for `frame_type`. Returns whether one was registered.
    pub fn off(&self, frame_type: &str) -> bool {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(frame_type)
            .is_some()
    }

    pub fn has_handler(&self, frame_type: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(frame_type)
    }

    /// Typed notifications (task / project / system frames), for UI refresh.
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<NotificationEvent> {
        self.notifications.subscribe()
    }

    /// Generic "new message" events, for unread-count bookkeeping.
    pub fn subscribe_new_messages(&self) -> broadcast::Receiver<NotificationEvent> {
        self.new_messages.subscribe()
    }

    /// Route one raw text frame. Never fails; malformed input is logged and
    /// reported as `Malformed`.
    pub fn dispatch(&self, raw: &str) -> DispatchOutcome {
        let frame = match InboundFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("dropping frame: {e}");
                return DispatchOutcome::Malformed;
            }
        };

        let kind = frame.kind();
        if kind.is_keepalive() {
            return DispatchOutcome::Keepalive;
        }

        // Clone out of the lock so a handler may call on()/off() itself.
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&frame.frame_type)
            .cloned();
        if let Some(handler) = handler {
            let data = frame.data_or_null();
            if catch_unwind(AssertUnwindSafe(|| handler(&data))).is_err() {
                error!("handler for '{}' panicked", frame.frame_type);
                return DispatchOutcome::HandlerFailed(frame.frame_type);
            }
            return DispatchOutcome::Handled(frame.frame_type);
        }

        if let Some(event) = format::notification_for(&kind, &frame.fields()) {
            let category = event.category;
            self.broadcast(event);
            return DispatchOutcome::Notified(category);
        }

        debug!("no route for frame type '{}'", frame.frame_type);
        DispatchOutcome::Dropped(frame.frame_type)
    }

    fn broadcast(&self, event: NotificationEvent) {
        // Send errors only mean nobody is subscribed right now.
        if self.notifications.send(event.clone()).is_err() {
            debug!("no notification subscribers");
        }
        if self.new_messages.send(event).is_err() {
            debug!("no new-message subscribers");
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(wl_core::config::SocketConfig::default().event_capacity)
    }
}
