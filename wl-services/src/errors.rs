//! Surfacing failed REST calls.
//!
//! Every failed call produces exactly one status-line message. A 401 also
//! ends the session: the credential is cleared (which disconnects the
//! socket) and `SessionExpired` is emitted so the front end can return to
//! the login screen. Nothing is retried.

use std::sync::Arc;

use tracing::{debug, warn};

use wl_core::error::{WlError, WlResult};

use crate::event_bus::{AppEvent, EventBus};
use crate::notification::NotificationPresenter;
use crate::session::SessionGate;

#[derive(Clone)]
pub struct ErrorReporter {
    presenter: Arc<NotificationPresenter>,
    gate: SessionGate,
    bus: EventBus,
}

impl ErrorReporter {
    pub fn new(presenter: Arc<NotificationPresenter>, gate: SessionGate, bus: EventBus) -> Self {
        Self {
            presenter,
            gate,
            bus,
        }
    }

    /// Report one failed call.
    pub async fn report(&self, err: &WlError) {
        if err.is_session_expired() {
            // Several requests can fail with 401 at once; only the one that
            // claims the credential reports it.
            match self.gate.clear().await {
                Ok(true) => {}
                Ok(false) => {
                    debug!("ignoring 401 after the session already ended");
                    return;
                }
                Err(e) => warn!("failed to clear expired session: {e}"),
            }
            self.bus.emit(AppEvent::SessionExpired);
        } else {
            warn!("request failed: {err}");
        }
        self.presenter.show_error(err.user_message());
    }

    /// Pass a successful value through; report a failure and return `None`.
    pub async fn check<T>(&self, result: WlResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(&e).await;
                None
            }
        }
    }
}
