//! WorkLog Services - application layer above the socket and REST client.
//!
//! This crate provides:
//! - The service trait and a typed application event bus
//! - The desktop shell capability (OS notifications, credential hand-off,
//!   work-mode windows) with a no-op implementation for headless runs
//! - The notification presenter (toast list, OS notification, status line)
//! - The session gate that owns the bearer credential
//! - The realtime service tying the session to the socket and keeping the
//!   unread counter
//! - Reporting of failed REST calls, including session expiry

pub mod errors;
pub mod event_bus;
pub mod notification;
pub mod realtime;
pub mod service;
pub mod session;
pub mod shell;
pub mod window_state;

// Re-export key types
pub use errors::ErrorReporter;
pub use event_bus::{AppEvent, EventBus};
pub use notification::{
    LogStatusLine, NotificationPresenter, StatusLine, StatusMessage, Toast, ToastList,
    ToastSurface,
};
pub use realtime::RealtimeService;
pub use service::{Service, ServiceState};
pub use session::SessionGate;
pub use shell::{DesktopShell, NativeShell, NoopShell, ShellNotification};
pub use window_state::{WindowMode, WorkArea, WorkModeWindows};
