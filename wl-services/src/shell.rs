//! Desktop shell capability.
//!
//! Everything the client asks of the host desktop goes through
//! `DesktopShell`: OS notifications, handing the credential to other
//! windows, and the work-mode window primitives. Headless and browser-like
//! runs inject `NoopShell`. Callers treat every call as fire-and-forget and
//! pass results through [`log_failure`].

use std::sync::{Mutex, RwLock};

use tracing::{debug, warn};

use wl_core::constants::APP_NAME;
use wl_core::error::{WlError, WlResult};

use crate::window_state::{WorkArea, WorkModeWindows};

/// Request for an OS-level notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellNotification {
    pub title: String,
    pub body: String,
    /// Category icon. Emoji icons are shown in front of the title.
    pub icon: Option<String>,
    pub silent: bool,
}

impl ShellNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            icon: None,
            silent: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    fn summary(&self) -> String {
        let title = if self.title.is_empty() {
            "WorkLog notification"
        } else {
            self.title.as_str()
        };
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => format!("{icon} {title}"),
            _ => title.to_string(),
        }
    }
}

/// Host desktop integration.
pub trait DesktopShell: Send + Sync {
    /// Whether a real desktop is behind this shell.
    fn is_available(&self) -> bool;

    fn show_notification(&self, notification: &ShellNotification) -> WlResult<()>;

    /// Share the current credential with the shell; `None` clears it.
    fn update_token(&self, token: Option<&str>) -> WlResult<()>;

    fn show_main_window(&self) -> WlResult<()>;

    fn show_task_bar(&self) -> WlResult<()>;

    fn hide_task_bar(&self) -> WlResult<()>;

    /// Resize the task bar and re-centre it.
    fn resize_window(&self, width: u32, height: u32) -> WlResult<()>;

    /// Move the task bar, clamped to the work area.
    fn move_window_to(&self, x: i32, y: i32) -> WlResult<()>;

    /// Switch between normal and work mode. Returns whether work mode is on.
    fn toggle_work_mode(&self) -> WlResult<bool>;

    fn work_mode(&self) -> bool;
}

/// Log a failed shell call and carry on.
pub fn log_failure<T>(operation: &str, result: WlResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("desktop shell {operation} failed: {e}");
            None
        }
    }
}

/// Shell used when no desktop is present. Every call succeeds and does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopShell;

impl DesktopShell for NoopShell {
    fn is_available(&self) -> bool {
        false
    }

    fn show_notification(&self, _notification: &ShellNotification) -> WlResult<()> {
        Ok(())
    }

    fn update_token(&self, _token: Option<&str>) -> WlResult<()> {
        Ok(())
    }

    fn show_main_window(&self) -> WlResult<()> {
        Ok(())
    }

    fn show_task_bar(&self) -> WlResult<()> {
        Ok(())
    }

    fn hide_task_bar(&self) -> WlResult<()> {
        Ok(())
    }

    fn resize_window(&self, _width: u32, _height: u32) -> WlResult<()> {
        Ok(())
    }

    fn move_window_to(&self, _x: i32, _y: i32) -> WlResult<()> {
        Ok(())
    }

    fn toggle_work_mode(&self) -> WlResult<bool> {
        Ok(false)
    }

    fn work_mode(&self) -> bool {
        false
    }
}

/// Shell backed by the host notification daemon and an in-process window model.
pub struct NativeShell {
    token: RwLock<Option<String>>,
    windows: Mutex<WorkModeWindows>,
}

impl NativeShell {
    pub fn new(work_area: WorkArea) -> Self {
        Self {
            token: RwLock::new(None),
            windows: Mutex::new(WorkModeWindows::new(work_area)),
        }
    }

    /// The credential last handed to the shell.
    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    /// Snapshot of the window model.
    pub fn windows(&self) -> WlResult<WorkModeWindows> {
        Ok(self.lock_windows()?.clone())
    }

    fn lock_windows(&self) -> WlResult<std::sync::MutexGuard<'_, WorkModeWindows>> {
        self.windows
            .lock()
            .map_err(|_| WlError::Shell("window state lock poisoned".into()))
    }

    fn with_windows<T>(&self, f: impl FnOnce(&mut WorkModeWindows) -> T) -> WlResult<T> {
        let mut windows = self.lock_windows()?;
        Ok(f(&mut windows))
    }
}

impl Default for NativeShell {
    fn default() -> Self {
        Self::new(WorkArea::default())
    }
}

impl DesktopShell for NativeShell {
    fn is_available(&self) -> bool {
        true
    }

    fn show_notification(&self, notification: &ShellNotification) -> WlResult<()> {
        let summary = notification.summary();
        let body = notification.body.clone();
        let silent = notification.silent;

        // The notification daemon call blocks on D-Bus; keep it off the runtime threads.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    if let Err(e) = show_native(&summary, &body, silent) {
                        warn!("OS notification failed: {e}");
                    }
                });
                Ok(())
            }
            Err(_) => show_native(&summary, &body, silent),
        }
    }

    fn update_token(&self, token: Option<&str>) -> WlResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| WlError::Shell("token lock poisoned".into()))?;
        *slot = token.map(str::to_string);
        debug!("shell token {}", if slot.is_some() { "updated" } else { "cleared" });
        Ok(())
    }

    fn show_main_window(&self) -> WlResult<()> {
        self.with_windows(|w| w.show_main())
    }

    fn show_task_bar(&self) -> WlResult<()> {
        self.with_windows(|w| w.show_task_bar())
    }

    fn hide_task_bar(&self) -> WlResult<()> {
        self.with_windows(|w| w.hide_task_bar())
    }

    fn resize_window(&self, width: u32, height: u32) -> WlResult<()> {
        self.with_windows(|w| w.resize_task_bar(width, height))
    }

    fn move_window_to(&self, x: i32, y: i32) -> WlResult<()> {
        self.with_windows(|w| w.move_task_bar(x, y))
    }

    fn toggle_work_mode(&self) -> WlResult<bool> {
        let on = self.with_windows(|w| w.toggle())?;
        debug!("work mode {}", if on { "on" } else { "off" });
        Ok(on)
    }

    fn work_mode(&self) -> bool {
        self.lock_windows().map(|w| w.is_work_mode()).unwrap_or(false)
    }
}

fn show_native(summary: &str, body: &str, silent: bool) -> WlResult<()> {
    #[cfg(not(test))]
    {
        let mut notification = notify_rust::Notification::new();
        notification.summary(summary).body(body).appname(APP_NAME);
        if !silent {
            notification.sound_name("message-new-instant");
        }
        notification
            .show()
            .map_err(|e| WlError::Notification(e.to_string()))?;
    }

    let _ = (summary, body, silent);
    Ok(())
}
