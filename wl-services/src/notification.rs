//! Notification presenter.
//!
//! A notification is shown on up to three surfaces, in order: the in-app
//! toast list (when one is registered), an OS notification through the
//! desktop shell, and a short-lived status-line message. The status line is
//! always written so a notification is never lost when the other two are
//! missing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use wl_core::config::NotificationConfig;
use wl_models::{NotificationCategory, NotificationEvent, Severity};

use crate::shell::{log_failure, DesktopShell, ShellNotification};

/// An entry in the in-app notification list.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: NotificationCategory,
    pub icon: &'static str,
    pub severity: Severity,
    pub received_at: DateTime<Utc>,
}

impl Toast {
    pub fn from_event(event: &NotificationEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: event.title.clone(),
            content: event.content.clone(),
            category: event.category,
            icon: event.category.icon(),
            severity: event.category.severity(),
            received_at: Utc::now(),
        }
    }
}

/// In-app transient notification surface.
pub trait ToastSurface: Send + Sync {
    fn push(&self, toast: Toast);
}

/// Bounded, newest-first toast list.
pub struct ToastList {
    toasts: Mutex<VecDeque<Toast>>,
    capacity: usize,
}

impl ToastList {
    pub fn new(capacity: usize) -> Self {
        Self {
            toasts: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Current toasts, newest first.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .map(|t| t.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.toasts.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove one toast. Returns whether it was present.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let Ok(mut toasts) = self.toasts.lock() else {
            return false;
        };
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }

    pub fn clear(&self) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.clear();
        }
    }
}

impl ToastSurface for ToastList {
    fn push(&self, toast: Toast) {
        let Ok(mut toasts) = self.toasts.lock() else {
            warn!("toast list lock poisoned, dropping toast");
            return;
        };
        toasts.push_front(toast);
        toasts.truncate(self.capacity);
    }
}

/// A short-lived status-line message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub duration: Duration,
}

/// Where status-line messages go.
pub trait StatusLine: Send + Sync {
    fn show(&self, message: &StatusMessage);
}

/// Status line that writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogStatusLine;

impl StatusLine for LogStatusLine {
    fn show(&self, message: &StatusMessage) {
        match message.severity {
            Severity::Error => error!("{}", message.text),
            Severity::Warning => warn!("{}", message.text),
            Severity::Success | Severity::Info => info!("{}", message.text),
        }
    }
}

/// Shows notifications on every available surface.
pub struct NotificationPresenter {
    config: NotificationConfig,
    shell: Arc<dyn DesktopShell>,
    status: Arc<dyn StatusLine>,
    surface: RwLock<Option<Arc<dyn ToastSurface>>>,
}

impl NotificationPresenter {
    pub fn new(
        config: NotificationConfig,
        shell: Arc<dyn DesktopShell>,
        status: Arc<dyn StatusLine>,
    ) -> Self {
        Self {
            config,
            shell,
            status,
            surface: RwLock::new(None),
        }
    }

    /// Register the in-app toast surface, replacing any previous one.
    pub fn set_surface(&self, surface: Arc<dyn ToastSurface>) {
        if let Ok(mut slot) = self.surface.write() {
            *slot = Some(surface);
        }
    }

    pub fn clear_surface(&self) {
        if let Ok(mut slot) = self.surface.write() {
            *slot = None;
        }
    }

    pub fn has_surface(&self) -> bool {
        self.surface.read().map(|s| s.is_some()).unwrap_or(false)
    }

    pub fn shell(&self) -> &Arc<dyn DesktopShell> {
        &self.shell
    }

    /// Present a notification.
    ///
    /// With notifications disabled only the status line is written.
    pub fn present(&self, event: &NotificationEvent) {
        debug!("presenting {} notification: {}", event.category, event.title);

        if self.config.enabled {
            let surface = self.surface.read().ok().and_then(|s| s.clone());
            if let Some(surface) = surface {
                surface.push(Toast::from_event(event));
            }

            if self.config.desktop && self.shell.is_available() {
                let request = ShellNotification::new(&event.title, &event.content)
                    .with_icon(event.category.icon());
                log_failure("show_notification", self.shell.show_notification(&request));
            }
        }

        self.show_status(event.status_text(), event.category.severity());
    }

    /// Write a status-line message.
    pub fn show_status(&self, text: impl Into<String>, severity: Severity) {
        self.status.show(&StatusMessage {
            text: text.into(),
            severity,
            duration: Duration::from_millis(self.config.status_duration_ms),
        });
    }

    pub fn show_error(&self, text: impl Into<String>) {
        self.show_status(text, Severity::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wl_core::error::{WlError, WlResult};

    use crate::shell::NoopShell;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    struct RecordingSurface(Arc<Recorder>);

    impl ToastSurface for RecordingSurface {
        fn push(&self, toast: Toast) {
            self.0.record(format!("toast {}", toast.title));
        }
    }

    struct RecordingStatus(Arc<Recorder>);

    impl StatusLine for RecordingStatus {
        fn show(&self, message: &StatusMessage) {
            assert_eq!(message.duration, Duration::from_millis(3000));
            self.0
                .record(format!("status {} {}", message.severity, message.text));
        }
    }

    struct RecordingShell {
        recorder: Arc<Recorder>,
        fail: bool,
    }

    impl DesktopShell for RecordingShell {
        fn is_available(&self) -> bool {
            true
        }
        fn show_notification(&self, n: &ShellNotification) -> WlResult<()> {
            self.recorder.record(format!(
                "os {} {}",
                n.icon.clone().unwrap_or_default(),
                n.title
            ));
            if self.fail {
                Err(WlError::Shell("no daemon".into()))
            } else {
                Ok(())
            }
        }
        fn update_token(&self, _: Option<&str>) -> WlResult<()> {
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
        fn resize_window(&self, _: u32, _: u32) -> WlResult<()> {
            Ok(())
        }
        fn move_window_to(&self, _: i32, _: i32) -> WlResult<()> {
            Ok(())
        }
        fn toggle_work_mode(&self) -> WlResult<bool> {
            Ok(false)
        }
        fn work_mode(&self) -> bool {
            false
        }
    }

    fn presenter(fail: bool, config: NotificationConfig) -> (NotificationPresenter, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let shell = Arc::new(RecordingShell {
            recorder: recorder.clone(),
            fail,
        });
        let status = Arc::new(RecordingStatus(recorder.clone()));
        (NotificationPresenter::new(config, shell, status), recorder)
    }

    fn task_event() -> NotificationEvent {
        NotificationEvent::new(
            "Task notification: Fix bug",
            "Task \"Fix bug\" has been assigned to Alice",
            NotificationCategory::Task,
        )
    }

    #[test]
    fn test_present_runs_surfaces_in_order() {
        let (presenter, recorder) = presenter(false, NotificationConfig::default());
        presenter.set_surface(Arc::new(RecordingSurface(recorder.clone())));

        presenter.present(&task_event());

        assert_eq!(
            recorder.calls(),
            vec![
                "toast Task notification: Fix bug".to_string(),
                "os 🎯 Task notification: Fix bug".to_string(),
                "status success Task notification: Fix bug: Task \"Fix bug\" has been assigned to Alice"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_present_without_surface_or_shell() {
        let recorder = Arc::new(Recorder::default());
        let presenter = NotificationPresenter::new(
            NotificationConfig::default(),
            Arc::new(NoopShell),
            Arc::new(RecordingStatus(recorder.clone())),
        );
        presenter.present(&NotificationEvent::new(
            "Maintenance",
            "tonight",
            NotificationCategory::System,
        ));
        assert_eq!(recorder.calls(), vec!["status warning Maintenance: tonight".to_string()]);
    }

    #[test]
    fn test_shell_failure_is_swallowed() {
        let (presenter, recorder) = presenter(true, NotificationConfig::default());
        presenter.present(&task_event());
        let calls = recorder.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].starts_with("status success"));
    }

    #[test]
    fn test_disabled_keeps_status_line_only() {
        let config = NotificationConfig {
            enabled: false,
            ..NotificationConfig::default()
        };
        let (presenter, recorder) = presenter(false, config);
        presenter.set_surface(Arc::new(RecordingSurface(recorder.clone())));
        presenter.present(&task_event());
        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("status"));
    }

    #[test]
    fn test_desktop_off_skips_os_notification() {
        let config = NotificationConfig {
            desktop: false,
            ..NotificationConfig::default()
        };
        let (presenter, recorder) = presenter(false, config);
        presenter.present(&task_event());
        assert!(recorder.calls().iter().all(|c| !c.starts_with("os")));
    }

    #[test]
    fn test_clear_surface() {
        let (presenter, recorder) = presenter(false, NotificationConfig::default());
        presenter.set_surface(Arc::new(RecordingSurface(recorder.clone())));
        assert!(presenter.has_surface());
        presenter.clear_surface();
        presenter.present(&task_event());
        assert!(recorder.calls().iter().all(|c| !c.starts_with("toast")));
    }

    #[test]
    fn test_toast_list_is_bounded_newest_first() {
        let list = ToastList::new(2);
        for title in ["one", "two", "three"] {
            list.push(Toast::from_event(&NotificationEvent::new(
                title,
                "",
                NotificationCategory::Team,
            )));
        }
        let toasts = list.snapshot();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].title, "three");
        assert_eq!(toasts[1].title, "two");
        assert_eq!(toasts[0].icon, "👥");

        assert!(list.dismiss(toasts[0].id));
        assert!(!list.dismiss(toasts[0].id));
        list.clear();
        assert!(list.is_empty());
    }
}
