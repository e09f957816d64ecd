//! Wiring shared by every command: storage, REST client, session gate,
//! presenter and error reporter.

use std::sync::Arc;

use console::style;

use wl_api::ApiClient;
use wl_core::config::ConfigHandle;
use wl_core::error::{WlError, WlResult};
use wl_core::AppConfig;
use wl_models::{Database, LocalStore, Severity};
use wl_services::{
    DesktopShell, ErrorReporter, EventBus, LogStatusLine, NoopShell, NotificationPresenter,
    SessionGate, StatusLine, StatusMessage,
};

use crate::OutputFormat;

/// Status line printed to stderr, coloured by severity.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleStatusLine;

impl StatusLine for ConsoleStatusLine {
    fn show(&self, message: &StatusMessage) {
        let marker = match message.severity {
            Severity::Success => style("OK").green().bold(),
            Severity::Info => style("INFO").cyan().bold(),
            Severity::Warning => style("WARN").yellow().bold(),
            Severity::Error => style("FAIL").red().bold(),
        };
        eprintln!("  {marker} {}", message.text);
    }
}

pub struct AppContext {
    pub config: AppConfig,
    pub db: Database,
    pub api: ApiClient,
    pub gate: SessionGate,
    pub presenter: Arc<NotificationPresenter>,
    pub bus: EventBus,
    pub reporter: ErrorReporter,
}

impl AppContext {
    /// Build the context with no desktop integration.
    pub async fn init(config: &ConfigHandle, format: OutputFormat) -> WlResult<Self> {
        Self::with_shell(config, Arc::new(NoopShell), format).await
    }

    /// JSON output keeps status messages out of the console and in the log.
    pub async fn with_shell(
        config: &ConfigHandle,
        shell: Arc<dyn DesktopShell>,
        format: OutputFormat,
    ) -> WlResult<Self> {
        let config = config.snapshot().await;

        let db = Database::init(&config.effective_storage_path()?, &config.storage)?;
        let store = Arc::new(LocalStore::new(db.clone()));
        let api = ApiClient::new(&config.server)?;
        let gate = SessionGate::new(store, shell.clone(), Some(api.clone())).await?;

        let status: Arc<dyn StatusLine> = match format {
            OutputFormat::Text => Arc::new(ConsoleStatusLine),
            OutputFormat::Json => Arc::new(LogStatusLine),
        };
        let presenter = Arc::new(NotificationPresenter::new(
            config.notifications.clone(),
            shell,
            status,
        ));
        let bus = EventBus::new(config.socket.event_capacity);
        let reporter = ErrorReporter::new(presenter.clone(), gate.clone(), bus.clone());

        Ok(Self {
            config,
            db,
            api,
            gate,
            presenter,
            bus,
            reporter,
        })
    }

    /// Fail early when no session is stored.
    pub fn require_login(&self) -> WlResult<()> {
        if self.gate.has_credential() {
            Ok(())
        } else {
            Err(WlError::NotAuthenticated(
                "no stored session, run `worklog login` first".into(),
            ))
        }
    }

    /// Pass a REST result through the error reporter.
    pub async fn request<T>(&self, result: WlResult<T>) -> WlResult<T> {
        if let Err(e) = &result {
            self.reporter.report(e).await;
        }
        result
    }
}
