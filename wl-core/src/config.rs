//! Application configuration management.
//!
//! Handles loading, saving, and accessing the client configuration: REST and
//! WebSocket endpoints, socket reconnect/heartbeat tuning, local storage,
//! logging, and notification preferences. Configuration is persisted as TOML.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::constants;
use crate::error::{WlError, WlResult};
use crate::platform;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend endpoints.
    #[serde(default)]
    pub server: ServerConfig,

    /// Real-time socket tuning.
    #[serde(default)]
    pub socket: SocketConfig,

    /// Local storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Notification settings.
    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// REST API base, including the version prefix (e.g. "http://localhost:8000/api/v1").
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// WebSocket base (scheme + host). Empty means derive from `api_base`.
    #[serde(default)]
    pub ws_base: String,

    /// REST request timeout in milliseconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_ms: u64,
}

/// Socket reconnect and heartbeat configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Reconnection is abandoned once this many abnormal closes happen in a row.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Linear backoff step: the Nth reconnect waits `N * reconnect_base_delay_ms`.
    #[serde(default = "default_reconnect_base_delay")]
    pub reconnect_base_delay_ms: u64,

    /// Interval between heartbeat frames while connected.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,

    /// Capacity of the broadcast channels fed by the socket.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Local storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite file. If empty, uses the default location.
    #[serde(default)]
    pub path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Run `PRAGMA integrity_check` when the database is opened.
    #[serde(default = "default_true")]
    pub integrity_check: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses the default location.
    #[serde(default)]
    pub directory: String,

    /// Write JSON lines to the log file.
    #[serde(default)]
    pub json_output: bool,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Master switch for presenting notifications.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Request OS-level notifications through the desktop shell.
    #[serde(default = "default_true")]
    pub desktop: bool,

    /// How long a status-line message stays visible.
    #[serde(default = "default_status_duration")]
    pub status_duration_ms: u64,

    /// Maximum number of toasts kept in the in-app list.
    #[serde(default = "default_toast_capacity")]
    pub toast_capacity: usize,
}

// Default value functions for serde

fn default_api_base() -> String {
    constants::DEFAULT_API_BASE.to_string()
}

fn default_api_timeout() -> u64 {
    constants::DEFAULT_API_TIMEOUT_MS
}

fn default_max_reconnect_attempts() -> u32 {
    constants::DEFAULT_MAX_RECONNECT_ATTEMPTS
}

fn default_reconnect_base_delay() -> u64 {
    constants::DEFAULT_RECONNECT_BASE_DELAY_MS
}

fn default_heartbeat_interval() -> u64 {
    constants::DEFAULT_HEARTBEAT_INTERVAL_SECS
}

fn default_event_capacity() -> usize {
    256
}

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_status_duration() -> u64 {
    constants::DEFAULT_STATUS_DURATION_MS
}

fn default_toast_capacity() -> usize {
    constants::DEFAULT_TOAST_CAPACITY
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            ws_base: String::new(),
            api_timeout_ms: default_api_timeout(),
        }
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_base_delay_ms: default_reconnect_base_delay(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            wal_mode: true,
            pool_size: default_pool_size(),
            integrity_check: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            desktop: true,
            status_duration_ms: default_status_duration(),
            toast_capacity: default_toast_capacity(),
        }
    }
}

impl SocketConfig {
    /// Base delay as a `Duration`.
    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    /// Heartbeat interval as a `Duration`.
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }
}

impl ServerConfig {
    /// The WebSocket base to use: `ws_base` if set, otherwise derived from `api_base`.
    pub fn effective_ws_base(&self) -> String {
        if !self.ws_base.is_empty() {
            return AppConfig::sanitize_address(&self.ws_base);
        }
        derive_ws_base(&self.api_base)
    }

    /// Full URL of the message socket endpoint, without the token query.
    pub fn messages_socket_url(&self) -> String {
        format!("{}{}", self.effective_ws_base(), constants::WS_MESSAGES_PATH)
    }

    /// Request timeout as a `Duration`.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api_timeout_ms)
    }
}

/// Derive `ws://host[:port]` / `wss://host[:port]` from an HTTP API base.
fn derive_ws_base(api_base: &str) -> String {
    let api_base = AppConfig::sanitize_address(api_base);
    let (scheme, rest) = if let Some(rest) = api_base.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = api_base.strip_prefix("http://") {
        ("ws", rest)
    } else {
        ("ws", api_base.as_str())
    };
    let host = rest.split('/').next().unwrap_or(rest);
    if host.is_empty() {
        return constants::DEFAULT_WS_BASE.to_string();
    }
    format!("{scheme}://{host}")
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> WlResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> WlResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file path.
    pub fn save_default(&self) -> WlResult<()> {
        let path = Self::default_config_path()?;
        self.save_to_file(&path)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> WlResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| WlError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> WlResult<PathBuf> {
        Ok(platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective local storage path.
    pub fn effective_storage_path(&self) -> WlResult<PathBuf> {
        if self.storage.path.is_empty() {
            Ok(platform::data_dir()?.join("worklog.db"))
        } else {
            Ok(PathBuf::from(&self.storage.path))
        }
    }

    /// Get the effective log directory.
    pub fn effective_log_dir(&self) -> WlResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Trim whitespace, surrounding quotes, and trailing slashes from an address.
    pub fn sanitize_address(address: &str) -> String {
        address
            .trim()
            .trim_matches('"')
            .trim()
            .trim_end_matches('/')
            .to_string()
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }

    /// Clone out the current configuration.
    pub async fn snapshot(&self) -> AppConfig {
        self.inner.read().await.clone()
    }

    /// Save the current configuration to disk.
    pub async fn save(&self) -> WlResult<()> {
        let config = self.inner.read().await;
        config.save_default()
    }
}
