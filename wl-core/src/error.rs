//! Global error types for the WorkLog client.
//!
//! All error categories across the application are unified into a single
//! `WlError` enum with conversions from underlying library errors.

use thiserror::Error;

/// Convenience type alias for Results using WlError.
pub type WlResult<T> = Result<T, WlError>;

/// Unified error type covering all error categories in the WorkLog client.
#[derive(Error, Debug)]
pub enum WlError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Local storage errors --
    /// SQLite storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Storage migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Storage connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    // -- Network errors --
    /// HTTP request failed before a response was received.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// WebSocket connection error.
    #[error("socket error: {0}")]
    Socket(String),

    /// No credential is available for an authenticated operation.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// The server rejected the credential (401).
    #[error("session expired")]
    SessionExpired,

    /// The server refused access to the resource (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Server returned an error response.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error detail from the server body.
        message: String,
    },

    // -- Serialization errors --
    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Desktop integration errors --
    /// A desktop shell capability call failed.
    #[error("desktop shell error: {0}")]
    Shell(String),

    /// Native notification failed.
    #[error("notification error: {0}")]
    Notification(String),

    // -- Service errors --
    /// A service operation failed.
    #[error("service error: {0}")]
    Service(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for WlError {
    fn from(e: serde_json::Error) -> Self {
        WlError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for WlError {
    fn from(e: toml::de::Error) -> Self {
        WlError::Config(e.to_string())
    }
}

impl WlError {
    /// Whether this error means the stored credential is no longer valid.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, WlError::SessionExpired)
    }

    /// The single user-visible message shown for a failed request.
    pub fn user_message(&self) -> String {
        match self {
            WlError::SessionExpired => "Session expired, please log in again".to_string(),
            WlError::Forbidden(_) => "Permission denied".to_string(),
            WlError::NotFound(_) => "Requested resource not found".to_string(),
            WlError::ServerError { status: 500, .. } => "Server error".to_string(),
            WlError::ServerError { message, .. } if !message.is_empty() => message.clone(),
            WlError::ServerError { .. } => "Request failed".to_string(),
            WlError::Http(_) | WlError::Timeout(_) => {
                "Network error, check your connection".to_string()
            }
            WlError::NotAuthenticated(_) => "Please log in first".to_string(),
            other => format!("Request failed: {other}"),
        }
    }
}
