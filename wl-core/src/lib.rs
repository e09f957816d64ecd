//! WorkLog Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other WorkLog crates:
//! - Application configuration (API/WebSocket endpoints, socket tuning, notifications)
//! - Global error type covering all error categories
//! - Structured logging with tracing
//! - Per-user directory resolution
//! - Common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::{AppConfig, ConfigHandle};
pub use error::{WlError, WlResult};
pub use logging::init_logging;
