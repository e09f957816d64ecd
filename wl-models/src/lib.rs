//! WorkLog Models - domain types and local persistence.
//!
//! This crate owns the shapes exchanged with the backend (users, teams,
//! projects, tasks, work logs, messages), the client-side notification
//! event, and the small SQLite-backed key-value store that holds the
//! session between runs.

pub mod db;
pub mod migrations;
pub mod models;
pub mod notification;
pub mod storage;

// Re-export key types
pub use db::{Database, DbPool};
pub use models::message::{Message, MessageNotification, MessageStats};
pub use models::page::ListBody;
pub use models::project::Project;
pub use models::task::{Task, TaskStatistics, TaskStatus};
pub use models::team::{Team, TeamMember};
pub use models::user::{LoginResponse, User, UserProfile};
pub use models::work_log::WorkLog;
pub use notification::{NotificationCategory, NotificationEvent, Priority, Severity};
pub use storage::{KeyValueStore, LocalStore, MemoryStore};
