//! API endpoint modules organized by resource.
//!
//! Each module adds typed methods to [`ApiClient`](crate::ApiClient) for one
//! group of related endpoints.

pub mod auth;
pub mod messages;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod users;
pub mod work_logs;
