//! WorkLog API - HTTP client for the backend REST API.
//!
//! A typed client over the user, team, project, task, work-log and message
//! endpoints. Requests carry the session's bearer token; non-success
//! statuses are mapped onto `WlError` variants so callers can decide how to
//! surface them.

pub mod client;
pub mod endpoints;
pub mod response;

// Re-export key types
pub use client::ApiClient;
pub use response::ApiEnvelope;
