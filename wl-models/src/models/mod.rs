//! Backend entity models.

pub mod message;
pub mod page;
pub mod project;
pub mod task;
pub mod team;
pub mod user;
pub mod work_log;
