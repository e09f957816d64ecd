//! Message (inbox) models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A stored message from `/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// `task`, `team`, `system`, `worklog`, `project` or `user`.
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub sender_id: Option<i64>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub read_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub message_data: Option<serde_json::Value>,
}

/// Inbox counters from `GET /messages/stats`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageStats {
    pub total_count: u64,
    pub unread_count: u64,
    pub today_count: u64,
    pub week_count: u64,
    pub by_type: HashMap<String, u64>,
}

/// Query parameters for `GET /messages/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

/// Sender attached to a pushed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSender {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload of a `new_message` socket frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageNotification {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub sender: Option<MessageSender>,
}
