//! Message (inbox) endpoints.

use serde::Deserialize;
use serde_json::Value;

use wl_core::error::WlResult;
use wl_models::models::message::{Message, MessageQuery, MessageStats};

use crate::client::ApiClient;

#[derive(Debug, Deserialize)]
struct UnreadCount {
    unread_count: u64,
}

#[derive(Debug, Deserialize)]
struct MarkedCount {
    #[serde(default)]
    marked_count: u64,
}

/// Users currently holding a socket connection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default)]
    pub connected_users: Vec<i64>,
}

/// Result of a test notification request.
#[derive(Debug, Clone, Deserialize)]
pub struct TestNotificationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

impl ApiClient {
    pub async fn list_messages(&self, query: &MessageQuery) -> WlResult<Vec<Message>> {
        self.get_json_query("/messages/", query).await
    }

    pub async fn message_stats(&self) -> WlResult<MessageStats> {
        self.get_json("/messages/stats").await
    }

    pub async fn unread_count(&self) -> WlResult<u64> {
        let resp: UnreadCount = self.get_json("/messages/unread-count").await?;
        Ok(resp.unread_count)
    }

    pub async fn get_message(&self, id: i64) -> WlResult<Message> {
        self.get_json(&format!("/messages/{id}")).await
    }

    pub async fn mark_message_read(&self, id: i64) -> WlResult<Message> {
        self.put_json(&format!("/messages/{id}/read"), &Value::Null).await
    }

    /// Mark every message (optionally of one type) read; returns how many changed.
    pub async fn mark_all_messages_read(&self, message_type: Option<&str>) -> WlResult<u64> {
        let query: Vec<(&str, &str)> = message_type
            .map(|t| vec![("message_type", t)])
            .unwrap_or_default();
        let resp: MarkedCount = self.put_query("/messages/mark-all-read", &query).await?;
        Ok(resp.marked_count)
    }

    pub async fn delete_message(&self, id: i64) -> WlResult<()> {
        self.delete(&format!("/messages/{id}")).await
    }

    pub async fn connection_status(&self) -> WlResult<ConnectionStatus> {
        self.get_json("/messages/connection-status").await
    }

    /// Ask the server to push a test notification over the socket.
    pub async fn send_test_notification(&self) -> WlResult<TestNotificationResult> {
        self.post_empty("/messages/test-notification").await
    }
}
