//! Wire frames.
//!
//! Every frame is a JSON object with a `type` key. Payloads arrive either
//! under `data` (`new_message`, `task_update`, `team_notification`) or as
//! top-level fields next to `type` (task, project and system notifications).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use wl_core::constants::frame_types;
use wl_core::error::{WlError, WlResult};
use wl_models::NotificationCategory;

/// Frame types the client knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Heartbeat,
    Pong,
    NewMessage,
    TaskUpdate,
    TeamNotification,
    TaskNotification,
    ProjectNotification,
    SystemNotification,
    /// Application-defined or unknown type.
    Other(String),
}

impl FrameKind {
    pub fn from_type(s: &str) -> Self {
        match s {
            frame_types::HEARTBEAT => Self::Heartbeat,
            frame_types::PONG => Self::Pong,
            frame_types::NEW_MESSAGE => Self::NewMessage,
            frame_types::TASK_UPDATE => Self::TaskUpdate,
            frame_types::TEAM_NOTIFICATION => Self::TeamNotification,
            frame_types::TASK_NOTIFICATION => Self::TaskNotification,
            frame_types::PROJECT_NOTIFICATION => Self::ProjectNotification,
            frame_types::SYSTEM_NOTIFICATION => Self::SystemNotification,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Heartbeat => frame_types::HEARTBEAT,
            Self::Pong => frame_types::PONG,
            Self::NewMessage => frame_types::NEW_MESSAGE,
            Self::TaskUpdate => frame_types::TASK_UPDATE,
            Self::TeamNotification => frame_types::TEAM_NOTIFICATION,
            Self::TaskNotification => frame_types::TASK_NOTIFICATION,
            Self::ProjectNotification => frame_types::PROJECT_NOTIFICATION,
            Self::SystemNotification => frame_types::SYSTEM_NOTIFICATION,
            Self::Other(s) => s.as_str(),
        }
    }

    /// Heartbeat and pong frames carry nothing for the application.
    pub fn is_keepalive(&self) -> bool {
        matches!(self, Self::Heartbeat | Self::Pong)
    }

    /// Category of the built-in notification frames; `None` for everything else.
    pub fn notification_category(&self) -> Option<NotificationCategory> {
        match self {
            Self::TaskNotification => Some(NotificationCategory::Task),
            Self::ProjectNotification => Some(NotificationCategory::Project),
            Self::SystemNotification => Some(NotificationCategory::System),
            _ => None,
        }
    }
}

/// A parsed inbound frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    /// Every other top-level field.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InboundFrame {
    /// Parse a raw text frame.
    pub fn parse(raw: &str) -> WlResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| WlError::Serialization(format!("malformed socket frame: {e}")))
    }

    pub fn kind(&self) -> FrameKind {
        FrameKind::from_type(&self.frame_type)
    }

    /// `data`, or JSON null when absent.
    pub fn data_or_null(&self) -> Value {
        self.data.clone().unwrap_or(Value::Null)
    }

    /// Flat view of the frame's fields: the fields of `data` (when it is an
    /// object) overlaid by the top-level fields, plus `type`.
    pub fn fields(&self) -> Value {
        let mut fields = match &self.data {
            Some(Value::Object(data)) => data.clone(),
            _ => Map::new(),
        };
        for (key, value) in &self.extra {
            fields.insert(key.clone(), value.clone());
        }
        fields.insert("type".into(), Value::String(self.frame_type.clone()));
        if let Some(ts) = &self.timestamp {
            fields.entry("timestamp").or_insert_with(|| ts.clone());
        }
        Value::Object(fields)
    }
}

/// Keepalive frame sent while the connection is open.
pub fn heartbeat_frame(timestamp_ms: i64) -> Value {
    serde_json::json!({
        "type": frame_types::HEARTBEAT,
        "timestamp": timestamp_ms,
    })
}
