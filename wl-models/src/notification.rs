//! Client-side notification events.
//!
//! A `NotificationEvent` is derived from an inbound socket frame and handed
//! to the presenter. It is never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of notification. Unknown labels fall back to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NotificationCategory {
    Task,
    Team,
    System,
    Worklog,
    Project,
    General,
}

/// Visual severity of a status-line message or toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Message priority as sent by the server. Unknown labels map to `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Priority {
    Urgent,
    Important,
    Normal,
    Low,
}

impl NotificationCategory {
    pub fn from_label(label: &str) -> Self {
        match label {
            "task" => Self::Task,
            "team" => Self::Team,
            "system" => Self::System,
            "worklog" => Self::Worklog,
            "project" => Self::Project,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Team => "team",
            Self::System => "system",
            Self::Worklog => "worklog",
            Self::Project => "project",
            Self::General => "general",
        }
    }

    /// Icon shown in toasts and OS notifications.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Task => "🎯",
            Self::Team => "👥",
            Self::System => "⚙️",
            Self::Worklog => "📝",
            Self::Project => "📁",
            Self::General => "🔔",
        }
    }

    /// Default severity of the status-line message.
    pub fn severity(&self) -> Severity {
        match self {
            Self::Task => Severity::Success,
            Self::System => Severity::Warning,
            Self::Team | Self::Worklog | Self::Project | Self::General => Severity::Info,
        }
    }
}

impl From<String> for NotificationCategory {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Priority {
    pub fn from_label(label: &str) -> Self {
        match label {
            "urgent" => Self::Urgent,
            "important" => Self::Important,
            "low" => Self::Low,
            _ => Self::Normal,
        }
    }
}

impl From<String> for Priority {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    pub title: String,
    pub content: String,
    pub category: NotificationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// The frame the event was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl NotificationEvent {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: NotificationCategory,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category,
            priority: None,
            payload: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// The status-line text: `"<title>: <content>"`.
    pub fn status_text(&self) -> String {
        format!("{}: {}", self.title, self.content)
    }
}
