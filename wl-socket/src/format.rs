//! Notification text for socket frames.
//!
//! Every builder takes the frame's flat field view and never fails: missing
//! or empty fields are replaced by placeholders.

use serde_json::Value;

use wl_models::{MessageNotification, NotificationCategory, NotificationEvent, Priority};

use crate::frame::FrameKind;

/// Non-empty string field.
fn text<'a>(fields: &'a Value, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn nested_text<'a>(fields: &'a Value, outer: &str, key: &str) -> Option<&'a str> {
    fields.get(outer).and_then(|inner| text(inner, key))
}

fn priority(fields: &Value) -> Option<Priority> {
    text(fields, "priority").map(Priority::from_label)
}

fn finish(event: NotificationEvent, fields: &Value) -> NotificationEvent {
    let event = match priority(fields) {
        Some(p) => event.with_priority(p),
        None => event,
    };
    event.with_payload(fields.clone())
}

/// Body line of a task notification, by `notification_type`.
pub fn task_content(fields: &Value) -> String {
    let title = text(fields, "task_title").unwrap_or("Unknown task");
    match text(fields, "notification_type") {
        Some("task_assigned") => {
            let assignee = text(fields, "assignee_name").unwrap_or("you");
            format!("Task \"{title}\" has been assigned to {assignee}")
        }
        Some("task_status_changed") => {
            let old = nested_text(fields, "extra_data", "old_status").unwrap_or("unknown");
            let new = nested_text(fields, "extra_data", "new_status")
                .or_else(|| text(fields, "task_status"))
                .unwrap_or("unknown");
            format!("Task \"{title}\" status changed from {old} to {new}")
        }
        Some("task_created") => {
            let creator = text(fields, "creator_name").unwrap_or("unknown");
            format!("New task \"{title}\" was created by {creator}")
        }
        _ => format!("Task \"{title}\" has a new update"),
    }
}

/// Body line of a project notification, by `notification_type`.
pub fn project_content(fields: &Value) -> String {
    let name = text(fields, "project_name").unwrap_or("Unknown project");
    match text(fields, "notification_type") {
        Some("project_created") => {
            let creator = text(fields, "creator_name").unwrap_or("unknown");
            format!("New project \"{name}\" was created by {creator}")
        }
        _ => format!("Project \"{name}\" has a new update"),
    }
}

pub fn task_notification(fields: &Value) -> NotificationEvent {
    let title = format!(
        "Task notification: {}",
        text(fields, "task_title").unwrap_or("Unknown task")
    );
    finish(
        NotificationEvent::new(title, task_content(fields), NotificationCategory::Task),
        fields,
    )
}

pub fn project_notification(fields: &Value) -> NotificationEvent {
    let title = format!(
        "Project notification: {}",
        text(fields, "project_name").unwrap_or("Unknown project")
    );
    finish(
        NotificationEvent::new(title, project_content(fields), NotificationCategory::Project),
        fields,
    )
}

pub fn system_notification(fields: &Value) -> NotificationEvent {
    let title = text(fields, "title").unwrap_or("System notification");
    let content = text(fields, "content").unwrap_or("You have a new system notification");
    finish(
        NotificationEvent::new(title, content, NotificationCategory::System),
        fields,
    )
}

/// Event for one of the built-in notification frames; `None` for any other kind.
pub fn notification_for(kind: &FrameKind, fields: &Value) -> Option<NotificationEvent> {
    match kind {
        FrameKind::TaskNotification => Some(task_notification(fields)),
        FrameKind::ProjectNotification => Some(project_notification(fields)),
        FrameKind::SystemNotification => Some(system_notification(fields)),
        _ => None,
    }
}

/// Event for a pushed inbox message. Unknown message types are shown as task
/// notifications.
pub fn new_message(message: &MessageNotification) -> NotificationEvent {
    let category = match message.message_type.as_str() {
        "team" => NotificationCategory::Team,
        "system" => NotificationCategory::System,
        "worklog" => NotificationCategory::Worklog,
        "project" => NotificationCategory::Project,
        _ => NotificationCategory::Task,
    };
    let mut event = NotificationEvent::new(&message.title, &message.content, category);
    if let Some(p) = message.priority.as_deref() {
        event = event.with_priority(Priority::from_label(p));
    }
    match serde_json::to_value(message) {
        Ok(payload) => event.with_payload(payload),
        Err(_) => event,
    }
}

/// Event for a `task_update` frame's data.
pub fn task_update(data: &Value) -> NotificationEvent {
    let title = text(data, "title").unwrap_or("Unknown task");
    NotificationEvent::new(
        "Task update",
        format!("Task \"{title}\" status was updated"),
        NotificationCategory::Task,
    )
    .with_payload(data.clone())
}

/// Event for a `team_notification` frame's data.
pub fn team_notification(data: &Value) -> NotificationEvent {
    let title = text(data, "title").unwrap_or("Team notification");
    let content = text(data, "message")
        .or_else(|| text(data, "content"))
        .unwrap_or("You have a new team notification");
    NotificationEvent::new(title, content, NotificationCategory::Team).with_payload(data.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_assigned() {
        let event = task_notification(&json!({
            "notification_type": "task_assigned",
            "task_title": "Write docs",
            "assignee_name": "bob"
        }));
        assert_eq!(event.title, "Task notification: Write docs");
        assert_eq!(event.content, "Task \"Write docs\" has been assigned to bob");
        assert_eq!(event.category, NotificationCategory::Task);

        let to_me = task_content(&json!({
            "notification_type": "task_assigned",
            "task_title": "Write docs"
        }));
        assert_eq!(to_me, "Task \"Write docs\" has been assigned to you");
    }

    #[test]
    fn test_task_status_changed_fallbacks() {
        let full = task_content(&json!({
            "notification_type": "task_status_changed",
            "task_title": "Deploy",
            "extra_data": {"old_status": "pending", "new_status": "review"}
        }));
        assert_eq!(full, "Task \"Deploy\" status changed from pending to review");

        let from_task_status = task_content(&json!({
            "notification_type": "task_status_changed",
            "task_title": "Deploy",
            "task_status": "completed"
        }));
        assert_eq!(
            from_task_status,
            "Task \"Deploy\" status changed from unknown to completed"
        );

        let bare = task_content(&json!({"notification_type": "task_status_changed"}));
        assert_eq!(
            bare,
            "Task \"Unknown task\" status changed from unknown to unknown"
        );
    }

    #[test]
    fn test_task_created_and_default() {
        assert_eq!(
            task_content(&json!({"notification_type": "task_created", "task_title": "A"})),
            "New task \"A\" was created by unknown"
        );
        assert_eq!(
            task_content(&json!({"notification_type": "task_deleted", "task_title": "A"})),
            "Task \"A\" has a new update"
        );
        let event = task_notification(&json!({}));
        assert_eq!(event.title, "Task notification: Unknown task");
        assert_eq!(event.content, "Task \"Unknown task\" has a new update");
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let event = task_notification(&json!({"task_title": "", "notification_type": ""}));
        assert_eq!(event.title, "Task notification: Unknown task");
    }

    #[test]
    fn test_project_variants() {
        let created = project_notification(&json!({
            "notification_type": "project_created",
            "project_name": "Apollo",
            "creator_name": "ann"
        }));
        assert_eq!(created.title, "Project notification: Apollo");
        assert_eq!(created.content, "New project \"Apollo\" was created by ann");
        assert_eq!(created.category, NotificationCategory::Project);

        let other = project_notification(&json!({}));
        assert_eq!(other.title, "Project notification: Unknown project");
        assert_eq!(other.content, "Project \"Unknown project\" has a new update");
    }

    #[test]
    fn test_system_notification() {
        let event = system_notification(&json!({"title": "Maintenance", "content": "At 22:00", "priority": "urgent"}));
        assert_eq!(event.status_text(), "Maintenance: At 22:00");
        assert_eq!(event.priority, Some(Priority::Urgent));

        let bare = system_notification(&json!({}));
        assert_eq!(bare.title, "System notification");
        assert_eq!(bare.content, "You have a new system notification");
        assert_eq!(bare.category, NotificationCategory::System);
    }

    #[test]
    fn test_notification_for_only_builtin_kinds() {
        assert!(notification_for(&FrameKind::NewMessage, &json!({})).is_none());
        assert!(notification_for(&FrameKind::Other("x".into()), &json!({})).is_none());
        let event = notification_for(&FrameKind::SystemNotification, &json!({"title": "t"})).unwrap();
        assert_eq!(event.payload.unwrap()["title"], "t");
    }

    #[test]
    fn test_new_message_category_follows_type() {
        let mut message: MessageNotification = serde_json::from_value(json!({
            "id": 1, "title": "Hi", "content": "there", "message_type": "team", "priority": "low"
        }))
        .unwrap();
        let event = new_message(&message);
        assert_eq!(event.category, NotificationCategory::Team);
        assert_eq!(event.priority, Some(Priority::Low));

        message.message_type = "user".into();
        assert_eq!(new_message(&message).category, NotificationCategory::Task);
    }

    #[test]
    fn test_task_update_and_team_notification() {
        let update = task_update(&json!({"title": "Refactor"}));
        assert_eq!(update.status_text(), "Task update: Task \"Refactor\" status was updated");

        assert_eq!(
            team_notification(&json!({"message": "Standup moved"})).status_text(),
            "Team notification: Standup moved"
        );
        assert_eq!(
            team_notification(&json!({"title": "Ops", "content": "Rota"})).status_text(),
            "Ops: Rota"
        );
        assert_eq!(
            team_notification(&Value::Null).content,
            "You have a new team notification"
        );
    }
}
