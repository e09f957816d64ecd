//! Task endpoints.

use serde_json::{json, Value};

use wl_core::error::WlResult;
use wl_models::models::page::ListBody;
use wl_models::models::task::{Task, TaskFilter, TaskInput, TaskStatistics, TaskStatus};

use crate::client::ApiClient;

impl ApiClient {
    /// List tasks matching the filter. Returns the page and the server total.
    pub async fn list_tasks(&self, filter: &TaskFilter) -> WlResult<(Vec<Task>, u64)> {
        let body: ListBody<Task> = self.get_json_query("/tasks", filter).await?;
        let total = body.total();
        Ok((body.into_items(), total))
    }

    pub async fn get_task(&self, id: i64) -> WlResult<Task> {
        self.get_json(&format!("/tasks/{id}")).await
    }

    pub async fn create_task(&self, input: &TaskInput) -> WlResult<Task> {
        self.post_json("/tasks", input).await
    }

    pub async fn update_task(&self, id: i64, input: &TaskInput) -> WlResult<Task> {
        self.put_json(&format!("/tasks/{id}"), input).await
    }

    pub async fn delete_task(&self, id: i64) -> WlResult<()> {
        self.delete(&format!("/tasks/{id}")).await
    }

    /// Move a task to another workflow status.
    pub async fn update_task_status(&self, id: i64, status: TaskStatus) -> WlResult<Task> {
        let input = TaskInput {
            status: Some(status),
            ..TaskInput::default()
        };
        self.update_task(id, &input).await
    }

    /// Claim an unassigned task for the current user.
    pub async fn claim_task(&self, id: i64) -> WlResult<()> {
        let _: Value = self.post_empty(&format!("/tasks/{id}/claim")).await?;
        Ok(())
    }

    pub async fn assign_task(&self, id: i64, assignee_id: i64) -> WlResult<Task> {
        self.post_json(
            &format!("/tasks/{id}/assign"),
            &json!({ "assignee_id": assignee_id }),
        )
        .await
    }

    /// Aggregate counters, optionally scoped to a team or project.
    pub async fn task_statistics(
        &self,
        team_id: Option<i64>,
        project_id: Option<i64>,
    ) -> WlResult<TaskStatistics> {
        let mut query: Vec<(&str, i64)> = Vec::new();
        if let Some(team_id) = team_id {
            query.push(("team_id", team_id));
        }
        if let Some(project_id) = project_id {
            query.push(("project_id", project_id));
        }
        self.get_json_query("/tasks/statistics", &query).await
    }
}
