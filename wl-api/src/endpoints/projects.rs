//! Project endpoints.

use wl_core::error::WlResult;
use wl_models::models::page::ListBody;
use wl_models::models::project::{Project, ProjectInput};

use crate::client::ApiClient;

impl ApiClient {
    /// List projects, optionally limited to one team.
    pub async fn list_projects(&self, team_id: Option<i64>) -> WlResult<Vec<Project>> {
        let body: ListBody<Project> = match team_id {
            Some(team_id) => self.get_json_query("/projects", &[("team_id", team_id)]).await?,
            None => self.get_json("/projects").await?,
        };
        Ok(body.into_items())
    }

    pub async fn get_project(&self, id: i64) -> WlResult<Project> {
        self.get_json(&format!("/projects/{id}")).await
    }

    pub async fn create_project(&self, input: &ProjectInput) -> WlResult<Project> {
        self.post_json("/projects", input).await
    }

    pub async fn update_project(&self, id: i64, input: &ProjectInput) -> WlResult<Project> {
        self.put_json(&format!("/projects/{id}"), input).await
    }

    pub async fn delete_project(&self, id: i64) -> WlResult<()> {
        self.delete(&format!("/projects/{id}")).await
    }
}
