//! Team and membership endpoints.

use serde_json::json;

use wl_core::error::WlResult;
use wl_models::models::team::{MemberInput, Team, TeamInput, TeamMember};

use crate::client::ApiClient;

impl ApiClient {
    pub async fn list_teams(&self) -> WlResult<Vec<Team>> {
        self.get_json("/teams").await
    }

    pub async fn get_team(&self, id: i64) -> WlResult<Team> {
        self.get_json(&format!("/teams/{id}")).await
    }

    pub async fn create_team(&self, input: &TeamInput) -> WlResult<Team> {
        self.post_json("/teams", input).await
    }

    pub async fn update_team(&self, id: i64, input: &TeamInput) -> WlResult<Team> {
        self.put_json(&format!("/teams/{id}"), input).await
    }

    pub async fn delete_team(&self, id: i64) -> WlResult<()> {
        self.delete(&format!("/teams/{id}")).await
    }

    pub async fn list_team_members(&self, team_id: i64) -> WlResult<Vec<TeamMember>> {
        self.get_json(&format!("/teams/{team_id}/members")).await
    }

    pub async fn add_team_member(&self, team_id: i64, input: &MemberInput) -> WlResult<TeamMember> {
        self.post_json(&format!("/teams/{team_id}/members"), input).await
    }

    /// Change a member's role (`team_admin` or `team_member`).
    pub async fn update_team_member(
        &self,
        team_id: i64,
        member_id: i64,
        role: &str,
    ) -> WlResult<TeamMember> {
        self.put_json(
            &format!("/teams/{team_id}/members/{member_id}"),
            &json!({ "role": role }),
        )
        .await
    }

    pub async fn remove_team_member(&self, team_id: i64, member_id: i64) -> WlResult<()> {
        self.delete(&format!("/teams/{team_id}/members/{member_id}")).await
    }
}
