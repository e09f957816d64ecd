//! Team and membership models.

use serde::{Deserialize, Serialize};

/// A team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

/// Nested user summary attached to a membership row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// A membership row. The server either flattens the user fields onto the
/// row or nests them under `user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    #[serde(default)]
    pub team_id: Option<i64>,
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, alias = "created_at")]
    pub joined_at: Option<String>,
    #[serde(default)]
    pub user: Option<MemberUser>,
}

impl TeamMember {
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.user.as_ref().map(|u| u.username.clone()))
            .unwrap_or_else(|| format!("user #{}", self.user_id))
    }

    pub fn is_team_admin(&self) -> bool {
        self.role == "team_admin"
    }
}

/// Body for creating or updating a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body for adding a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberInput {
    pub user_id: i64,
    pub role: String,
}
