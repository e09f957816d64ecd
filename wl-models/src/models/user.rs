//! User and authentication models.

use serde::{Deserialize, Serialize};

use wl_core::constants::storage_keys;
use wl_core::error::WlResult;

use crate::storage::KeyValueStore;

/// A user account as returned by `/users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub reminder_interval: Option<i64>,
    #[serde(default)]
    pub work_hours_start: Option<String>,
    #[serde(default)]
    pub work_hours_end: Option<String>,
    #[serde(default)]
    pub reminder_enabled: Option<bool>,
    #[serde(default)]
    pub notification_method: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Token response of `POST /users/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Body of `POST /users/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial update body of `PUT /users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_method: Option<String>,
}

/// The profile fields persisted alongside the session token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

impl UserProfile {
    /// Load the persisted profile; `None` if no username is stored.
    pub fn load(store: &dyn KeyValueStore) -> WlResult<Option<Self>> {
        let Some(username) = store.get(storage_keys::USERNAME)? else {
            return Ok(None);
        };
        Ok(Some(Self {
            user_id: store.get(storage_keys::USER_ID)?.unwrap_or_default(),
            username,
            email: store.get(storage_keys::EMAIL)?.unwrap_or_default(),
            role: store.get(storage_keys::ROLE)?.unwrap_or_default(),
        }))
    }

    /// Persist every profile field.
    pub fn save(&self, store: &dyn KeyValueStore) -> WlResult<()> {
        store.set(storage_keys::USER_ID, &self.user_id)?;
        store.set(storage_keys::USERNAME, &self.username)?;
        store.set(storage_keys::EMAIL, &self.email)?;
        store.set(storage_keys::ROLE, &self.role)?;
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
