//! User endpoints.

use wl_core::error::WlResult;
use wl_models::models::user::{User, UserUpdate};

use crate::client::ApiClient;

impl ApiClient {
    pub async fn list_users(&self) -> WlResult<Vec<User>> {
        self.get_json("/users").await
    }

    pub async fn get_user(&self, id: i64) -> WlResult<User> {
        self.get_json(&format!("/users/{id}")).await
    }

    pub async fn update_user(&self, id: i64, update: &UserUpdate) -> WlResult<User> {
        self.put_json(&format!("/users/{id}"), update).await
    }
}
