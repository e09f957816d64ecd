//! Authentication endpoints.

use serde_json::Value;
use tracing::info;

use wl_core::error::{WlError, WlResult};
use wl_models::models::user::{LoginResponse, RegisterRequest, User};

use crate::client::ApiClient;

impl ApiClient {
    /// Exchange username and password for a bearer token.
    ///
    /// The token is not installed on the client; the session gate decides
    /// when it becomes the active credential.
    pub async fn login(&self, username: &str, password: &str) -> WlResult<LoginResponse> {
        let form = [("username", username), ("password", password)];
        let resp: LoginResponse = self
            .post_form("/users/token", &form)
            .await
            .map_err(|e| match e {
                // On this endpoint 401 means bad credentials, not an expired session.
                WlError::SessionExpired => WlError::ServerError {
                    status: 401,
                    message: "Incorrect username or password".into(),
                },
                other => other,
            })?;
        info!("logged in as {username}");
        Ok(resp)
    }

    /// Create an account.
    pub async fn register(&self, request: &RegisterRequest) -> WlResult<User> {
        self.post_json("/users/register", request).await
    }

    /// Tell the server the session is over. The server may not implement
    /// this; failures are returned but callers usually ignore them.
    pub async fn logout(&self) -> WlResult<()> {
        let _: Value = self.post_empty("/users/logout").await?;
        Ok(())
    }

    /// The user owning the current token.
    pub async fn current_user(&self) -> WlResult<User> {
        self.get_json("/users/me").await
    }
}
