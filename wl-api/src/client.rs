//! HTTP client for the WorkLog backend.
//!
//! Handles bearer authentication, timeouts, status mapping, and envelope
//! parsing. Requests are never retried; a failed call is reported once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use wl_core::config::{AppConfig, ServerConfig};
use wl_core::error::{WlError, WlResult};

use crate::response::{error_detail, parse_body};

/// HTTP client for communicating with the WorkLog backend.
///
/// Cloning is cheap; clones share the connection pool and the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base URL for the API, including the version prefix.
    api_root: String,
    /// Bearer token attached to every request when present.
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new ApiClient from server configuration.
    pub fn new(config: &ServerConfig) -> WlResult<Self> {
        let inner = Client::builder()
            .timeout(config.api_timeout())
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| WlError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            api_root: AppConfig::sanitize_address(&config.api_base),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the API root URL.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Replace the bearer token. `None` or an empty string clears it.
    pub async fn set_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.is_empty());
        let mut guard = self.token.write().await;
        if token.is_some() {
            debug!("api token set");
        } else if guard.is_some() {
            debug!("api token cleared");
        }
        *guard = token;
    }

    /// Current bearer token.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    /// Build a request with the bearer token applied.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.inner.request(method, self.url(path));
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and map transport failures and error statuses.
    async fn execute(&self, method: &Method, path: &str, builder: RequestBuilder) -> WlResult<Response> {
        debug!("{method} {path}");
        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = status_error(status, path, &body);
        if err.is_session_expired() {
            // The stored credential is no longer accepted; stop sending it.
            *self.token.write().await = None;
        }
        warn!("{method} {path} failed: {err}");
        Err(err)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> WlResult<T> {
        let body = response
            .text()
            .await
            .map_err(|e| WlError::Http(format!("failed to read response body: {e}")))?;
        parse_body(&body)
    }

    // --- Public HTTP helpers ---

    /// GET + parse.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> WlResult<T> {
        let builder = self.request(Method::GET, path).await;
        let resp = self.execute(&Method::GET, path, builder).await?;
        Self::read_json(resp).await
    }

    /// GET with query parameters + parse.
    pub async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> WlResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).await.query(query);
        let resp = self.execute(&Method::GET, path, builder).await?;
        Self::read_json(resp).await
    }

    /// POST a JSON body + parse.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> WlResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        let resp = self.execute(&Method::POST, path, builder).await?;
        Self::read_json(resp).await
    }

    /// POST without a body + parse.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> WlResult<T> {
        let builder = self.request(Method::POST, path).await;
        let resp = self.execute(&Method::POST, path, builder).await?;
        Self::read_json(resp).await
    }

    /// POST a urlencoded form + parse.
    pub async fn post_form<T, F>(&self, path: &str, form: &F) -> WlResult<T>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let builder = self.request(Method::POST, path).await.form(form);
        let resp = self.execute(&Method::POST, path, builder).await?;
        Self::read_json(resp).await
    }

    /// PUT a JSON body + parse.
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> WlResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).await.json(body);
        let resp = self.execute(&Method::PUT, path, builder).await?;
        Self::read_json(resp).await
    }

    /// PUT with query parameters and no body + parse.
    pub async fn put_query<T, Q>(&self, path: &str, query: &Q) -> WlResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::PUT, path).await.query(query);
        let resp = self.execute(&Method::PUT, path, builder).await?;
        Self::read_json(resp).await
    }

    /// DELETE; the response body is ignored.
    pub async fn delete(&self, path: &str) -> WlResult<()> {
        let builder = self.request(Method::DELETE, path).await;
        self.execute(&Method::DELETE, path, builder).await?;
        Ok(())
    }
}

/// Map a non-success status and its body onto an error.
pub(crate) fn status_error(status: StatusCode, path: &str, body: &str) -> WlError {
    let detail = error_detail(body);
    match status {
        StatusCode::UNAUTHORIZED => WlError::SessionExpired,
        StatusCode::FORBIDDEN => WlError::Forbidden(if detail.is_empty() {
            path.to_string()
        } else {
            detail
        }),
        StatusCode::NOT_FOUND => WlError::NotFound(path.to_string()),
        _ => WlError::ServerError {
            status: status.as_u16(),
            message: detail,
        },
    }
}

/// Classify a reqwest error into a WlError variant.
fn classify_error(e: reqwest::Error) -> WlError {
    if e.is_timeout() {
        WlError::Timeout(e.to_string())
    } else if e.is_connect() {
        WlError::Http(format!("connection failed: {e}"))
    } else if e.is_decode() {
        WlError::Serialization(e.to_string())
    } else {
        WlError::Http(e.to_string())
    }
}
