//! Session gate.
//!
//! Owns the bearer credential. Setting it persists the token, hands it to
//! the desktop shell and the REST client, and publishes it on a watch
//! channel; the realtime service connects on the none→some transition and
//! disconnects on some→none.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use wl_api::ApiClient;
use wl_core::constants::storage_keys;
use wl_core::error::WlResult;
use wl_models::{KeyValueStore, LoginResponse, UserProfile};

use crate::shell::{log_failure, DesktopShell};

/// Holder of the current credential. Clones share state.
#[derive(Clone)]
pub struct SessionGate {
    store: Arc<dyn KeyValueStore>,
    shell: Arc<dyn DesktopShell>,
    api: Option<ApiClient>,
    credential: Arc<watch::Sender<Option<String>>>,
}

impl SessionGate {
    /// Build the gate, restoring a persisted token if there is one.
    pub async fn new(
        store: Arc<dyn KeyValueStore>,
        shell: Arc<dyn DesktopShell>,
        api: Option<ApiClient>,
    ) -> WlResult<Self> {
        let restored = store
            .get(storage_keys::TOKEN)?
            .filter(|token| !token.is_empty());

        if let Some(token) = restored.as_deref() {
            debug!("restored persisted session");
            log_failure("update_token", shell.update_token(Some(token)));
        }
        if let Some(api) = &api {
            api.set_token(restored.clone()).await;
        }

        let (credential, _) = watch::channel(restored);
        Ok(Self {
            store,
            shell,
            api,
            credential: Arc::new(credential),
        })
    }

    /// The current credential.
    pub fn credential(&self) -> Option<String> {
        self.credential.borrow().clone()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.borrow().is_some()
    }

    /// Watch credential changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.credential.subscribe()
    }

    pub fn api(&self) -> Option<&ApiClient> {
        self.api.as_ref()
    }

    /// Install a new credential. An empty token clears the session.
    pub async fn set_credential(&self, token: &str) -> WlResult<()> {
        if token.is_empty() {
            return self.clear().await.map(|_| ());
        }

        self.store.set(storage_keys::TOKEN, token)?;
        log_failure("update_token", self.shell.update_token(Some(token)));
        if let Some(api) = &self.api {
            api.set_token(Some(token.to_string())).await;
        }

        self.credential.send_if_modified(|current| {
            if current.as_deref() == Some(token) {
                false
            } else {
                *current = Some(token.to_string());
                true
            }
        });
        Ok(())
    }

    /// Install the credential and profile from a login response.
    pub async fn set_session(&self, login: &LoginResponse) -> WlResult<()> {
        if let Some(user) = &login.user {
            UserProfile::from(user).save(self.store.as_ref())?;
        }
        self.set_credential(&login.access_token).await?;
        info!("session started");
        Ok(())
    }

    /// The persisted profile, if any.
    pub fn profile(&self) -> WlResult<Option<UserProfile>> {
        UserProfile::load(self.store.as_ref())
    }

    pub fn save_profile(&self, profile: &UserProfile) -> WlResult<()> {
        profile.save(self.store.as_ref())
    }

    /// End the session: claim the credential, remove the token and profile
    /// together, then clear the shell and REST credentials.
    ///
    /// Returns whether a credential was set. Of several concurrent callers
    /// exactly one sees `true`. The in-memory credential is cleared even
    /// when storage fails.
    pub async fn clear(&self) -> WlResult<bool> {
        let was_set = self.credential.send_replace(None).is_some();

        let removed = self.store.remove_many(storage_keys::SESSION);
        if let Err(e) = &removed {
            warn!("failed to remove persisted session: {e}");
        }

        log_failure("update_token", self.shell.update_token(None));
        if let Some(api) = &self.api {
            api.set_token(None).await;
        }

        if was_set {
            info!("session cleared");
        }
        removed.map(|_| was_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wl_models::{MemoryStore, User};

    use crate::shell::NativeShell;

    fn user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": 7, "username": "alice", "email": "a@x.io", "role": "admin"
        }))
        .unwrap()
    }

    async fn gate(store: Arc<MemoryStore>, shell: Arc<NativeShell>) -> SessionGate {
        SessionGate::new(store, shell, None).await.unwrap()
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let gate = gate(Arc::new(MemoryStore::new()), Arc::new(NativeShell::default())).await;
        assert!(!gate.has_credential());
        assert!(gate.profile().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restores_persisted_token() {
        let store = Arc::new(MemoryStore::new());
        store.set(storage_keys::TOKEN, "persisted").unwrap();
        let shell = Arc::new(NativeShell::default());
        let gate = gate(store, shell.clone()).await;
        assert_eq!(gate.credential().as_deref(), Some("persisted"));
        assert_eq!(shell.token().as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn test_set_credential_persists_and_propagates() {
        let store = Arc::new(MemoryStore::new());
        let shell = Arc::new(NativeShell::default());
        let gate = gate(store.clone(), shell.clone()).await;
        let mut rx = gate.subscribe();

        gate.set_credential("tok").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some("tok"));
        assert_eq!(store.get(storage_keys::TOKEN).unwrap().as_deref(), Some("tok"));
        assert_eq!(shell.token().as_deref(), Some("tok"));

        // Same token again does not wake watchers.
        gate.set_credential("tok").await.unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_set_session_saves_profile() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate(store, Arc::new(NativeShell::default())).await;
        let login = LoginResponse {
            access_token: "tok".into(),
            token_type: "bearer".into(),
            user: Some(user()),
        };
        gate.set_session(&login).await.unwrap();
        let profile = gate.profile().unwrap().unwrap();
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.user_id, "7");
        assert!(profile.is_admin());
    }

    #[tokio::test]
    async fn test_clear_removes_every_session_key() {
        let store = Arc::new(MemoryStore::new());
        store.set("unrelated", "keep").unwrap();
        let shell = Arc::new(NativeShell::default());
        let gate = gate(store.clone(), shell.clone()).await;
        gate.set_session(&LoginResponse {
            access_token: "tok".into(),
            token_type: "bearer".into(),
            user: Some(user()),
        })
        .await
        .unwrap();

        assert!(gate.clear().await.unwrap());
        assert!(!gate.clear().await.unwrap());

        assert!(!gate.has_credential());
        assert_eq!(shell.token(), None);
        assert_eq!(store.keys().unwrap(), vec!["unrelated".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_token_clears() {
        let gate = gate(Arc::new(MemoryStore::new()), Arc::new(NativeShell::default())).await;
        gate.set_credential("tok").await.unwrap();
        gate.set_credential("").await.unwrap();
        assert!(!gate.has_credential());
    }
}
