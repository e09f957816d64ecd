//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "WorkLog";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api/v1";

/// Default WebSocket base URL.
pub const DEFAULT_WS_BASE: &str = "ws://localhost:8000";

/// Path of the message WebSocket endpoint, relative to the WebSocket base.
pub const WS_MESSAGES_PATH: &str = "/api/v1/ws/messages/";

/// Default REST request timeout in milliseconds.
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Default maximum number of reconnection attempts.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Default base delay for linear reconnect backoff, in milliseconds.
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 3_000;

/// Default interval between heartbeat frames, in seconds.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// WebSocket close code for a normal, intentional closure.
pub const CLOSE_NORMAL: u16 = 1000;

/// WebSocket close code reported for a close frame that carried no status.
pub const CLOSE_NO_STATUS: u16 = 1005;

/// WebSocket close code reported when the connection dropped without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// How long a status-line message stays visible, in milliseconds.
pub const DEFAULT_STATUS_DURATION_MS: u64 = 3_000;

/// Maximum number of toasts kept in the in-app notification list.
pub const DEFAULT_TOAST_CAPACITY: usize = 50;

/// Local storage schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;

/// Fixed keys used for persisted session state.
pub mod storage_keys {
    pub const TOKEN: &str = "token";
    pub const USER_ID: &str = "userId";
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const ROLE: &str = "role";

    /// Every key owned by the session; cleared together on logout.
    pub const SESSION: &[&str] = &[TOKEN, USER_ID, USERNAME, EMAIL, ROLE];
}

/// Wire `type` values understood by the client.
pub mod frame_types {
    pub const HEARTBEAT: &str = "heartbeat";
    pub const PONG: &str = "pong";
    pub const NEW_MESSAGE: &str = "new_message";
    pub const TASK_UPDATE: &str = "task_update";
    pub const TEAM_NOTIFICATION: &str = "team_notification";
    pub const TASK_NOTIFICATION: &str = "task_notification";
    pub const PROJECT_NOTIFICATION: &str = "project_notification";
    pub const SYSTEM_NOTIFICATION: &str = "system_notification";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_keys_cover_token_and_profile() {
        assert_eq!(storage_keys::SESSION.len(), 5);
        assert!(storage_keys::SESSION.contains(&storage_keys::TOKEN));
        assert!(storage_keys::SESSION.contains(&storage_keys::ROLE));
    }

    #[test]
    fn test_default_backoff_produces_three_second_steps() {
        let delays: Vec<u64> = (1..=3)
            .map(|n| DEFAULT_RECONNECT_BASE_DELAY_MS * n)
            .collect();
        assert_eq!(delays, vec![3_000, 6_000, 9_000]);
    }
}
