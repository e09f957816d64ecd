//! Connection state and lifecycle events.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// State of the socket connection.
///
/// While a reconnect is scheduled the state stays `Connecting`; the backoff
/// wait is part of the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Never connected.
    Idle,
    /// Opening, or waiting to retry.
    Connecting,
    /// Connected; frames flow and heartbeats are sent.
    Open,
    /// A client-initiated close is in progress.
    Closing,
    /// Closed and not retrying.
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a new `connect()` would be ignored.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Open | Self::Connecting)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Lifecycle events published by the socket manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The connection opened; the retry budget was reset.
    Connected,
    /// The connection closed with the given code.
    Disconnected { code: u16 },
    /// A reconnect was scheduled.
    Reconnecting { attempt: u32, delay: Duration },
    /// The retry budget is spent; no further reconnects are scheduled.
    Failed { attempts: u32 },
    /// A transport error was observed.
    Error { message: String },
}

impl fmt::Display for ConnectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected { code } => write!(f, "disconnected (code {code})"),
            Self::Reconnecting { attempt, delay } => {
                write!(f, "reconnect #{attempt} in {}s", delay.as_secs())
            }
            Self::Failed { attempts } => write!(f, "gave up after {attempts} attempt(s)"),
            Self::Error { message } => write!(f, "error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Idle.to_string(), "idle");
        assert_eq!(ConnectionState::Open.to_string(), "open");
        assert_eq!(ConnectionState::Closing.to_string(), "closing");
    }

    #[test]
    fn test_active_states() {
        assert!(ConnectionState::Open.is_active());
        assert!(ConnectionState::Connecting.is_active());
        assert!(!ConnectionState::Closed.is_active());
        assert!(!ConnectionState::Idle.is_active());
        assert!(ConnectionState::Open.is_open());
    }

    #[test]
    fn test_event_display() {
        let event = ConnectionEvent::Reconnecting {
            attempt: 2,
            delay: Duration::from_secs(6),
        };
        assert_eq!(event.to_string(), "reconnect #2 in 6s");
        assert_eq!(
            ConnectionEvent::Failed { attempts: 5 }.to_string(),
            "gave up after 5 attempt(s)"
        );
    }
}
