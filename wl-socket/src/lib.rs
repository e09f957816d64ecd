//! WorkLog Socket - real-time notification channel.
//!
//! This crate provides the client side of the backend's message socket:
//! - A `Transport` seam with a WebSocket implementation and an in-memory one
//! - A single-task controller that connects with a bearer token, reconnects
//!   with linear backoff, and sends a heartbeat while open
//! - A dispatcher that routes inbound frames by `type` to registered
//!   handlers or to notification broadcast channels
//! - The formatting rules that turn notification frames into user-facing text

pub mod dispatcher;
pub mod events;
pub mod format;
pub mod frame;
pub mod manager;
pub mod transport;

// Re-export key types
pub use dispatcher::{DispatchOutcome, Dispatcher, Handler};
pub use events::{ConnectionEvent, ConnectionState};
pub use frame::{FrameKind, InboundFrame};
pub use manager::{HeartbeatConfig, ReconnectConfig, SocketManager};
pub use transport::{
    Link, MemoryListener, MemoryTransport, Outbound, ServerEnd, Transport, TransportEvent,
    WsTransport,
};
