//! Socket transports.
//!
//! A transport opens one connection and hands back a [`Link`]: a pair of
//! channels carrying outbound commands and inbound events. The link ends
//! with exactly one `Closed` event, or with the inbound channel closing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use wl_core::constants::{CLOSE_ABNORMAL, CLOSE_NO_STATUS};
use wl_core::error::{WlError, WlResult};

/// Command for the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text(String),
    Close { code: u16, reason: String },
}

/// Something observed on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(String),
    Closed { code: u16, reason: String },
    Error(String),
}

/// An open connection.
///
/// Dropping `outbound` closes the connection without a close frame.
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::UnboundedSender<Outbound>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Opens connections to a socket endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open one connection to `url` (credential already in the query).
    async fn open(&self, url: &str) -> WlResult<Link>;
}

// ---------------------------------------------------------------------------
// WebSocket
// ---------------------------------------------------------------------------

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport over `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsTransport {
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for WsTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn open(&self, url: &str) -> WlResult<Link> {
        let (stream, _response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| WlError::Timeout("websocket handshake".into()))?
            .map_err(|e| WlError::Socket(format!("connect failed: {e}")))?;

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        tokio::spawn(pump(stream, out_rx, in_tx));

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

/// Move frames between the socket and the link until either side closes.
async fn pump(
    stream: WsStream,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    inbound: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = write.send(Message::Text(text)).await {
                        let _ = inbound.send(TransportEvent::Error(e.to_string()));
                        let _ = inbound.send(TransportEvent::Closed {
                            code: CLOSE_ABNORMAL,
                            reason: String::new(),
                        });
                        break;
                    }
                }
                Some(Outbound::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        debug!("close frame not sent: {e}");
                    }
                    break;
                }
                None => {
                    let _ = write.close().await;
                    break;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    if inbound.send(TransportEvent::Message(text)).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                        None => (CLOSE_NO_STATUS, String::new()),
                    };
                    info!("server closed socket with code {code}");
                    let _ = inbound.send(TransportEvent::Closed { code, reason });
                    break;
                }
                // Pings are answered by tungstenite; binary frames carry nothing for us.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("socket read error: {e}");
                    let _ = inbound.send(TransportEvent::Error(e.to_string()));
                    let _ = inbound.send(TransportEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    break;
                }
                None => {
                    let _ = inbound.send(TransportEvent::Closed {
                        code: CLOSE_ABNORMAL,
                        reason: String::new(),
                    });
                    break;
                }
            }
        }
    }
    debug!("socket pump stopped");
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// In-process transport. Every successful `open` hands a [`ServerEnd`] to
/// the paired [`MemoryListener`].
#[derive(Debug)]
pub struct MemoryTransport {
    accepted: mpsc::UnboundedSender<ServerEnd>,
    fail_next: AtomicUsize,
    opens: AtomicUsize,
}

/// Receives the server side of each connection opened on a [`MemoryTransport`].
#[derive(Debug)]
pub struct MemoryListener {
    accepted: mpsc::UnboundedReceiver<ServerEnd>,
}

/// Server side of an in-memory connection.
#[derive(Debug)]
pub struct ServerEnd {
    /// The URL the client opened, including the token query.
    pub url: String,
    to_client: mpsc::UnboundedSender<TransportEvent>,
    from_client: mpsc::UnboundedReceiver<Outbound>,
}

impl MemoryTransport {
    pub fn new() -> (Self, MemoryListener) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                accepted: tx,
                fail_next: AtomicUsize::new(0),
                opens: AtomicUsize::new(0),
            },
            MemoryListener { accepted: rx },
        )
    }

    /// Refuse the next `n` opens.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Number of `open` calls so far, refused ones included.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn open(&self, url: &str) -> WlResult<Link> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        let refuse = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refuse {
            return Err(WlError::Socket("connection refused".into()));
        }

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let server = ServerEnd {
            url: url.to_string(),
            to_client: in_tx,
            from_client: out_rx,
        };
        self.accepted
            .send(server)
            .map_err(|_| WlError::Socket("listener dropped".into()))?;

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

impl MemoryListener {
    /// Next accepted connection; `None` once the transport is dropped.
    pub async fn accept(&mut self) -> Option<ServerEnd> {
        self.accepted.recv().await
    }

    pub fn try_accept(&mut self) -> Option<ServerEnd> {
        self.accepted.try_recv().ok()
    }
}

impl ServerEnd {
    /// Push a text frame to the client. Returns false once the client is gone.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.to_client
            .send(TransportEvent::Message(text.into()))
            .is_ok()
    }

    /// Close the connection with `code`.
    pub fn close(&self, code: u16) -> bool {
        self.to_client
            .send(TransportEvent::Closed {
                code,
                reason: String::new(),
            })
            .is_ok()
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.to_client
            .send(TransportEvent::Error(message.into()))
            .is_ok()
    }

    /// Next command from the client; `None` once the client dropped its link.
    pub async fn recv(&mut self) -> Option<Outbound> {
        self.from_client.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Outbound> {
        self.from_client.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_link_carries_both_directions() {
        let (transport, mut listener) = MemoryTransport::new();
        let mut link = transport.open("ws://memory/?token=t").await.unwrap();
        let mut server = listener.accept().await.unwrap();
        assert_eq!(server.url, "ws://memory/?token=t");

        link.outbound.send(Outbound::Text("hi".into())).unwrap();
        assert_eq!(server.recv().await, Some(Outbound::Text("hi".into())));

        assert!(server.send_text("hello"));
        assert_eq!(
            link.inbound.recv().await,
            Some(TransportEvent::Message("hello".into()))
        );

        drop(link);
        assert_eq!(server.recv().await, None);
    }

    #[tokio::test]
    async fn test_refused_opens_are_counted() {
        let (transport, mut listener) = MemoryTransport::new();
        transport.fail_next(2);
        assert!(transport.open("ws://memory/").await.is_err());
        assert!(transport.open("ws://memory/").await.is_err());
        assert!(transport.open("ws://memory/").await.is_ok());
        assert_eq!(transport.open_count(), 3);
        assert!(listener.try_accept().is_some());
        assert!(listener.try_accept().is_none());
    }

    #[tokio::test]
    async fn test_dropping_server_end_closes_inbound() {
        let (transport, mut listener) = MemoryTransport::new();
        let mut link = transport.open("ws://memory/").await.unwrap();
        let server = listener.accept().await.unwrap();
        server.close(4001);
        drop(server);
        assert_eq!(
            link.inbound.recv().await,
            Some(TransportEvent::Closed {
                code: 4001,
                reason: String::new()
            })
        );
        assert_eq!(link.inbound.recv().await, None);
    }
}
