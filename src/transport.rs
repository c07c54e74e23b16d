//! Duplex byte-frame transport abstraction.
//!
//! The WebSocket transport itself is an external collaborator (§1): this
//! crate never dials a socket. Instead it asks for anything that can hand it
//! whole UTF-8 text frames in both directions, the same split the teacher
//! crate draws between its length-prefixed stdio transport
//! (`imp::core::transport::{Reader, Writer}`) and the JSON it carries.
//! A consumer adapts a real WebSocket (e.g. `tokio-tungstenite`) to this
//! trait.

use futures::future::BoxFuture;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("transport closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// One direction of a WebSocket-equivalent duplex channel, carrying whole
/// text frames (no fragmentation, no ping/pong — those are a WebSocket
/// library's concern, not the proxy's).
pub trait Transport: Send + Sync {
    fn send(&self, text: String) -> BoxFuture<'_, Result<(), TransportError>>;

    /// Returns `Ok(None)` when the peer closed the stream cleanly.
    fn recv(&self) -> BoxFuture<'_, Result<Option<String>, TransportError>>;
}

/// An in-memory [`Transport`] for tests, exercised by both this crate's unit
/// tests and its `tests/` integration suite.
pub mod mock {
    use super::*;
    use tokio::sync::mpsc;
    use tokio::sync::Mutex;

    /// An in-memory [`Transport`] pair for tests: `outbox` records every
    /// frame sent through it, `inbox` feeds frames back to `recv`.
    pub struct MockTransport {
        pub outbox: mpsc::UnboundedSender<String>,
        inbox: Mutex<mpsc::UnboundedReceiver<String>>,
    }

    impl MockTransport {
        pub fn new() -> (std::sync::Arc<Self>, mpsc::UnboundedSender<String>, mpsc::UnboundedReceiver<String>) {
            let (out_tx, out_rx) = mpsc::unbounded_channel();
            let (in_tx, in_rx) = mpsc::unbounded_channel();
            (std::sync::Arc::new(Self { outbox: out_tx, inbox: Mutex::new(in_rx) }), in_tx, out_rx)
        }
    }

    impl Transport for MockTransport {
        fn send(&self, text: String) -> BoxFuture<'_, Result<(), TransportError>> {
            Box::pin(async move { self.outbox.send(text).map_err(|_| TransportError::Closed) })
        }

        fn recv(&self) -> BoxFuture<'_, Result<Option<String>, TransportError>> {
            Box::pin(async move { Ok(self.inbox.lock().await.recv().await) })
        }
    }
}
