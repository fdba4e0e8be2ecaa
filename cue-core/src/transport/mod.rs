//! Transport seams.
//!
//! A [`Connector`] performs one handshake and yields a [`Link`]; the
//! channel driver never reuses either across failures. [`CommandSink`] is
//! what templates hold: it hides whether commands travel over a persistent
//! socket or one HTTP request each.

pub mod http;
pub mod websocket;

use async_trait::async_trait;

use crate::channel::LinkEvents;
use crate::error::CueError;

pub use http::HttpCommandSender;
pub use websocket::WsConnector;

/// Establishes a fresh connection to the control server.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Perform the handshake.
    ///
    /// The implementation must report the end of the connection through
    /// `events` once the link stops, and should stop any background work
    /// when [`LinkEvents::cancelled`] resolves.
    async fn connect(&self, events: LinkEvents) -> Result<Box<dyn Link>, CueError>;
}

/// The write half of an open connection.
#[async_trait]
pub trait Link: Send {
    /// Write one command as one message.
    async fn send(&mut self, command: &str) -> Result<(), CueError>;

    /// Close the connection. Errors are not reported; the link is being
    /// discarded either way.
    async fn close(&mut self);
}

/// Fire-and-forget command submission.
#[async_trait]
pub trait CommandSink: Send + Sync {
    fn submit(&self, command: String) -> Result<(), CueError>;

    /// Stop accepting commands and wait until accepted ones are delivered
    /// or can no longer be.
    async fn close(&self) {}

    /// Commands accepted but not yet delivered.
    fn pending_count(&self) -> usize {
        0
    }
}
