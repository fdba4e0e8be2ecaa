//! Domain-specific error types for cue.
//!
//! Fallible operations return `Result<T, CueError>`. Connection and decode
//! failures are recovered inside the crate; callers of `submit` and `decode`
//! only ever see [`CueError::ChannelClosed`] or nothing at all.

use thiserror::Error;

/// The canonical error type for cue.
#[derive(Debug, Error)]
pub enum CueError {
    // ── Connection Errors ────────────────────────────────────────
    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// The WebSocket handshake or stream failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The HTTP request could not be completed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The peer closed the connection.
    #[error("peer closed the connection")]
    PeerClosed,

    /// The channel driver has shut down and no longer accepts commands.
    #[error("channel closed")]
    ChannelClosed,

    // ── State Errors ─────────────────────────────────────────────
    /// A channel event arrived in a phase that does not accept it.
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    /// An event referred to a connection attempt that is no longer current.
    #[error("stale connection attempt {attempt}")]
    StaleAttempt { attempt: u64 },

    // ── Decoding Errors ──────────────────────────────────────────
    /// The payload is not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is not a well-formed XML document.
    #[error("xml error: {0}")]
    Xml(#[from] xmltree::ParseError),

    /// The document parsed but does not have the expected parameter shape.
    #[error("malformed parameters: {0}")]
    MalformedParams(&'static str),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for CueError {
    fn from(s: String) -> Self {
        CueError::Other(s)
    }
}

impl From<&str> for CueError {
    fn from(s: &str) -> Self {
        CueError::Other(s.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CueError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CueError::ChannelClosed
    }
}
