//! # cue-core
//!
//! Client-side plumbing for driving broadcast graphics templates.
//!
//! This crate contains:
//! - **Channel**: `CommandChannel`, a queue-while-connecting command channel
//!   that reconnects on demand, driven by the pure `ChannelState` machine
//! - **Transport**: the `Connector`/`Link` seams, a WebSocket connector and
//!   an HTTP POST sender, both usable through `CommandSink`
//! - **Params**: `decode`, which turns JSON or XML template data into one
//!   key/value map and applies a `RenameTable`
//! - **Template**: the `Template` lifecycle hooks (play/stop/next/update)
//! - **Error**: `CueError`, a `thiserror`-based error hierarchy

pub mod channel;
pub mod error;
pub mod params;
pub mod template;
pub mod transport;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use channel::{ChannelPhase, ChannelState, CommandChannel, DrainOrder, LinkEvents};
pub use error::CueError;
pub use params::{ParamMap, RenameTable, decode};
pub use template::Template;
pub use transport::{CommandSink, Connector, HttpCommandSender, Link, WsConnector};
