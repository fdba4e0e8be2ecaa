//! Configuration for the console host.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cue_core::{CommandChannel, CommandSink, DrainOrder, HttpCommandSender, RenameTable, WsConnector};

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Command transport settings.
    pub channel: ChannelConfig,
    /// Which template the console drives.
    pub template: TemplateConfig,
    /// Raw parameter name to canonical name.
    pub renames: RenameTable,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// How commands reach the playout server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Persistent WebSocket with queue-while-connecting.
    Websocket,
    /// One HTTP POST per command.
    Http,
}

/// Command transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub transport: TransportKind,
    /// Endpoint used when `transport = "websocket"`.
    pub websocket_url: String,
    /// Endpoint used when `transport = "http"`.
    pub http_url: String,
    /// Flush order for commands queued while connecting: "lifo" or "fifo".
    pub drain_order: DrainOrder,
    /// How long to wait at exit for accepted commands to go out.
    pub close_timeout_ms: u64,
}

/// Bundled templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    LowerThird,
    MixerCycle,
    Placeholder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub kind: TemplateKind,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Optional log file path. If empty, logs to stderr.
    pub file: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            channel: ChannelConfig::default(),
            template: TemplateConfig::default(),
            renames: [("f0", "line1"), ("f1", "line2")].into_iter().collect(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Websocket,
            websocket_url: "ws://localhost:9001".into(),
            http_url: "http://127.0.0.1:9731/amcp".into(),
            drain_order: DrainOrder::Lifo,
            close_timeout_ms: 2000,
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            kind: TemplateKind::LowerThird,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: String::new(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl RemoteConfig {
    /// Load configuration from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the default configuration to a file (for bootstrapping).
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let cfg = Self::default();
        let text = toml::to_string_pretty(&cfg).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }
}

impl ChannelConfig {
    /// The endpoint of the selected transport.
    pub fn endpoint(&self) -> &str {
        match self.transport {
            TransportKind::Websocket => &self.websocket_url,
            TransportKind::Http => &self.http_url,
        }
    }

    /// Replace the endpoint of the selected transport.
    pub fn set_endpoint(&mut self, url: String) {
        match self.transport {
            TransportKind::Websocket => self.websocket_url = url,
            TransportKind::Http => self.http_url = url,
        }
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    /// Build the command sink for the selected transport.
    ///
    /// Must be called from within a Tokio runtime: the WebSocket channel
    /// spawns its driver immediately.
    pub fn build_sink(&self) -> Arc<dyn CommandSink> {
        match self.transport {
            TransportKind::Websocket => Arc::new(CommandChannel::spawn(
                WsConnector::new(&self.websocket_url),
                self.drain_order,
            )),
            TransportKind::Http => Arc::new(HttpCommandSender::new(&self.http_url)),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
