//! Pure channel state machine.
//!
//! `ChannelState` owns the connection phase and the outgoing queue. It
//! performs no I/O: every event returns the [`Action`]s the driver must
//! carry out, which keeps the ordering rules testable without sockets.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::CueError;

// ── ChannelPhase ─────────────────────────────────────────────────

/// The lifecycle phase of the channel's single connection.
///
/// ```text
///  Absent ──► Connecting ──► Open
///    ▲            │           │
///    │            ▼           ▼
///    └───(submit)── Failed ◄──┘
/// ```
///
/// `Absent` and `Failed` behave the same for `submit`: both start a fresh
/// handshake. `Failed` only keeps the reason around for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChannelPhase {
    /// No connection has been attempted yet.
    #[default]
    Absent,

    /// Handshake in flight.
    Connecting { attempt: u64 },

    /// Handshake complete; commands are transmitted directly.
    Open {
        attempt: u64,
        /// When the connection entered the `Open` phase.
        since: Instant,
    },

    /// The last connection was discarded after a failure.
    Failed { attempt: u64, reason: String },
}

impl std::fmt::Display for ChannelPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Connecting { .. } => write!(f, "Connecting"),
            Self::Open { .. } => write!(f, "Open"),
            Self::Failed { .. } => write!(f, "Failed"),
        }
    }
}

impl ChannelPhase {
    /// Returns `true` when commands go straight to the wire.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Returns `true` after a connection attempt or link was discarded.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns `true` when the next submission must start a handshake.
    pub fn needs_connect(&self) -> bool {
        matches!(self, Self::Absent | Self::Failed { .. })
    }

    /// The attempt that owns the live connection, if any.
    pub fn live_attempt(&self) -> Option<u64> {
        match self {
            Self::Connecting { attempt } | Self::Open { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }
}

// ── DrainOrder ───────────────────────────────────────────────────

/// Order in which queued commands are flushed when a connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOrder {
    /// Most recently queued command first. Matches the deployed clients,
    /// which keep pending commands on a stack.
    #[default]
    Lifo,
    /// Submission order. Opt-in correction of the stack behaviour.
    Fifo,
}

// ── Action ───────────────────────────────────────────────────────

/// Side effect requested by the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a handshake tagged with `attempt`.
    Connect { attempt: u64 },
    /// Write this command to the open link.
    Transmit(String),
}

// ── ChannelState ─────────────────────────────────────────────────

/// Connection phase plus the outgoing queue.
#[derive(Debug, Default)]
pub struct ChannelState {
    phase: ChannelPhase,
    /// Commands accepted while not open. Pushed at the back; drained from
    /// the back (LIFO) or the front (FIFO).
    pending: Vec<String>,
    last_attempt: u64,
    order: DrainOrder,
}

impl ChannelState {
    pub fn new(order: DrainOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> &ChannelPhase {
        &self.phase
    }

    /// Number of commands waiting for a connection.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ── Events ───────────────────────────────────────────────────

    /// Accept a command from the caller.
    ///
    /// Starts a handshake when there is no live connection, then either
    /// queues the command or asks for it to be transmitted right away.
    pub fn submit(&mut self, command: String) -> Vec<Action> {
        let mut actions = Vec::new();

        if self.phase.needs_connect() {
            self.last_attempt += 1;
            self.phase = ChannelPhase::Connecting {
                attempt: self.last_attempt,
            };
            actions.push(Action::Connect {
                attempt: self.last_attempt,
            });
        }

        if self.phase.is_open() {
            actions.push(Action::Transmit(command));
        } else {
            self.pending.push(command);
        }
        actions
    }

    /// The handshake for `attempt` succeeded.
    ///
    /// Valid from: `Connecting` with the same attempt. Returns the queued
    /// commands as `Transmit` actions in drain order.
    pub fn opened(&mut self, attempt: u64) -> Result<Vec<Action>, CueError> {
        match self.phase {
            ChannelPhase::Connecting { attempt: current } if current == attempt => {
                self.phase = ChannelPhase::Open {
                    attempt,
                    since: Instant::now(),
                };
            }
            ChannelPhase::Connecting { .. } | ChannelPhase::Open { .. } => {
                return Err(CueError::StaleAttempt { attempt });
            }
            _ => {
                return Err(CueError::InvalidTransition(
                    "cannot open: no handshake in flight",
                ));
            }
        }

        let drained: Vec<String> = match self.order {
            DrainOrder::Lifo => self.pending.drain(..).rev().collect(),
            DrainOrder::Fifo => self.pending.drain(..).collect(),
        };
        Ok(drained.into_iter().map(Action::Transmit).collect())
    }

    /// The handshake or the open link of `attempt` failed or closed.
    ///
    /// Returns `false` when the report concerns a connection that was
    /// already discarded.
    pub fn failed(&mut self, attempt: u64, reason: impl Into<String>) -> bool {
        if self.phase.live_attempt() != Some(attempt) {
            return false;
        }
        self.phase = ChannelPhase::Failed {
            attempt,
            reason: reason.into(),
        };
        true
    }

    /// A write on the open link of `attempt` failed.
    ///
    /// `unsent` holds the failed command followed by any later commands of
    /// the same batch, in the order they were attempted. The queue is
    /// restored so the next drain attempts them in that order again, and
    /// the connection is discarded.
    pub fn transmit_failed(
        &mut self,
        attempt: u64,
        unsent: Vec<String>,
        reason: impl Into<String>,
    ) {
        match self.order {
            DrainOrder::Lifo => self.pending.extend(unsent.into_iter().rev()),
            DrainOrder::Fifo => {
                self.pending.splice(0..0, unsent);
            }
        }
        self.failed(attempt, reason);
    }
}

// ── Tests ────────────────────────────────────────────────────────
