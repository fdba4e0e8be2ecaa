//! Channel driver task and its public handle.
//!
//! The driver owns the [`ChannelState`] and the live link. Everything that
//! touches them arrives as a [`ChannelEvent`] on one unbounded mpsc, so
//! submissions, handshake results and link closures are applied strictly
//! one at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::state::{Action, ChannelPhase, ChannelState, DrainOrder};
use crate::error::CueError;
use crate::transport::{CommandSink, Connector, Link};

// ── Events ───────────────────────────────────────────────────────

pub(crate) enum ChannelEvent {
    Submit(String),
    Opened {
        attempt: u64,
        link: Box<dyn Link>,
    },
    HandshakeFailed {
        attempt: u64,
        error: CueError,
    },
    LinkClosed {
        attempt: u64,
        reason: Option<CueError>,
    },
    /// Stop once the events queued ahead of this one are settled.
    Close,
}

/// Handed to a [`Connector`] for one connection attempt.
///
/// Lets the transport report that its link has ended, and tells it when the
/// channel has discarded the connection.
#[derive(Clone)]
pub struct LinkEvents {
    attempt: u64,
    tx: mpsc::UnboundedSender<ChannelEvent>,
    token: CancellationToken,
}

impl LinkEvents {
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Report that the connection ended. `None` means an orderly close.
    pub fn closed(&self, reason: Option<CueError>) {
        let _ = self.tx.send(ChannelEvent::LinkClosed {
            attempt: self.attempt,
            reason,
        });
    }

    /// Resolves once the channel has discarded this connection or shut down.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

// ── CommandChannel ───────────────────────────────────────────────

/// Handle to a resilient command channel.
///
/// Commands submitted before the connection is open are queued and flushed
/// when the handshake completes. A failed connection is dropped and only
/// replaced when the next command is submitted.
///
/// [`close`](Self::close) lets accepted commands go out before stopping.
/// Dropping the handle shuts the driver down at once.
pub struct CommandChannel {
    tx: mpsc::UnboundedSender<ChannelEvent>,
    phase_rx: watch::Receiver<ChannelPhase>,
    shutdown: CancellationToken,
    closing: AtomicBool,
    pending: Arc<AtomicUsize>,
}

impl CommandChannel {
    /// Spawn the driver task on the current Tokio runtime.
    pub fn spawn(connector: impl Connector, order: DrainOrder) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(ChannelPhase::Absent);
        let shutdown = CancellationToken::new();
        let pending = Arc::new(AtomicUsize::new(0));

        let driver = Driver {
            state: ChannelState::new(order),
            connector: Arc::new(connector),
            tx: tx.clone(),
            rx,
            current: None,
            phase_tx,
            shutdown: shutdown.clone(),
            closing: false,
            pending: Arc::clone(&pending),
        };
        tokio::spawn(driver.run());

        Self {
            tx,
            phase_rx,
            shutdown,
            closing: AtomicBool::new(false),
            pending,
        }
    }

    /// Queue or transmit a command.
    ///
    /// Never waits for the network. Fails only once the channel is closing
    /// or the driver has stopped.
    pub fn submit(&self, command: impl Into<String>) -> Result<(), CueError> {
        if self.closing.load(Ordering::Acquire) {
            return Err(CueError::ChannelClosed);
        }
        self.tx.send(ChannelEvent::Submit(command.into()))?;
        Ok(())
    }

    /// Stop accepting commands and wait for the driver to finish.
    ///
    /// Commands accepted before the call are still delivered if the current
    /// handshake succeeds. No new handshake is started; whatever is queued
    /// after a failure stays undelivered and is counted by
    /// [`pending_count`](Self::pending_count).
    pub async fn close(&self) {
        if !self.closing.swap(true, Ordering::AcqRel) {
            let _ = self.tx.send(ChannelEvent::Close);
        }
        let mut phase_rx = self.phase_rx.clone();
        while phase_rx.changed().await.is_ok() {}
    }

    /// Commands accepted but not yet written to a connection.
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Snapshot of the current phase.
    pub fn phase(&self) -> ChannelPhase {
        self.phase_rx.borrow().clone()
    }

    /// A `watch::Receiver` that observes every phase change.
    pub fn phase_receiver(&self) -> watch::Receiver<ChannelPhase> {
        self.phase_rx.clone()
    }

    /// Stop the driver and close the live connection, if any.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for CommandChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl CommandSink for CommandChannel {
    fn submit(&self, command: String) -> Result<(), CueError> {
        CommandChannel::submit(self, command)
    }

    async fn close(&self) {
        CommandChannel::close(self).await
    }

    fn pending_count(&self) -> usize {
        CommandChannel::pending_count(self)
    }
}

// ── Driver ───────────────────────────────────────────────────────

/// The connection owned by the current attempt.
struct LiveConnection {
    attempt: u64,
    token: CancellationToken,
    /// `None` while the handshake is in flight.
    link: Option<Box<dyn Link>>,
}

struct Driver {
    state: ChannelState,
    connector: Arc<dyn Connector>,
    tx: mpsc::UnboundedSender<ChannelEvent>,
    rx: mpsc::UnboundedReceiver<ChannelEvent>,
    current: Option<LiveConnection>,
    phase_tx: watch::Sender<ChannelPhase>,
    shutdown: CancellationToken,
    closing: bool,
    pending: Arc<AtomicUsize>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = self.rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            self.handle(event).await;
            if self.closing && self.settled() {
                break;
            }
        }

        self.discard().await;
        let pending = self.state.pending_count();
        self.pending.store(pending, Ordering::Release);
        if pending > 0 {
            warn!(pending, "channel stopped with undelivered commands");
        } else {
            debug!("channel driver stopped");
        }
    }

    /// No handshake is in flight, so nothing queued can still go out.
    fn settled(&self) -> bool {
        !matches!(self.state.phase(), ChannelPhase::Connecting { .. })
    }

    async fn handle(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Submit(command) => {
                if !self.state.phase().is_open() {
                    debug!(%command, "queuing");
                }
                let actions = self.state.submit(command);
                self.perform(actions).await;
            }
            ChannelEvent::Opened { attempt, mut link } => match self.state.opened(attempt) {
                Ok(actions) => {
                    info!(attempt, "connection opened");
                    if let Some(current) = self.current.as_mut() {
                        current.link = Some(link);
                    }
                    self.perform(actions).await;
                }
                Err(e) => {
                    debug!(attempt, "discarding link: {e}");
                    link.close().await;
                }
            },
            ChannelEvent::HandshakeFailed { attempt, error } => {
                if self.state.failed(attempt, error.to_string()) {
                    warn!(attempt, "handshake failed: {error}");
                    self.discard().await;
                }
            }
            ChannelEvent::LinkClosed { attempt, reason } => {
                let text = reason
                    .as_ref()
                    .map_or_else(|| CueError::PeerClosed.to_string(), |e| e.to_string());
                if self.state.failed(attempt, text.as_str()) {
                    warn!(attempt, "connection closed: {text}");
                    self.discard().await;
                }
            }
            ChannelEvent::Close => {
                debug!(pending = self.state.pending_count(), "close requested");
                self.closing = true;
            }
        }
        self.publish();
    }

    async fn perform(&mut self, actions: Vec<Action>) {
        let mut actions = actions.into_iter();
        while let Some(action) = actions.next() {
            match action {
                Action::Connect { attempt } => self.start_handshake(attempt),
                Action::Transmit(command) => {
                    if let Err(e) = self.transmit(&command).await {
                        let attempt = self.state.phase().live_attempt().unwrap_or_default();
                        warn!(attempt, "send failed: {e}");

                        let mut unsent = vec![command];
                        unsent.extend(actions.by_ref().filter_map(|a| match a {
                            Action::Transmit(c) => Some(c),
                            Action::Connect { .. } => None,
                        }));
                        self.state.transmit_failed(attempt, unsent, e.to_string());
                        self.discard().await;
                        break;
                    }
                }
            }
        }
    }

    async fn transmit(&mut self, command: &str) -> Result<(), CueError> {
        let link = self
            .current
            .as_mut()
            .and_then(|c| c.link.as_mut())
            .ok_or(CueError::InvalidTransition("transmit without an open link"))?;
        debug!(%command, "sending");
        link.send(command).await
    }

    fn start_handshake(&mut self, attempt: u64) {
        let token = self.shutdown.child_token();
        self.current = Some(LiveConnection {
            attempt,
            token: token.clone(),
            link: None,
        });

        let events = LinkEvents {
            attempt,
            tx: self.tx.clone(),
            token: token.clone(),
        };
        let connector = Arc::clone(&self.connector);
        let tx = self.tx.clone();

        info!(attempt, "connecting");
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = connector.connect(events) => result,
            };
            let event = match result {
                Ok(link) => ChannelEvent::Opened { attempt, link },
                Err(error) => ChannelEvent::HandshakeFailed { attempt, error },
            };
            let _ = tx.send(event);
        });
    }

    /// Drop the current connection, cancelling its background work.
    async fn discard(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.token.cancel();
            if let Some(mut link) = current.link.take() {
                link.close().await;
            }
            debug!(attempt = current.attempt, "connection discarded");
        }
    }

    fn publish(&self) {
        self.pending
            .store(self.state.pending_count(), Ordering::Release);
        let phase = self.state.phase();
        self.phase_tx.send_if_modified(|current| {
            if current != phase {
                *current = phase.clone();
                true
            } else {
                false
            }
        });
    }
}

// ── Tests ────────────────────────────────────────────────────────
