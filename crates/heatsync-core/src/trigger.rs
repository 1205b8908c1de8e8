//! Trigger device link state machine.
//!
//! The device is expected to drop off and come back throughout a meet, so
//! the link never gives up: every closure or failed connect schedules one
//! reconnect after a fixed delay, with no growth and no attempt cap.
//!
//! # State Machine
//!
//! ```text
//!             begin_connect            connected
//! ┌──────────┐ ────────────> ┌────────────┐ ──────> ┌───────────┐
//! │ Backoff  │               │ Connecting │         │ Connected │
//! └──────────┘ <──────────── └────────────┘         └───────────┘
//!       ^        connect_failed                           │
//!       └─────────────────────────────────────────────────┘
//!                               closed
//! ```
//!
//! The link only tracks state and deadlines. The supervisor that owns the
//! socket asks it when to retry and reports what happened.

use std::time::{Duration, Instant};

use heatsync_proto::TriggerMessage;
use tracing::{debug, warn};

/// Connection state visible to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No socket and none being opened.
    #[default]
    Disconnected,
    /// Socket being opened.
    Connecting,
    /// Socket open, notifications flowing.
    Connected,
}

/// Event delivered to every subscriber of a trigger link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEvent {
    /// Link state changed.
    Link(LinkState),
    /// Device notification.
    Command(TriggerMessage),
}

/// Reconnect bookkeeping for one device socket.
#[derive(Debug, Clone)]
pub struct TriggerLink {
    state: LinkState,
    reconnect_delay: Duration,
    retry_at: Option<Instant>,
    attempts: u64,
}

impl TriggerLink {
    /// New link, not yet connecting.
    pub fn new(reconnect_delay: Duration) -> Self {
        Self { state: LinkState::Disconnected, reconnect_delay, retry_at: None, attempts: 0 }
    }

    /// Current state.
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Pending reconnect deadline.
    pub fn retry_at(&self) -> Option<Instant> {
        self.retry_at
    }

    /// Connect attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// A connect attempt is starting. Clears any pending deadline.
    pub fn begin_connect(&mut self) {
        self.state = LinkState::Connecting;
        self.retry_at = None;
        self.attempts += 1;
    }

    /// The socket opened.
    pub fn connected(&mut self) {
        self.state = LinkState::Connected;
    }

    /// The socket closed. Returns the reconnect deadline.
    pub fn closed(&mut self, now: Instant) -> Instant {
        self.schedule(now)
    }

    /// The socket could not be opened. Returns the reconnect deadline.
    pub fn connect_failed(&mut self, now: Instant) -> Instant {
        self.schedule(now)
    }

    /// Whether the pending reconnect is due. Consumes the deadline when it
    /// is, so each scheduled reconnect fires exactly once.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.retry_at {
            Some(at) if at <= now => {
                self.retry_at = None;
                true
            },
            _ => false,
        }
    }

    /// Parse one inbound text frame. Malformed frames are logged and
    /// dropped.
    pub fn handle_text(&self, raw: &str) -> Option<TriggerMessage> {
        match TriggerMessage::parse(raw) {
            Ok(msg) => {
                debug!(command = %msg.command, source = ?msg.source, "trigger message");
                Some(msg)
            },
            Err(e) => {
                warn!(error = %e, raw, "dropping trigger message");
                None
            },
        }
    }

    fn schedule(&mut self, now: Instant) -> Instant {
        self.state = LinkState::Disconnected;
        // Closure and error can both be reported for one failure; keep the
        // first deadline so only one reconnect is ever outstanding.
        *self.retry_at.get_or_insert(now + self.reconnect_delay)
    }
}
