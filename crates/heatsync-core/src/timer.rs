//! Local lane stopwatch.
//!
//! Elapsed time is always derived from the start instant, never accumulated,
//! so there is no pause/resume: one start and one stop per race.

use std::time::{Duration, Instant};

use heatsync_proto::format_elapsed;

/// Stopwatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneTimer {
    /// Cleared, shows zero.
    #[default]
    Idle,
    /// Counting since `started_at`.
    Running {
        /// Start instant.
        started_at: Instant,
    },
    /// Frozen at `stopped_at - started_at`.
    Stopped {
        /// Start instant.
        started_at: Instant,
        /// Stop instant.
        stopped_at: Instant,
    },
}

impl LaneTimer {
    /// Start counting. A start while running is ignored and returns `false`.
    ///
    /// Starting a stopped timer begins a fresh count from `now`.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        *self = Self::Running { started_at: now };
        true
    }

    /// Freeze the display at `now`. Returns `false` if the timer was not
    /// running.
    pub fn stop(&mut self, now: Instant) -> bool {
        match *self {
            Self::Running { started_at } => {
                *self = Self::Stopped { started_at, stopped_at: now.max(started_at) };
                true
            },
            Self::Idle | Self::Stopped { .. } => false,
        }
    }

    /// Clear back to zero.
    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    /// Whether the timer is counting.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Start instant, if the timer has been started since the last reset.
    pub fn started_at(&self) -> Option<Instant> {
        match *self {
            Self::Idle => None,
            Self::Running { started_at } | Self::Stopped { started_at, .. } => Some(started_at),
        }
    }

    /// Elapsed time as of `now`.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match *self {
            Self::Idle => Duration::ZERO,
            Self::Running { started_at } => now.saturating_duration_since(started_at),
            Self::Stopped { started_at, stopped_at } => stopped_at - started_at,
        }
    }

    /// Display text as of `now`.
    pub fn display(&self, now: Instant) -> String {
        format_elapsed(self.elapsed(now))
    }
}
