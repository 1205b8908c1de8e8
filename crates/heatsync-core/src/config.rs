//! Intervals and limits shared by the runtimes.

use std::time::Duration;

/// Lanes shown by the starter console and linked from it.
pub const MAX_LANES: u8 = 8;

/// Lane client configuration.
#[derive(Debug, Clone)]
pub struct LaneConfig {
    /// Period of the active-race pointer poll. The first poll runs at once.
    pub poll_interval: Duration,
    /// Display refresh while the timer runs. Cosmetic only.
    pub tick_interval: Duration,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(2), tick_interval: Duration::from_millis(10) }
    }
}

/// Starter console configuration.
#[derive(Debug, Clone)]
pub struct StarterConfig {
    /// Period of the lane readiness poll.
    pub poll_interval: Duration,
    /// Number of lanes in the pool.
    pub max_lanes: u8,
    /// Base URL of the lane page, used to build direct lane links.
    pub lane_page: String,
}

impl Default for StarterConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_lanes: MAX_LANES,
            lane_page: "http://localhost/".to_string(),
        }
    }
}

/// Trigger device link configuration.
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    /// Device socket URL, e.g. `ws://172.18.0.98:81`.
    pub url: String,
    /// Fixed delay before every reconnect attempt.
    pub reconnect_delay: Duration,
}

impl TriggerConfig {
    /// Configuration for `url` with the default backoff.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), reconnect_delay: Duration::from_secs(2) }
    }
}
