//! Command-line configuration.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use heatsync_core::{LaneConfig, MAX_LANES, StarterConfig, TriggerConfig};
use heatsync_proto::{Identifier, LaneLink, LaneNumber, ProtocolError, RacePointer};

use crate::error::ConsoleError;

/// Swim meet timing: lane pages and the starter console.
#[derive(Debug, Parser)]
#[command(name = "heatsync", version, about)]
pub struct Cli {
    /// Record store endpoint.
    #[arg(long, env = "HEATSYNC_STORE_URL")]
    pub store_url: String,

    /// Trigger device socket, e.g. `ws://172.18.0.98:81`.
    #[arg(long, env = "HEATSYNC_TRIGGER_URL")]
    pub trigger_url: Option<String>,

    /// Pointer and readiness poll period, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub poll_ms: u64,

    /// Delay before each trigger reconnect, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    pub reconnect_ms: u64,

    /// Role to run.
    #[command(subcommand)]
    pub role: Role,
}

/// Which client to run.
#[derive(Debug, Subcommand)]
pub enum Role {
    /// Timer page for one lane.
    Lane(LaneArgs),
    /// Starter console.
    Starter(StarterArgs),
}

/// Lane page parameters.
#[derive(Debug, Args)]
pub struct LaneArgs {
    /// Lane number, starting at 1.
    #[arg(long, required_unless_present = "link")]
    pub lane: Option<String>,

    /// Event to open on, before the first poll.
    #[arg(long)]
    pub event: Option<String>,

    /// Heat to open on, before the first poll.
    #[arg(long)]
    pub heat: Option<String>,

    /// Lane link copied from the starter console.
    #[arg(long, conflicts_with_all = ["lane", "event", "heat"])]
    pub link: Option<String>,
}

/// Starter console parameters.
#[derive(Debug, Args)]
pub struct StarterArgs {
    /// Number of lanes in the pool.
    #[arg(long, default_value_t = MAX_LANES)]
    pub lanes: u8,

    /// Lane page base URL used for the direct lane links.
    #[arg(long, env = "HEATSYNC_LANE_PAGE", default_value = "http://localhost/")]
    pub lane_page: String,
}

impl Cli {
    /// Poll period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }

    /// Trigger link configuration, if a device is configured.
    pub fn trigger_config(&self) -> Option<TriggerConfig> {
        self.trigger_url.as_ref().map(|url| TriggerConfig {
            url: url.clone(),
            reconnect_delay: Duration::from_millis(self.reconnect_ms.max(1)),
        })
    }

    /// Lane client configuration.
    pub fn lane_config(&self) -> LaneConfig {
        LaneConfig { poll_interval: self.poll_interval(), ..LaneConfig::default() }
    }
}

impl LaneArgs {
    /// Lane to run and the race to open on, from `--link` or from the
    /// separate flags. Only a complete, non-blank race counts.
    pub fn target(&self) -> Result<(LaneNumber, Option<RacePointer>), ConsoleError> {
        let invalid = |e: ProtocolError| ConsoleError::InvalidArgument(e.to_string());
        if let Some(link) = &self.link {
            return LaneLink::parse(link).map_err(invalid);
        }

        let lane = self.lane.as_deref().unwrap_or_default();
        let lane = LaneNumber::parse(lane).map_err(invalid)?;
        let event = self.event.as_deref().and_then(Identifier::parse_present);
        let heat = self.heat.as_deref().and_then(Identifier::parse_present);
        Ok((lane, RacePointer::from_parts(event, heat)))
    }
}

impl StarterArgs {
    /// Starter console configuration.
    pub fn starter_config(&self, poll_interval: Duration) -> StarterConfig {
        StarterConfig { poll_interval, max_lanes: self.lanes, lane_page: self.lane_page.clone() }
    }
}
