//! heatsync core logic
//!
//! Pure state machines for the meet-timing roles, decoupled from I/O so the
//! reconciliation rules can be tested without a network, a clock or a
//! terminal.
//!
//! # Architecture
//!
//! Each role is a session object. Inputs (a poll reply, a trigger message,
//! an operator action) are fed in together with the current time, and the
//! session answers with declarative actions: publish this readiness, fetch
//! that assignment, play the start cue. A runtime executes the actions and
//! feeds the outcomes back in.
//!
//! The remote store offers no transactions. Every write a session requests
//! is idempotent and carries the full key it applies to, and every reply is
//! checked against the session's current race before it is applied, so a
//! late answer for an old race can never overwrite state for the new one.
//!
//! # Components
//!
//! - [`lane`]: lane client session (pointer reconciliation, timer, submit)
//! - [`starter`]: starter console session (roster navigation, readiness)
//! - [`trigger`]: trigger device link (reconnect state machine, events)
//! - [`timer`]: local stopwatch
//! - [`store`]: remote store contract
//! - [`mod@env`]: environment abstraction (time)
//! - [`config`]: intervals and limits
//! - [`error`]: store and session error types

pub mod config;
pub mod env;
pub mod error;
pub mod lane;
pub mod starter;
pub mod store;
pub mod timer;
pub mod trigger;

pub use config::{LaneConfig, MAX_LANES, StarterConfig, TriggerConfig};
pub use env::{Environment, SystemEnv};
pub use error::{SessionError, StoreError};
pub use lane::{
    ALERT_CONFIRM_STALE, LaneAction, LaneSession, LaneView, LoadStatus, PROMPT_BLANK_SUBMIT,
    RaceStatus,
};
pub use starter::{StarterAction, StarterSession, StarterView, StatusLine, StatusTone};
pub use store::Store;
pub use timer::LaneTimer;
pub use trigger::{LinkState, TriggerEvent, TriggerLink};
