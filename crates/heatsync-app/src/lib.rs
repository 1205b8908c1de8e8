//! Application layer for heatsync
//!
//! Generic runtimes that execute the sessions' actions against a store, a
//! trigger link and a frontend, so the console binary and the scenario
//! harness run the same orchestration code.
//!
//! # Components
//!
//! - [`Driver`]: trait for frontend I/O (input, rendering, alerts, cue)
//! - [`LaneRuntime`]: event loop for one lane page
//! - [`StarterRuntime`]: event loop for the starter console

mod driver;
mod lane;
mod starter;
mod trigger;
mod writes;

pub use driver::{Driver, DriverError, LaneInput, StarterInput};
pub use lane::{ALERT_NOT_LOADED, LaneRuntime};
pub use starter::{ALERT_NO_RACE, StarterRuntime};
