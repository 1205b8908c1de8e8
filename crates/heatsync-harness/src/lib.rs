//! Simulation harness for heatsync convergence testing.
//!
//! An in-memory store, a scripted frontend and a stand-in trigger device,
//! wired to the production runtimes so whole meet scenarios (starter,
//! several lanes, the trigger) run in virtual time inside one test.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod memory_store;
pub mod scenario;
pub mod scripted_driver;

pub use memory_store::{MemoryStore, StatusWrite};
pub use scenario::{LanePage, SimLaneRuntime, SimStarterRuntime, SimTrigger, StarterConsole};
pub use scripted_driver::{Recording, Script, ScriptedDriver};
