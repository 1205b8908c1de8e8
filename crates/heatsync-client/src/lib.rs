//! Production transports for heatsync.
//!
//! - [`HttpStore`]: the remote record store over HTTP
//! - [`TriggerSupervisor`]: the trigger device socket, reconnected forever
//!   and fanned out to any number of subscribers

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod http;
pub mod trigger;

pub use http::{HttpStore, HttpStoreError};
pub use trigger::{TriggerHandle, TriggerSupervisor};
