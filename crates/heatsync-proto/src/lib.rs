//! Domain and wire types for heatsync.
//!
//! Everything the lane clients, the starter console and the trigger device
//! exchange is defined here: race identifiers, readiness states, roster and
//! swimmer records, the remote store's request/response shapes, and the flat
//! `k=v&k=v` trigger messages.
//!
//! Identifiers are compared as strings everywhere. A store that answers
//! `"event": 3` and a lane page that was opened with `?event=3` agree on the
//! race, while `"01"` and `"1"` deliberately do not.
//!
//! Nothing in this crate performs I/O.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod elapsed;
pub mod errors;
pub mod ident;
pub mod link;
pub mod pointer;
pub mod readiness;
pub mod record;
pub mod roster;
pub mod store;
pub mod trigger;

pub use elapsed::{ZERO_ELAPSED, format_elapsed};
pub use errors::{ProtocolError, Result};
pub use ident::{Identifier, LaneNumber, SwimmerId};
pub use link::LaneLink;
pub use pointer::RacePointer;
pub use readiness::LaneReadiness;
pub use record::{LaneAssignment, RaceResult};
pub use roster::{EventHeats, RosterOverview};
pub use store::StoreRequest;
pub use trigger::{StartScope, TriggerCommand, TriggerMessage};
