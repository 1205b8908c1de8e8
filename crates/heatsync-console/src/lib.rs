//! Terminal frontend for heatsync
//!
//! A thin shell over [`heatsync_app::Driver`] that provides line-oriented
//! terminal I/O. All orchestration lives in the generic
//! [`heatsync_app::LaneRuntime`] and [`heatsync_app::StarterRuntime`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod render;
pub mod terminal;

pub use cli::{Cli, LaneArgs, Role, StarterArgs};
pub use commands::{CommandSet, Parsed};
pub use error::ConsoleError;
pub use terminal::TerminalDriver;
