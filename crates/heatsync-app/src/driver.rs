//! Driver trait for abstracting frontend I/O.
//!
//! The [`Driver`] trait decouples the runtimes from a specific frontend.
//! The console binary implements it over stdin/stdout, the harness over
//! scripted channels, and the same [`crate::LaneRuntime`] and
//! [`crate::StarterRuntime`] orchestration runs against both.

use std::future::Future;

use heatsync_core::{LaneView, StarterView};
use heatsync_proto::LaneLink;
use thiserror::Error;

/// Operator controls of a lane page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneInput {
    /// Start the stopwatch.
    Start,
    /// Stop the stopwatch.
    Stop,
    /// Clear the stopwatch and report the lane not ready.
    Reset,
    /// Submit the displayed time.
    Submit {
        /// Mark the swimmer disqualified.
        disqualified: bool,
    },
    /// Answer to the last [`Driver::confirm`] question.
    Confirm(bool),
    /// Leave the page.
    Quit,
}

/// Controls of the starter console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterInput {
    /// Previous event, first heat.
    PrevEvent,
    /// Next event, first heat.
    NextEvent,
    /// Previous heat.
    PrevHeat,
    /// Next heat.
    NextHeat,
    /// Re-publish the selected race to the lanes.
    Assign,
    /// Start the selected race.
    StartRace,
    /// Sound the start cue only.
    TestCue,
    /// Leave the console.
    Quit,
}

/// Frontend failure.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Writing to or reading from the terminal failed.
    #[error("frontend I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Frontend I/O for one role.
///
/// `Input` is [`LaneInput`] for lane pages and [`StarterInput`] for the
/// starter console.
pub trait Driver: Send {
    /// Operator input type.
    type Input: Send;

    /// Wait for the next operator input.
    ///
    /// Returns `None` once input is exhausted, which ends the runtime. Must
    /// be cancel safe: the runtime polls it inside `tokio::select!`.
    fn next_input(
        &mut self,
    ) -> impl Future<Output = Result<Option<Self::Input>, DriverError>> + Send;

    /// Draw the lane page.
    fn render_lane(&mut self, view: &LaneView) -> Result<(), DriverError>;

    /// Draw the starter console with its direct lane links.
    fn render_starter(&mut self, view: &StarterView, links: &[LaneLink])
    -> Result<(), DriverError>;

    /// Show a notice the operator has to acknowledge.
    fn alert(&mut self, message: &str) -> Result<(), DriverError>;

    /// Ask a yes/no question without waiting for the answer.
    ///
    /// The answer arrives later from [`Self::next_input`] as
    /// [`LaneInput::Confirm`], so the runtime keeps serving polls and
    /// triggers while the question is open.
    fn confirm(&mut self, prompt: &str) -> Result<(), DriverError>;

    /// Play the audible start cue.
    fn play_start_cue(&mut self) -> Result<(), DriverError>;
}
