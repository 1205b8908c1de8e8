//! Command parsing for the line-oriented console.
//!
//! One command per line. Lane pages and the starter console have separate
//! vocabularies; both share the [`Parsed`] outcome so the terminal driver
//! handles help and errors the same way for either role.

use heatsync_app::{LaneInput, StarterInput};

/// Outcome of parsing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<I> {
    /// A control for the runtime.
    Input(I),

    /// Blank line.
    Empty,

    /// Show the command list.
    Help,

    /// Unknown command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Known command with bad arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// A role's command vocabulary.
pub trait CommandSet: Sized + Send + 'static {
    /// Command list shown by `help`.
    const HELP: &'static str;

    /// Parse one line.
    fn parse(input: &str) -> Parsed<Self>;

    /// Input carrying the answer to a confirmation question, for roles
    /// that ask any.
    fn answer(_accepted: bool) -> Option<Self> {
        None
    }
}

impl CommandSet for LaneInput {
    const HELP: &'static str = "commands: start, stop, reset, submit [dq], quit";

    fn parse(input: &str) -> Parsed<Self> {
        parse_lane(input)
    }

    fn answer(accepted: bool) -> Option<Self> {
        Some(LaneInput::Confirm(accepted))
    }
}

impl CommandSet for StarterInput {
    const HELP: &'static str = "commands: prev-event (pe), next-event (ne), prev-heat (ph), \
                                next-heat (nh), assign, go, tone, quit";

    fn parse(input: &str) -> Parsed<Self> {
        parse_starter(input)
    }
}

/// Split a line into its command word and arguments.
fn words(input: &str) -> Option<(String, Vec<&str>)> {
    let mut parts = input.split_whitespace();
    let command = parts.next()?.trim_start_matches('/').to_ascii_lowercase();
    Some((command, parts.collect()))
}

/// Parse a lane page command.
pub fn parse_lane(input: &str) -> Parsed<LaneInput> {
    let Some((command, args)) = words(input) else {
        return Parsed::Empty;
    };

    match command.as_str() {
        "start" => Parsed::Input(LaneInput::Start),
        "stop" => Parsed::Input(LaneInput::Stop),
        "reset" => Parsed::Input(LaneInput::Reset),
        "submit" => match args.as_slice() {
            [] => Parsed::Input(LaneInput::Submit { disqualified: false }),
            [flag] if flag.eq_ignore_ascii_case("dq") => {
                Parsed::Input(LaneInput::Submit { disqualified: true })
            },
            _ => Parsed::InvalidArgs {
                command: "submit".into(),
                error: "Usage: submit [dq]".into(),
            },
        },
        "quit" | "q" => Parsed::Input(LaneInput::Quit),
        "help" | "?" => Parsed::Help,
        _ => Parsed::Unknown { input: input.trim().to_string() },
    }
}

/// Parse a starter console command.
pub fn parse_starter(input: &str) -> Parsed<StarterInput> {
    let Some((command, _)) = words(input) else {
        return Parsed::Empty;
    };

    match command.as_str() {
        "prev-event" | "pe" => Parsed::Input(StarterInput::PrevEvent),
        "next-event" | "ne" => Parsed::Input(StarterInput::NextEvent),
        "prev-heat" | "ph" => Parsed::Input(StarterInput::PrevHeat),
        "next-heat" | "nh" => Parsed::Input(StarterInput::NextHeat),
        "assign" => Parsed::Input(StarterInput::Assign),
        "go" | "start" => Parsed::Input(StarterInput::StartRace),
        "tone" => Parsed::Input(StarterInput::TestCue),
        "quit" | "q" => Parsed::Input(StarterInput::Quit),
        "help" | "?" => Parsed::Help,
        _ => Parsed::Unknown { input: input.trim().to_string() },
    }
}
