//! Trigger device messages.
//!
//! The device sends one flat parameter string per notification, for example
//! `source=esp32&cmd=start&event=1&heat=1` or `source=esp32&cmd=stop`.

use std::fmt;

use crate::{
    errors::{ProtocolError, Result},
    ident::Identifier,
    pointer::RacePointer,
};

/// Command carried in the `cmd` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerCommand {
    /// Start timing.
    Start,
    /// Stop timing.
    Stop,
    /// Clear the timer for a new race.
    Reset,
}

impl TriggerCommand {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "reset" => Ok(Self::Reset),
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    /// Wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reset => "reset",
        }
    }
}

impl fmt::Display for TriggerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which races a `start` applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartScope {
    /// Neither event nor heat given: applies to every lane.
    Broadcast,
    /// Applies only to lanes on this race.
    Race(RacePointer),
    /// Exactly one of event/heat given. Matches no lane.
    Partial,
}

/// Parsed trigger notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMessage {
    /// Requested action.
    pub command: TriggerCommand,
    /// Optional event scope.
    pub event: Option<Identifier>,
    /// Optional heat scope.
    pub heat: Option<Identifier>,
    /// Sender tag, informational only.
    pub source: Option<String>,
}

impl TriggerMessage {
    /// Parse a flat `k=v&k=v` message. Surrounding whitespace is ignored,
    /// empty values count as absent, and the first occurrence of a key wins.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut command = None;
        let mut event = None;
        let mut heat = None;
        let mut source = None;

        for (key, value) in form_urlencoded::parse(raw.trim().as_bytes()) {
            match key.as_ref() {
                "cmd" if command.is_none() => command = Some(value.into_owned()),
                "event" if event.is_none() => event = Some(value.into_owned()),
                "heat" if heat.is_none() => heat = Some(value.into_owned()),
                "source" if source.is_none() => source = Some(value.into_owned()),
                _ => {},
            }
        }

        let command = command.ok_or(ProtocolError::MissingField("cmd"))?;
        Ok(Self {
            command: TriggerCommand::parse(&command)?,
            event: event.as_deref().and_then(Identifier::parse_present),
            heat: heat.as_deref().and_then(Identifier::parse_present),
            source: source.filter(|s| !s.is_empty()),
        })
    }

    /// Scope of a `start` command.
    pub fn start_scope(&self) -> StartScope {
        match (&self.event, &self.heat) {
            (None, None) => StartScope::Broadcast,
            (Some(event), Some(heat)) => {
                StartScope::Race(RacePointer { event: event.clone(), heat: heat.clone() })
            },
            _ => StartScope::Partial,
        }
    }
}
