//! Opaque identifiers: events, heats, lanes and swimmers.
//!
//! The remote store is loosely typed. The same event can come back as `3`
//! in one reply and `"3"` in the next, so every identifier is normalized to
//! its string form on the way in and compared as a string afterwards.

use std::{fmt, num::NonZeroU8};

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{ProtocolError, Result};

/// Accepts a JSON string or number and yields its string form.
fn token<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

/// Event or heat identifier.
///
/// Opaque token compared by value: `"1"` and `"01"` are
/// different races.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Wrap a raw value without inspecting it.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse a value that must be present. Empty strings count as absent.
    pub fn parse_present(raw: &str) -> Option<Self> {
        if raw.is_empty() { None } else { Some(Self(raw.to_string())) }
    }

    /// Underlying token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty identifiers never name a race.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        token(deserializer).map(Self)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Physical timing lane, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaneNumber(NonZeroU8);

impl LaneNumber {
    /// Lane `n`, or `None` for lane zero.
    pub fn new(n: u8) -> Option<Self> {
        NonZeroU8::new(n).map(Self)
    }

    /// Parse a lane from a page parameter or status-map key.
    pub fn parse(raw: &str) -> Result<Self> {
        raw.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ProtocolError::InvalidLane(raw.to_string()))
    }

    /// Numeric lane.
    pub fn get(self) -> u8 {
        self.0.get()
    }
}

impl fmt::Display for LaneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LaneNumber {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Store-assigned swimmer entry id (`uniqueId`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SwimmerId(String);

impl SwimmerId {
    /// Wrap a raw id.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Underlying id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for SwimmerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        token(deserializer).map(Self)
    }
}

impl fmt::Display for SwimmerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
