//! The active-race pointer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ident::Identifier;

/// Identifies the race every lane should currently be timing.
///
/// One logical instance lives in the remote store; each client keeps a
/// cached copy that converges on it through polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RacePointer {
    /// Event token.
    pub event: Identifier,
    /// Heat token within the event.
    pub heat: Identifier,
}

impl RacePointer {
    /// Build a pointer from anything convertible to identifiers.
    pub fn new(event: impl Into<Identifier>, heat: impl Into<Identifier>) -> Self {
        Self { event: event.into(), heat: heat.into() }
    }

    /// Build a pointer from optional parts. Blank parts count as missing.
    pub fn from_parts(event: Option<Identifier>, heat: Option<Identifier>) -> Option<Self> {
        match (event, heat) {
            (Some(event), Some(heat)) if !event.is_blank() && !heat.is_blank() => {
                Some(Self { event, heat })
            },
            _ => None,
        }
    }
}

impl fmt::Display for RacePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event {}, Heat {}", self.event, self.heat)
    }
}
