//! Per-lane readiness.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lane's self-reported state for the current race.
///
/// Each lane client is the sole writer of its own entry. The starter console
/// only reads, and shows `Waiting` for lanes that have not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LaneReadiness {
    /// No report yet for this race.
    #[default]
    Waiting,
    /// Timer reset, swimmer not (yet) loaded.
    NotReady,
    /// Swimmer loaded and timer reset.
    Ready,
}

impl LaneReadiness {
    /// Wire string used by the store.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::NotReady => "not-ready",
            Self::Ready => "ready",
        }
    }

    /// Lenient parse for status maps. Unknown strings degrade to `Waiting`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ready" => Self::Ready,
            "not-ready" => Self::NotReady,
            _ => Self::Waiting,
        }
    }

    /// Human label for status panels.
    pub fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::NotReady => "Not Ready",
            Self::Ready => "Ready",
        }
    }
}

impl fmt::Display for LaneReadiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}
