//! Meet roster: events and their heats, in running order.

use serde::{Deserialize, Serialize};

use crate::{ident::Identifier, pointer::RacePointer};

/// One event and its heats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHeats {
    /// Event token.
    pub event: Identifier,
    /// Heats in running order.
    #[serde(default)]
    pub heats: Vec<Identifier>,
}

/// Ordered events and heats, fetched once per starter session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterOverview {
    /// Events in running order.
    #[serde(default)]
    pub events: Vec<EventHeats>,
}

impl RosterOverview {
    /// Build a roster from `(event, heats)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        let events = pairs
            .into_iter()
            .map(|(event, heats)| EventHeats {
                event: event.into(),
                heats: heats.iter().map(|h| Identifier::from(*h)).collect(),
            })
            .collect();
        Self { events }
    }

    /// Whether the roster has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Event at `index`.
    pub fn event(&self, index: usize) -> Option<&EventHeats> {
        self.events.get(index)
    }

    /// Pointer for the `(event, heat)` cursor pair, if both are in range.
    pub fn pointer_at(&self, event_index: usize, heat_index: usize) -> Option<RacePointer> {
        let entry = self.events.get(event_index)?;
        let heat = entry.heats.get(heat_index)?;
        Some(RacePointer { event: entry.event.clone(), heat: heat.clone() })
    }
}
