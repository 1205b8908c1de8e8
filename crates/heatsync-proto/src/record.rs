//! Swimmer assignments and submitted results.

use serde::{Deserialize, Serialize};

use crate::ident::SwimmerId;

/// Swimmer entered in one lane of one heat.
///
/// Immutable once fetched for a pointer; re-fetched when the pointer moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneAssignment {
    /// Entry id used when submitting the result.
    pub swimmer_id: SwimmerId,
    /// Display name.
    pub swimmer_name: String,
    /// School or club.
    pub school_name: String,
}

/// Final time for one swimmer, sent once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    /// Entry the time belongs to.
    pub swimmer_id: SwimmerId,
    /// Formatted `MM:SS.hh` time exactly as the operator saw it.
    pub final_time: String,
    /// Disqualification flag.
    pub disqualified: bool,
}

/// JSON body for the `submitResult` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultBody<'a> {
    /// Always `"submitResult"`.
    pub action: &'static str,
    /// Entry id.
    pub unique_id: &'a str,
    /// Formatted time.
    pub final_time: &'a str,
    /// `"Yes"` or `"No"`.
    pub dq: &'static str,
}

impl RaceResult {
    /// Body for the store's `submitResult` action.
    pub fn body(&self) -> SubmitResultBody<'_> {
        SubmitResultBody {
            action: "submitResult",
            unique_id: self.swimmer_id.as_str(),
            final_time: &self.final_time,
            dq: if self.disqualified { "Yes" } else { "No" },
        }
    }
}
