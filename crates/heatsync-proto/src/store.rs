//! Request and reply shapes of the remote record store.
//!
//! The store is a single endpoint that dispatches on an `action` parameter.
//! Every reply is a JSON object with an `ok` flag plus action-specific
//! fields. Replies are decoded leniently: a missing `ok` reads as `false`,
//! and the `into_*` conversions return `None` for any semantic failure so
//! callers never have to inspect partially filled records.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    errors::{ProtocolError, Result},
    ident::{Identifier, LaneNumber, SwimmerId},
    pointer::RacePointer,
    readiness::LaneReadiness,
    record::LaneAssignment,
    roster::{EventHeats, RosterOverview},
};

/// Parameterized store request. `submitResult` carries a body and is
/// modelled separately by [`crate::record::SubmitResultBody`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreRequest {
    /// Read the active race pointer.
    GetCurrentPointer,
    /// Publish the active race pointer.
    SetCurrentPointer(RacePointer),
    /// Read the swimmer assigned to a lane.
    GetLane {
        /// Race to look up.
        pointer: RacePointer,
        /// Lane to look up.
        lane: LaneNumber,
    },
    /// Report a lane's readiness for a race.
    UpdateLaneStatus {
        /// Race the report applies to.
        pointer: RacePointer,
        /// Reporting lane.
        lane: LaneNumber,
        /// `ready` or `not-ready`.
        status: LaneReadiness,
    },
    /// Read the event/heat roster.
    GetOverview,
    /// Read every reported lane status for a race.
    GetLaneStatuses(RacePointer),
    /// Log that a race was started.
    SetStart(RacePointer),
}

impl StoreRequest {
    /// Action name the store dispatches on.
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetCurrentPointer => "getCurrentPointer",
            Self::SetCurrentPointer(_) => "setCurrentPointer",
            Self::GetLane { .. } => "getLane",
            Self::UpdateLaneStatus { .. } => "updateLaneStatus",
            Self::GetOverview => "getOverview",
            Self::GetLaneStatuses(_) => "getLaneStatuses",
            Self::SetStart(_) => "setStart",
        }
    }

    /// Query parameters, `action` first.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("action", self.action().to_string())];
        match self {
            Self::GetCurrentPointer | Self::GetOverview => {},
            Self::SetCurrentPointer(pointer)
            | Self::GetLaneStatuses(pointer)
            | Self::SetStart(pointer) => push_pointer(&mut params, pointer),
            Self::GetLane { pointer, lane } => {
                push_pointer(&mut params, pointer);
                params.push(("lane", lane.to_string()));
            },
            Self::UpdateLaneStatus { pointer, lane, status } => {
                params.push(("lane", lane.to_string()));
                push_pointer(&mut params, pointer);
                params.push(("status", status.as_wire().to_string()));
            },
        }
        params
    }
}

fn push_pointer(params: &mut Vec<(&'static str, String)>, pointer: &RacePointer) {
    params.push(("event", pointer.event.to_string()));
    params.push(("heat", pointer.heat.to_string()));
}

/// Decode a reply body, tagging failures with the action name.
pub fn decode<T: DeserializeOwned>(action: &'static str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body)
        .map_err(|e| ProtocolError::MalformedReply { action, reason: e.to_string() })
}

/// Reply that only carries the success flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AckReply {
    /// Success flag.
    #[serde(default)]
    pub ok: bool,
    /// Optional failure detail.
    #[serde(default)]
    pub error: Option<String>,
}

/// `getCurrentPointer` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PointerReply {
    /// Success flag.
    #[serde(default)]
    pub ok: bool,
    /// Active event.
    #[serde(default)]
    pub event: Option<Identifier>,
    /// Active heat.
    #[serde(default)]
    pub heat: Option<Identifier>,
}

impl PointerReply {
    /// The pointer, if the reply is successful and complete.
    pub fn into_pointer(self) -> Option<RacePointer> {
        if !self.ok {
            return None;
        }
        RacePointer::from_parts(self.event, self.heat)
    }
}

/// `getLane` reply. `ok: false` means "no entry for this lane".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LaneReply {
    /// Success flag.
    #[serde(default)]
    pub ok: bool,
    /// Entry id.
    #[serde(default, rename = "uniqueId")]
    pub unique_id: Option<SwimmerId>,
    /// Swimmer display name.
    #[serde(default)]
    pub swimmer: Option<String>,
    /// School or club.
    #[serde(default)]
    pub school: Option<String>,
}

impl LaneReply {
    /// The assignment, or `None` when the lane has no entry.
    pub fn into_assignment(self) -> Option<LaneAssignment> {
        if !self.ok {
            return None;
        }
        Some(LaneAssignment {
            swimmer_id: self.unique_id?,
            swimmer_name: self.swimmer.unwrap_or_default(),
            school_name: self.school.unwrap_or_default(),
        })
    }
}

/// `getLaneStatuses` reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LaneStatusesReply {
    /// Success flag.
    #[serde(default)]
    pub ok: bool,
    /// Lane key to raw status value.
    #[serde(default)]
    pub statuses: Option<HashMap<String, serde_json::Value>>,
}

impl LaneStatusesReply {
    /// Reported statuses keyed by lane. Keys that are not lane numbers are
    /// skipped; values that are not known statuses read as `Waiting`.
    pub fn into_statuses(self) -> Option<BTreeMap<LaneNumber, LaneReadiness>> {
        if !self.ok {
            return None;
        }
        let statuses = self
            .statuses?
            .into_iter()
            .filter_map(|(key, value)| {
                let lane = LaneNumber::parse(&key).ok()?;
                let status = match value {
                    serde_json::Value::String(text) => LaneReadiness::parse_lenient(&text),
                    _ => LaneReadiness::Waiting,
                };
                Some((lane, status))
            })
            .collect();
        Some(statuses)
    }
}

/// `getOverview` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OverviewReply {
    /// Success flag.
    #[serde(default)]
    pub ok: bool,
    /// Events in running order.
    #[serde(default)]
    pub events: Option<Vec<EventHeats>>,
}

impl OverviewReply {
    /// The roster, if the reply is successful. A missing list is empty.
    pub fn into_roster(self) -> Option<RosterOverview> {
        if !self.ok {
            return None;
        }
        Some(RosterOverview { events: self.events.unwrap_or_default() })
    }
}
