//! In-memory record store.
//!
//! Implements [`Store`] over shared state with the same semantics as the
//! remote store: last write wins, no transactions, `getLane` answers "no
//! entry" instead of failing. Clones share state, so a test keeps one
//! handle for seeding and inspection while runtimes use others.
//!
//! Seeding and inspection methods bypass the offline switch and latency;
//! only [`Store`] calls see them.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use heatsync_core::{Store, StoreError};
use heatsync_proto::{
    LaneAssignment, LaneNumber, LaneReadiness, RacePointer, RaceResult, RosterOverview, SwimmerId,
};
use tracing::trace;

/// One readiness write, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusWrite {
    /// Race the write applied to.
    pub pointer: RacePointer,
    /// Reporting lane.
    pub lane: LaneNumber,
    /// Written status.
    pub status: LaneReadiness,
}

#[derive(Debug, Default)]
struct State {
    pointer: Option<RacePointer>,
    roster: RosterOverview,
    entries: HashMap<(RacePointer, LaneNumber), LaneAssignment>,
    statuses: HashMap<RacePointer, BTreeMap<LaneNumber, LaneReadiness>>,
    status_log: Vec<StatusWrite>,
    pointer_log: Vec<RacePointer>,
    starts: Vec<RacePointer>,
    results: Vec<RaceResult>,
    offline: bool,
    latency: Duration,
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Empty store, online, no latency.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the roster.
    pub fn set_roster(&self, roster: RosterOverview) {
        self.lock().roster = roster;
    }

    /// Set the active race pointer directly.
    pub fn set_pointer(&self, pointer: Option<RacePointer>) {
        self.lock().pointer = pointer;
    }

    /// Enter a swimmer in one lane of one heat.
    pub fn add_entry(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
        id: &str,
        name: &str,
        school: &str,
    ) {
        let assignment = LaneAssignment {
            swimmer_id: SwimmerId::new(id),
            swimmer_name: name.to_string(),
            school_name: school.to_string(),
        };
        self.lock().entries.insert((pointer.clone(), lane), assignment);
    }

    /// Make every [`Store`] call fail with a transport error, or stop.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Delay every [`Store`] call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Active race pointer.
    pub fn pointer(&self) -> Option<RacePointer> {
        self.lock().pointer.clone()
    }

    /// Every pointer write, in order.
    pub fn pointer_log(&self) -> Vec<RacePointer> {
        self.lock().pointer_log.clone()
    }

    /// Stored status of `lane` in `pointer`'s race.
    pub fn status(&self, pointer: &RacePointer, lane: LaneNumber) -> Option<LaneReadiness> {
        self.lock().statuses.get(pointer).and_then(|lanes| lanes.get(&lane).copied())
    }

    /// Every readiness write for `lane`, in order.
    pub fn status_log(&self, lane: LaneNumber) -> Vec<StatusWrite> {
        self.lock().status_log.iter().filter(|w| w.lane == lane).cloned().collect()
    }

    /// Logged race starts.
    pub fn starts(&self) -> Vec<RacePointer> {
        self.lock().starts.clone()
    }

    /// Submitted results.
    pub fn results(&self) -> Vec<RaceResult> {
        self.lock().results.clone()
    }

    /// Apply latency and the offline switch to one call.
    async fn enter(&self, action: &'static str) -> Result<(), StoreError> {
        let latency = self.lock().latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        trace!(action, "memory store call");
        if self.lock().offline {
            return Err(StoreError::Transport(format!("{action}: store offline")));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn current_pointer(&self) -> Result<Option<RacePointer>, StoreError> {
        self.enter("getCurrentPointer").await?;
        Ok(self.lock().pointer.clone())
    }

    async fn set_current_pointer(&self, pointer: &RacePointer) -> Result<(), StoreError> {
        self.enter("setCurrentPointer").await?;
        let mut state = self.lock();
        state.pointer = Some(pointer.clone());
        state.pointer_log.push(pointer.clone());
        Ok(())
    }

    async fn lane(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
    ) -> Result<Option<LaneAssignment>, StoreError> {
        self.enter("getLane").await?;
        Ok(self.lock().entries.get(&(pointer.clone(), lane)).cloned())
    }

    async fn update_lane_status(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
        status: LaneReadiness,
    ) -> Result<(), StoreError> {
        self.enter("updateLaneStatus").await?;
        let mut state = self.lock();
        state.statuses.entry(pointer.clone()).or_default().insert(lane, status);
        state.status_log.push(StatusWrite { pointer: pointer.clone(), lane, status });
        Ok(())
    }

    async fn overview(&self) -> Result<RosterOverview, StoreError> {
        self.enter("getOverview").await?;
        Ok(self.lock().roster.clone())
    }

    async fn lane_statuses(
        &self,
        pointer: &RacePointer,
    ) -> Result<BTreeMap<LaneNumber, LaneReadiness>, StoreError> {
        self.enter("getLaneStatuses").await?;
        Ok(self.lock().statuses.get(pointer).cloned().unwrap_or_default())
    }

    async fn set_start(&self, pointer: &RacePointer) -> Result<(), StoreError> {
        self.enter("setStart").await?;
        self.lock().starts.push(pointer.clone());
        Ok(())
    }

    async fn submit_result(&self, result: &RaceResult) -> Result<(), StoreError> {
        self.enter("submitResult").await?;
        self.lock().results.push(result.clone());
        Ok(())
    }
}
