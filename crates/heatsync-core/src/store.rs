//! Remote store contract.
//!
//! The store is a best-effort, last-write-wins record service reached only
//! through request/response calls. Implementations live elsewhere: an HTTP
//! client for production and an in-memory store for simulation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use heatsync_proto::{
    LaneAssignment, LaneNumber, LaneReadiness, RacePointer, RaceResult, RosterOverview,
};

use crate::error::StoreError;

/// Request/response operations on the shared store.
///
/// Every method is independent: no call relies on an earlier one having
/// succeeded, and every write is idempotent.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Read the active race pointer.
    ///
    /// Returns `Ok(None)` when the store answers but holds no complete
    /// pointer (missing event or heat).
    async fn current_pointer(&self) -> Result<Option<RacePointer>, StoreError>;

    /// Publish the active race pointer.
    async fn set_current_pointer(&self, pointer: &RacePointer) -> Result<(), StoreError>;

    /// Read the swimmer assigned to `lane` in `pointer`'s heat.
    ///
    /// Returns `Ok(None)` when the heat has no entry for the lane.
    async fn lane(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
    ) -> Result<Option<LaneAssignment>, StoreError>;

    /// Record `lane`'s readiness for `pointer`.
    async fn update_lane_status(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
        status: LaneReadiness,
    ) -> Result<(), StoreError>;

    /// Read the event/heat roster.
    async fn overview(&self) -> Result<RosterOverview, StoreError>;

    /// Read every readiness reported for `pointer`.
    async fn lane_statuses(
        &self,
        pointer: &RacePointer,
    ) -> Result<BTreeMap<LaneNumber, LaneReadiness>, StoreError>;

    /// Log that `pointer`'s race was started.
    async fn set_start(&self, pointer: &RacePointer) -> Result<(), StoreError>;

    /// Record a final result.
    async fn submit_result(&self, result: &RaceResult) -> Result<(), StoreError>;
}
