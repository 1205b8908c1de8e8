//! HTTP record store.
//!
//! One endpoint, dispatched on the `action` query parameter. Reads and
//! idempotent writes are `GET` requests; `submitResult` is a `POST` with a
//! JSON body.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use heatsync_core::{Store, StoreError};
use heatsync_proto::{
    LaneAssignment, LaneNumber, LaneReadiness, RacePointer, RaceResult, RosterOverview,
    StoreRequest,
    store::{AckReply, LaneReply, LaneStatusesReply, OverviewReply, PointerReply, decode},
};
use thiserror::Error;
use tracing::{debug, trace};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to construct an [`HttpStore`].
#[derive(Debug, Error)]
pub enum HttpStoreError {
    /// HTTP client could not be built.
    #[error("building HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Record store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStore {
    /// Store at `endpoint` with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, HttpStoreError> {
        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        request: &StoreRequest,
    ) -> Result<T, StoreError> {
        let action = request.action();
        trace!(action, "store request");
        let response = self
            .client
            .get(&self.endpoint)
            .query(&request.query())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?;
        let body = response.bytes().await.map_err(transport)?;
        Ok(decode(action, &body)?)
    }

    async fn ack(&self, request: &StoreRequest) -> Result<(), StoreError> {
        let reply: AckReply = self.get(request).await?;
        check(request.action(), reply)
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

fn check(action: &'static str, reply: AckReply) -> Result<(), StoreError> {
    if reply.ok { Ok(()) } else { Err(StoreError::Rejected { action, detail: reply.error }) }
}

#[async_trait]
impl Store for HttpStore {
    async fn current_pointer(&self) -> Result<Option<RacePointer>, StoreError> {
        let request = StoreRequest::GetCurrentPointer;
        let reply: PointerReply = self.get(&request).await?;
        if !reply.ok {
            return Err(StoreError::Rejected { action: request.action(), detail: None });
        }
        Ok(reply.into_pointer())
    }

    async fn set_current_pointer(&self, pointer: &RacePointer) -> Result<(), StoreError> {
        self.ack(&StoreRequest::SetCurrentPointer(pointer.clone())).await
    }

    async fn lane(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
    ) -> Result<Option<LaneAssignment>, StoreError> {
        let reply: LaneReply =
            self.get(&StoreRequest::GetLane { pointer: pointer.clone(), lane }).await?;
        if !reply.ok {
            debug!(%lane, race = %pointer, "store has no entry");
        }
        Ok(reply.into_assignment())
    }

    async fn update_lane_status(
        &self,
        pointer: &RacePointer,
        lane: LaneNumber,
        status: LaneReadiness,
    ) -> Result<(), StoreError> {
        self.ack(&StoreRequest::UpdateLaneStatus { pointer: pointer.clone(), lane, status }).await
    }

    async fn overview(&self) -> Result<RosterOverview, StoreError> {
        let request = StoreRequest::GetOverview;
        let reply: OverviewReply = self.get(&request).await?;
        reply
            .into_roster()
            .ok_or(StoreError::Rejected { action: request.action(), detail: None })
    }

    async fn lane_statuses(
        &self,
        pointer: &RacePointer,
    ) -> Result<BTreeMap<LaneNumber, LaneReadiness>, StoreError> {
        let request = StoreRequest::GetLaneStatuses(pointer.clone());
        let reply: LaneStatusesReply = self.get(&request).await?;
        reply
            .into_statuses()
            .ok_or(StoreError::Rejected { action: request.action(), detail: None })
    }

    async fn set_start(&self, pointer: &RacePointer) -> Result<(), StoreError> {
        self.ack(&StoreRequest::SetStart(pointer.clone())).await
    }

    async fn submit_result(&self, result: &RaceResult) -> Result<(), StoreError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&result.body())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport)?;
        let body = response.bytes().await.map_err(transport)?;
        let reply: AckReply = decode("submitResult", &body)?;
        check("submitResult", reply)
    }
}
