//! Error types for store calls and session guards.

use heatsync_proto::ProtocolError;
use thiserror::Error;

/// Failure of a remote store call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network unreachable, timeout or non-success HTTP status.
    #[error("store unreachable: {0}")]
    Transport(String),

    /// Reply could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Well-formed reply with the success flag false.
    #[error("store rejected {action}{}", detail_suffix(.detail))]
    Rejected {
        /// Store action that was rejected.
        action: &'static str,
        /// Optional reason from the store.
        detail: Option<String>,
    },
}

impl StoreError {
    /// Whether the store answered at all. Rejections are semantic failures;
    /// everything else means the request or reply was lost or garbled.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Operator-input guards raised by sessions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Submit without a loaded swimmer.
    #[error("lane not loaded properly, cannot submit")]
    NoSwimmerLoaded,

    /// A previous submit has not been answered yet.
    #[error("a result submission is already in flight")]
    SubmitInFlight,

    /// Starter action with no race selected.
    #[error("no race selected")]
    NoRaceSelected,
}
