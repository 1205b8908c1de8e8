//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol parsing.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while interpreting values that arrive from outside the
/// process: page parameters, store replies and trigger messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Lane numbers are 1-based small integers.
    #[error("invalid lane number: {0:?}")]
    InvalidLane(String),

    /// A field that must be present was absent or blank.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Trigger message carried a `cmd` we do not understand.
    #[error("unknown trigger command: {0:?}")]
    UnknownCommand(String),

    /// Store reply could not be decoded.
    #[error("malformed {action} reply: {reason}")]
    MalformedReply {
        /// Store action the reply belongs to.
        action: &'static str,
        /// Decoder message.
        reason: String,
    },
}
