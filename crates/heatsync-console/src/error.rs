//! Console errors.

use heatsync_app::DriverError;
use heatsync_client::HttpStoreError;
use thiserror::Error;

/// Failure that ends the `heatsync` process.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The store client could not be built.
    #[error(transparent)]
    Store(#[from] HttpStoreError),

    /// The terminal failed.
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// A page parameter was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
