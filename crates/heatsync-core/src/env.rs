//! Environment abstraction.
//!
//! Sessions never read the clock themselves; runtimes ask the environment
//! and pass the instant in. Production uses the tokio clock, which tests can
//! pause and advance deterministically.

use std::{
    future::Future,
    time::{Duration, Instant},
};

/// Source of time for runtimes and the trigger supervisor.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Sleep for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Environment backed by the tokio clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
