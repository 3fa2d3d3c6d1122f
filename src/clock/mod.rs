//! Pluggable time source for the supervisor.
//!
//! The supervisor only needs two things from time: a timestamp for every
//! [`StatusUpdate`](crate::StatusUpdate) and a repeating restart tick.
//!
//! ## Contents
//! - [`Clock`] / [`Ticker`] the capability traits
//! - [`SystemClock`] wall clock + tokio interval (default)
//! - [`ManualClock`] test double that ticks only when told to
//!
//! ```text
//! Supervisor::run()
//!   ├─► clock.new_ticker(restart_interval) ─► ticker.tick().await  (restart scan)
//!   └─► clock.now()                         ─► StatusUpdate::time
//! ```

mod manual;
mod system;

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;

pub use manual::ManualClock;
pub use system::SystemClock;

/// Shared handle to a clock.
pub type ClockRef = Arc<dyn Clock>;

/// Source of the current time and of repeating timers.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Returns a ticker that yields once per `interval`.
    fn new_ticker(&self, interval: Duration) -> Box<dyn Ticker>;
}

/// Repeating timer created by a [`Clock`].
#[async_trait]
pub trait Ticker: Send {
    /// Waits for the next tick and returns its time.
    ///
    /// After [`stop`](Ticker::stop) the returned future never completes.
    async fn tick(&mut self) -> SystemTime;

    /// Stops the ticker and releases its resources.
    fn stop(&mut self);
}
