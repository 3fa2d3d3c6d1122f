//! # Supervisor runtime configuration.
//!
//! Provides [`SupervisorConfig`], the settings for the supervisor event loop.
//! Services, listeners, the clock and the logger are wired through
//! [`SupervisorBuilder`](crate::SupervisorBuilder).
//!
//! ## Sentinel values
//! - `restart_interval = 0s` → clamped to 1ms (a ticker needs a non-zero period)
//! - `channel_capacity = 0`  → clamped to 1

use std::time::Duration;

/// Smallest restart interval the event loop will use.
const MIN_RESTART_INTERVAL: Duration = Duration::from_millis(1);

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `restart_interval`: fixed period of the restart scan (no backoff, no jitter, no cap)
/// - `channel_capacity`: status channel buffer; `1` keeps senders close to rendezvous
///   with the event loop
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Period of the restart tick.
    ///
    /// On every tick the loop relaunches every service whose status is not alive.
    /// An always-failing service is relaunched once per interval, forever.
    pub restart_interval: Duration,

    /// Capacity of the status update channel shared by all services.
    ///
    /// Senders (lifecycle updates and transient reports) wait while it is full.
    pub channel_capacity: usize,
}

impl SupervisorConfig {
    /// Creates a config with the given restart interval and default capacity.
    pub fn with_restart_interval(restart_interval: Duration) -> Self {
        Self {
            restart_interval,
            ..Self::default()
        }
    }

    /// Returns the restart interval clamped to a minimum of 1ms.
    #[inline]
    pub fn restart_interval_clamped(&self) -> Duration {
        self.restart_interval.max(MIN_RESTART_INTERVAL)
    }

    /// Returns the channel capacity clamped to a minimum of 1.
    #[inline]
    pub fn channel_capacity_clamped(&self) -> usize {
        self.channel_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `restart_interval = 1s`
    /// - `channel_capacity = 1`
    fn default() -> Self {
        Self {
            restart_interval: Duration::from_secs(1),
            channel_capacity: 1,
        }
    }
}
