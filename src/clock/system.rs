//! # Wall clock backed by tokio timers.

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use super::{Clock, Ticker};

/// Default [`Clock`]: `SystemTime::now` and [`tokio::time::Interval`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Construct a new [`SystemClock`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    /// The first tick fires one full `period` after creation.
    ///
    /// `period` must be non-zero; the supervisor passes a clamped value.
    fn new_ticker(&self, period: Duration) -> Box<dyn Ticker> {
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Box::new(SystemTicker {
            interval: Some(interval),
        })
    }
}

struct SystemTicker {
    interval: Option<Interval>,
}

#[async_trait]
impl Ticker for SystemTicker {
    async fn tick(&mut self) -> SystemTime {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
                SystemTime::now()
            }
            None => std::future::pending().await,
        }
    }

    fn stop(&mut self) {
        self.interval = None;
    }
}
