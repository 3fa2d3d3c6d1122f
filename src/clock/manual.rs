//! # Manually driven clock for deterministic tests.
//!
//! [`ManualClock`] never ticks on its own. Tests call [`ManualClock::tick`] to
//! deliver a restart tick to every live ticker, and [`ManualClock::set`] /
//! [`ManualClock::advance`] to move the reported time.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::{Duration, SystemTime};
//! use servicevisor::{Clock, ManualClock};
//!
//! let clock = Arc::new(ManualClock::new(SystemTime::UNIX_EPOCH));
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now(), SystemTime::UNIX_EPOCH + Duration::from_secs(5));
//! ```

use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{Clock, Ticker};

/// Buffered ticks per ticker before old ones are skipped.
const TICK_BUFFER: usize = 64;

/// Test clock: time moves and ticks fire only on request.
pub struct ManualClock {
    now: Mutex<SystemTime>,
    ticks: broadcast::Sender<SystemTime>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: SystemTime) -> Self {
        let (ticks, _rx) = broadcast::channel(TICK_BUFFER);
        Self {
            now: Mutex::new(now),
            ticks,
        }
    }

    /// Sets the current time.
    pub fn set(&self, now: SystemTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    /// Moves the current time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    /// Delivers one tick (stamped with the current time) to every live ticker.
    ///
    /// Returns how many tickers received it. Ticks sent while no ticker
    /// exists are lost.
    pub fn tick(&self) -> usize {
        self.ticks.send(self.now()).unwrap_or(0)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemTime::UNIX_EPOCH)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn new_ticker(&self, _interval: Duration) -> Box<dyn Ticker> {
        Box::new(ManualTicker {
            rx: Some(self.ticks.subscribe()),
        })
    }
}

struct ManualTicker {
    rx: Option<broadcast::Receiver<SystemTime>>,
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> SystemTime {
        if let Some(rx) = self.rx.as_mut() {
            loop {
                match rx.recv().await {
                    Ok(at) => return at,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
        std::future::pending().await
    }

    fn stop(&mut self) {
        self.rx = None;
    }
}
