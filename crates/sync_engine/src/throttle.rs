//! Correction rate limiter.
//!
//! One timestamp shared by the continuous corrector and the discrete seek
//! paths: any tick inside the interval after a write is suppressed.

use std::time::Duration;

/// Last applied correction plus minimum spacing
#[derive(Debug, Clone, Copy)]
pub struct CorrectionThrottle {
    last: Option<Duration>,
    interval: Duration,
}

impl CorrectionThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            last: None,
            interval,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Whether a correction may fire at `now`.
    ///
    /// Requires strictly more than `interval` since the last mark.
    #[inline]
    pub fn ready(&self, now: Duration) -> bool {
        match self.last {
            None => true,
            Some(last) => now.checked_sub(last).is_some_and(|d| d > self.interval),
        }
    }

    /// Record a write at `now`
    #[inline]
    pub fn mark(&mut self, now: Duration) {
        self.last = Some(now);
    }

    pub fn last(&self) -> Option<Duration> {
        self.last
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for CorrectionThrottle {
    fn default() -> Self {
        Self::from_millis(contracts::DEFAULT_SYNC_INTERVAL_MS)
    }
}
