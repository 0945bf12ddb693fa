//! Time source for the engine.
//!
//! Everything time-dependent reads from a [`Clock`] so enforcement deadlines,
//! retry due times and block expiries can be driven without real sleeps.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic time for in-memory deadlines.
    fn now(&self) -> Instant;

    /// Wall-clock Unix seconds for persisted timestamps.
    fn unix_now(&self) -> i64;
}

/// Real time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn unix_now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    unix_start: i64,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new(unix_start: i64) -> Self {
        Self {
            start: Instant::now(),
            unix_start,
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.elapsed.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock()
    }

    fn unix_now(&self) -> i64 {
        let elapsed = self.elapsed.lock().as_secs();
        self.unix_start + i64::try_from(elapsed).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_both_time_bases() {
        let clock = ManualClock::new(1_000);
        let t0 = clock.now();
        clock.advance(Duration::from_secs(61));
        assert_eq!(clock.now() - t0, Duration::from_secs(61));
        assert_eq!(clock.unix_now(), 1_061);
    }
}
