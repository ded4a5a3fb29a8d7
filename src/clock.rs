/// Time sources for cache freshness
///
/// Freshness is measured on a monotonic clock; snapshots are additionally
/// stamped with wall-clock time for display. `ManualClock` lets tests move
/// time forward deterministically.
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic time used for TTL decisions
    fn monotonic(&self) -> Instant;

    /// Wall-clock time used to stamp snapshots
    fn wall(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn monotonic(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    wall_origin: DateTime<Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            wall_origin: Utc::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move both clocks forward
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.elapsed()).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_when_advanced() {
        let clock = ManualClock::new();
        let start = clock.monotonic();
        let wall_start = clock.wall();

        assert_eq!(clock.monotonic(), start);

        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.monotonic().duration_since(start), Duration::from_secs(10));
        assert_eq!((clock.wall() - wall_start).num_seconds(), 10);
    }
}
