//! Fixed-cadence deadlines for the amplitude evaluator.

use std::time::{Duration, Instant};

/// Tracks when the next evaluator tick is due
///
/// Deadlines advance by whole periods from the start instant, so the cadence
/// does not drift with processing time. Ticks missed while the owner was busy
/// are skipped rather than fired back to back.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick fires one `period` after `start`
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero
    #[must_use]
    pub fn new(period: Duration, start: Instant) -> Self {
        assert!(!period.is_zero(), "Tick period must be greater than 0");
        Self {
            period,
            next: start + period,
        }
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Instant of the next tick
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.next
    }

    /// Time left before the next tick, zero if it is already due
    #[must_use]
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Consume the due tick, if any, and schedule the following one
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }

        let late = now - self.next;
        let skipped = late.as_nanos() / self.period.as_nanos();
        let steps = u32::try_from(skipped + 1).unwrap_or(u32::MAX);
        self.next += self.period * steps;
        true
    }
}
