//! Job cadence
//!
//! A job is due once `interval` has elapsed since it last fired. Firing
//! records the current time rather than advancing by one interval, so a
//! stalled tick is followed by a single firing instead of a burst.

use crate::traits::clock::Millis;

/// Minimum spacing between firings of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    interval_ms: u32,
    last_fired: Option<Millis>,
}

impl Cadence {
    /// Create a cadence that is due immediately
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fired: None,
        }
    }

    /// Create a cadence whose first firing is one interval after `now`
    pub const fn starting_at(interval_ms: u32, now: Millis) -> Self {
        Self {
            interval_ms,
            last_fired: Some(now),
        }
    }

    /// Check whether the job may fire at `now`
    pub fn is_due(&self, now: Millis) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now.saturating_sub(last) >= u64::from(self.interval_ms),
        }
    }

    /// Record a firing at `now`
    pub fn mark_fired(&mut self, now: Millis) {
        self.last_fired = Some(now);
    }

    /// Configured interval
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Timestamp of the last firing
    pub fn last_fired(&self) -> Option<Millis> {
        self.last_fired
    }
}
