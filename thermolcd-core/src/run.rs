//! Shared run flag
//!
//! `true` from construction until a stop is requested, then `false`
//! forever. Every loop and every blocking wait in the display path polls
//! it at least once per tick quantum.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

/// Process-wide cancellation flag
#[derive(Debug)]
pub struct RunState {
    running: AtomicBool,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Create a flag in the running state
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
        }
    }

    /// Check whether work should continue
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Request shutdown; idempotent
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Sleep for `ms` in slices of at most `quantum_ms`
    ///
    /// Returns `false` as soon as a stop is observed, `true` if the full
    /// pause elapsed while still running.
    pub fn pause<D: DelayNs>(&self, delay: &mut D, ms: u32, quantum_ms: u32) -> bool {
        let quantum_ms = quantum_ms.max(1);
        let mut remaining = ms;
        while remaining > 0 {
            if !self.is_running() {
                return false;
            }
            let slice = remaining.min(quantum_ms);
            delay.delay_ms(slice);
            remaining -= slice;
        }
        self.is_running()
    }
}
