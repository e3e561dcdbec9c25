//! Monotonic time source

/// Millisecond timestamp used by the scheduler
pub type Millis = u64;

/// Monotonic clock
///
/// Implementations must never go backwards. The origin is arbitrary
/// (typically process start).
pub trait Clock {
    /// Milliseconds elapsed since the clock's origin
    fn now_ms(&self) -> Millis;
}
