//! Lifecycle events

/// Events that drive the multiplexer state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Validation passed and the display is prepared
    Started,
    /// The run flag was observed false
    StopRequested,
    /// Loop exited and the display was closed
    Drained,
}
