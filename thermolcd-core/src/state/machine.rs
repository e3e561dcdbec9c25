//! State machine definition

use super::events::Event;

/// Multiplexer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Constructed, not yet ticking
    #[default]
    Idle,
    /// Ticking and writing
    Running,
    /// Stop observed; no further job writes
    Stopping,
    /// Display closed
    Stopped,
}

impl State {
    /// Check if jobs may write in this state
    pub fn writes_allowed(&self) -> bool {
        matches!(self, State::Running)
    }

    /// Check if the lifecycle is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Stopped)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Idle, Started) => Running,
            (Idle, StopRequested) => Stopping,
            (Running, StopRequested) => Stopping,
            (Stopping, Drained) => Stopped,

            // Default: stay in current state
            _ => self,
        }
    }
}
