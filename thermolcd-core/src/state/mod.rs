//! Multiplexer lifecycle
//!
//! The multiplexer's observable phase is a function of its current state
//! and the last lifecycle event.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
