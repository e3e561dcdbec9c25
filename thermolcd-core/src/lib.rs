//! Board-agnostic core of the thermolcd climate display
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (character display, climate sensor, SoC thermometer, clock)
//! - Text layout for fixed-width rows (centring, scroll windows, reading lines)
//! - Page model with per-page scroll state
//! - Periodic jobs and the display multiplexer that serializes their writes
//! - Multiplexer lifecycle state machine and the shared run flag
//! - Intro typing animation
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod format;
pub mod intro;
pub mod page;
pub mod run;
pub mod scheduler;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use run::RunState;
pub use scheduler::{Multiplexer, StartError};
