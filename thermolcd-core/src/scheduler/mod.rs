//! Display scheduler
//!
//! Periodic jobs with independent cadences share one character display.
//! The multiplexer evaluates every job against a single timestamp per
//! tick and performs their writes one at a time in a fixed priority
//! order: page rotation, value refresh, title scroll.

pub mod cadence;
pub mod error;
pub mod jobs;
pub mod multiplexer;

pub use cadence::Cadence;
pub use error::{JobKind, SourceError, StartError};
pub use jobs::{
    JobContext, PageRotateJob, PeriodicJob, RefreshJob, RefreshState, RenderCommand, ScrollJob,
    TITLE_ROW, VALUE_ROW,
};
pub use multiplexer::{Multiplexer, TickStats};
