//! Scheduler error types

use core::fmt;

use crate::config::MAX_COLUMNS;
use crate::traits::DisplayError;

/// Identifies a job (or the loop itself) in errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Main loop quantum
    Tick,
    /// Page rotation
    Rotate,
    /// Value refresh
    Refresh,
    /// Title scroll
    Scroll,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobKind::Tick => "tick",
            JobKind::Rotate => "rotate",
            JobKind::Refresh => "refresh",
            JobKind::Scroll => "scroll",
        };
        f.write_str(name)
    }
}

/// Errors that abort `Multiplexer::start`
///
/// These are the only failures that cross the scheduler boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// No pages configured
    EmptyPages,
    /// More pages than the model can hold
    TooManyPages,
    /// A cadence of zero
    NonPositiveCadence(JobKind),
    /// Panel has fewer than two rows or no columns
    DisplayTooSmall,
    /// Panel has more columns than a rendered line holds
    DisplayTooWide,
    /// Device failed while being prepared
    Device(DisplayError),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::EmptyPages => f.write_str("no pages configured"),
            StartError::TooManyPages => f.write_str("too many pages configured"),
            StartError::NonPositiveCadence(kind) => write!(f, "{} cadence must be positive", kind),
            StartError::DisplayTooSmall => f.write_str("display needs at least two rows"),
            StartError::DisplayTooWide => write!(f, "display is wider than {} columns", MAX_COLUMNS),
            StartError::Device(e) => write!(f, "display initialisation failed: {}", e),
        }
    }
}

impl From<DisplayError> for StartError {
    fn from(e: DisplayError) -> Self {
        StartError::Device(e)
    }
}

/// Why a refresh produced no value
///
/// Never propagated out of a tick; the refresh is skipped and the
/// previous value stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    /// Climate sensor had no reading
    SensorUnavailable,
    /// Thermal zone is absent on this machine
    SecondarySourceDisabled,
    /// Thermal zone exists but could not be read
    SecondaryUnavailable,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::SensorUnavailable => f.write_str("climate sensor unavailable"),
            SourceError::SecondarySourceDisabled => f.write_str("system thermometer disabled"),
            SourceError::SecondaryUnavailable => f.write_str("system temperature unreadable"),
        }
    }
}
