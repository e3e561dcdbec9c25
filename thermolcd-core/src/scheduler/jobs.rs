//! Periodic jobs
//!
//! Each job owns its cadence and phase. Firing a job mutates that phase
//! and may yield one full-width row for the multiplexer to write.

use log::{debug, info, warn};

use super::cadence::Cadence;
use super::error::{JobKind, SourceError};
use crate::config::{ContentSource, RotationPolicy};
use crate::format::{centre, climate_line, fit, scroll_fragment, system_line, Line, LOADING_TEXT};
use crate::page::PageModel;
use crate::traits::clock::Millis;
use crate::traits::{ClimateSensor, SystemThermometer};

/// Row carrying the scrolling title
pub const TITLE_ROW: u8 = 0;

/// Row carrying the page value
pub const VALUE_ROW: u8 = 1;

/// One row write produced by a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderCommand {
    /// Target row; writes always start at column 0
    pub row: u8,
    /// Exactly `columns` characters
    pub text: Line,
}

impl RenderCommand {
    /// Centre `text` on `row`, clipped to `columns`
    pub fn centred(row: u8, text: &str, columns: usize) -> Self {
        Self {
            row,
            text: fit(&centre(text, columns, true), columns),
        }
    }
}

/// What a firing job may touch
pub struct JobContext<'a> {
    /// Pages and the active scroll state
    pub pages: &'a mut PageModel,
    /// Climate sensor
    pub sensor: &'a mut dyn ClimateSensor,
    /// SoC thermometer
    pub thermometer: &'a mut dyn SystemThermometer,
    /// Panel width
    pub columns: usize,
}

/// A recurring unit of display work
pub trait PeriodicJob {
    /// Which job this is
    fn kind(&self) -> JobKind;

    /// Check whether the job should fire at `now`
    fn is_due(&self, now: Millis, pages: &PageModel) -> bool;

    /// Advance the job's phase and produce its write, if any
    fn fire(&mut self, now: Millis, ctx: &mut JobContext<'_>) -> Option<RenderCommand>;
}

/// Moves the active title one column to the left
#[derive(Debug, Clone)]
pub struct ScrollJob {
    cadence: Cadence,
}

impl ScrollJob {
    /// Create a scroll job
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            cadence: Cadence::new(interval_ms),
        }
    }
}

impl PeriodicJob for ScrollJob {
    fn kind(&self) -> JobKind {
        JobKind::Scroll
    }

    fn is_due(&self, now: Millis, _pages: &PageModel) -> bool {
        self.cadence.is_due(now)
    }

    fn fire(&mut self, now: Millis, ctx: &mut JobContext<'_>) -> Option<RenderCommand> {
        self.cadence.mark_fired(now);
        let stage = ctx.pages.advance_scroll(ctx.columns);
        Some(RenderCommand {
            row: TITLE_ROW,
            text: scroll_fragment(ctx.pages.active().title(), ctx.columns, stage),
        })
    }
}

/// Last value rendered by the refresh job
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RefreshState {
    /// Formatted value, `None` until a read succeeds
    pub last_value: Option<Line>,
    /// When `last_value` was produced
    pub last_update: Option<Millis>,
    /// Page the value belongs to
    pub page: usize,
}

/// Re-reads the active page's source and redraws the value row
#[derive(Debug, Clone)]
pub struct RefreshJob {
    cadence: Cadence,
    state: RefreshState,
}

impl RefreshJob {
    /// Create a refresh job
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            cadence: Cadence::new(interval_ms),
            state: RefreshState {
                last_value: None,
                last_update: None,
                page: 0,
            },
        }
    }

    /// Last successful value
    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    fn read_value(ctx: &mut JobContext<'_>) -> Result<Line, SourceError> {
        match ctx.pages.active().source() {
            ContentSource::Sensor => ctx
                .sensor
                .read()
                .map(|reading| climate_line(&reading))
                .map_err(|e| {
                    debug!("Climate sensor read failed: {}", e);
                    SourceError::SensorUnavailable
                }),
            ContentSource::System => {
                if !ctx.thermometer.is_enabled() {
                    return Err(SourceError::SecondarySourceDisabled);
                }
                ctx.thermometer
                    .read_system_temperature()
                    .map(system_line)
                    .ok_or(SourceError::SecondaryUnavailable)
            }
        }
    }
}

impl PeriodicJob for RefreshJob {
    fn kind(&self) -> JobKind {
        JobKind::Refresh
    }

    fn is_due(&self, now: Millis, _pages: &PageModel) -> bool {
        self.cadence.is_due(now)
    }

    fn fire(&mut self, now: Millis, ctx: &mut JobContext<'_>) -> Option<RenderCommand> {
        self.cadence.mark_fired(now);

        match Self::read_value(ctx) {
            Ok(value) => {
                let command = RenderCommand::centred(VALUE_ROW, &value, ctx.columns);
                self.state = RefreshState {
                    last_value: Some(value),
                    last_update: Some(now),
                    page: ctx.pages.active_index(),
                };
                Some(command)
            }
            Err(SourceError::SecondarySourceDisabled) => {
                debug!("Skipping refresh: {}", SourceError::SecondarySourceDisabled);
                None
            }
            Err(e) => {
                warn!("Skipping refresh: {}", e);
                None
            }
        }
    }
}

/// Switches to the next page
#[derive(Debug, Clone)]
pub struct PageRotateJob {
    policy: RotationPolicy,
    cadence: Option<Cadence>,
}

impl PageRotateJob {
    /// Create a rotation job
    pub const fn new(policy: RotationPolicy) -> Self {
        Self {
            policy,
            cadence: None,
        }
    }

    /// Start the fixed-period clock at `now`
    ///
    /// Only meaningful for `RotationPolicy::EveryMs`; called on the first tick
    /// so the first page gets a full period.
    pub fn arm(&mut self, now: Millis) {
        if let RotationPolicy::EveryMs(interval_ms) = self.policy {
            if self.cadence.is_none() {
                self.cadence = Some(Cadence::starting_at(interval_ms, now));
            }
        }
    }
}

impl PeriodicJob for PageRotateJob {
    fn kind(&self) -> JobKind {
        JobKind::Rotate
    }

    fn is_due(&self, now: Millis, pages: &PageModel) -> bool {
        match self.policy {
            RotationPolicy::AfterScrolls(passes) => pages.scroll().scroll_count >= passes,
            RotationPolicy::EveryMs(_) => self.cadence.is_some_and(|c| c.is_due(now)),
        }
    }

    fn fire(&mut self, now: Millis, ctx: &mut JobContext<'_>) -> Option<RenderCommand> {
        if let Some(cadence) = self.cadence.as_mut() {
            cadence.mark_fired(now);
        }

        let page = ctx.pages.rotate();
        info!("Showing page {}: {}", page.index(), page.title());

        Some(RenderCommand::centred(VALUE_ROW, LOADING_TEXT, ctx.columns))
    }
}
