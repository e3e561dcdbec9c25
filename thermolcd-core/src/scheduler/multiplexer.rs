//! Display multiplexer
//!
//! Owns the display, the page model and the three jobs. Each tick samples
//! the clock once, then fires every due job in priority order (rotate,
//! refresh, scroll) and writes its row before moving to the next job, so
//! writes never interleave.

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use super::error::StartError;
use super::jobs::{JobContext, PageRotateJob, PeriodicJob, RefreshJob, ScrollJob};
use crate::config::{PageConfig, ScheduleConfig, MAX_COLUMNS};
use crate::format::{DEGREE_GLYPH, DEGREE_SLOT};
use crate::page::PageModel;
use crate::run::RunState;
use crate::state::{Event, State};
use crate::traits::clock::{Clock, Millis};
use crate::traits::{CharDisplay, ClimateSensor, SystemThermometer};

/// Counters kept across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    /// Ticks executed
    pub ticks: u32,
    /// Rows written successfully
    pub writes: u32,
    /// Rows dropped because the device rejected them
    pub write_failures: u32,
}

/// Serializes all job output onto one character display
pub struct Multiplexer<D, S, T> {
    display: D,
    sensor: S,
    thermometer: T,
    pages: PageModel,
    rotate: PageRotateJob,
    refresh: RefreshJob,
    scroll: ScrollJob,
    state: State,
    tick_ms: u32,
    columns: usize,
    armed: bool,
    stats: TickStats,
}

impl<D, S, T> Multiplexer<D, S, T>
where
    D: CharDisplay,
    S: ClimateSensor,
    T: SystemThermometer,
{
    /// Validate the configuration, prepare the display and enter `Running`
    ///
    /// Clears and homes the panel and registers the degree glyph. Any
    /// device error here is fatal.
    pub fn start(
        schedule: &ScheduleConfig,
        pages: &[PageConfig],
        mut display: D,
        sensor: S,
        thermometer: T,
    ) -> Result<Self, StartError> {
        schedule.validate()?;
        let pages = PageModel::new(pages)?;

        let (columns, rows) = display.dimensions();
        if columns == 0 || rows < 2 {
            return Err(StartError::DisplayTooSmall);
        }
        if columns > MAX_COLUMNS {
            return Err(StartError::DisplayTooWide);
        }

        display.clear()?;
        display.home()?;
        display.define_glyph(DEGREE_SLOT, DEGREE_GLYPH)?;

        if !thermometer.is_enabled() {
            info!("System thermometer not present, its pages will stay blank");
        }
        info!(
            "Multiplexer running: {} page(s), scroll {}ms, refresh {}ms",
            pages.len(),
            schedule.scroll_ms,
            schedule.refresh_ms
        );

        Ok(Self {
            display,
            sensor,
            thermometer,
            pages,
            rotate: PageRotateJob::new(schedule.rotation),
            refresh: RefreshJob::new(schedule.refresh_ms),
            scroll: ScrollJob::new(schedule.scroll_ms),
            state: State::Idle.transition(Event::Started),
            tick_ms: schedule.tick_ms,
            columns: usize::from(columns),
            armed: false,
            stats: TickStats::default(),
        })
    }

    /// Run one tick at `now`
    ///
    /// Returns the number of rows written. A job whose write fails loses
    /// that write only; the tick continues with the next job.
    pub fn tick(&mut self, now: Millis) -> usize {
        if !self.state.writes_allowed() {
            return 0;
        }
        if !self.armed {
            self.rotate.arm(now);
            self.armed = true;
        }
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        let mut ctx = JobContext {
            pages: &mut self.pages,
            sensor: &mut self.sensor,
            thermometer: &mut self.thermometer,
            columns: self.columns,
        };
        let jobs: [&mut dyn PeriodicJob; 3] = [&mut self.rotate, &mut self.refresh, &mut self.scroll];

        let mut written = 0;
        for job in jobs {
            if !job.is_due(now, ctx.pages) {
                continue;
            }
            let Some(command) = job.fire(now, &mut ctx) else {
                continue;
            };
            match self.display.write_at(command.row, 0, &command.text) {
                Ok(()) => {
                    written += 1;
                    self.stats.writes = self.stats.writes.wrapping_add(1);
                }
                Err(e) => {
                    self.stats.write_failures = self.stats.write_failures.wrapping_add(1);
                    warn!("{} job: dropped row {} write: {}", job.kind(), command.row, e);
                }
            }
        }
        written
    }

    /// Tick until `run` is cleared, then shut down
    ///
    /// Pauses one tick quantum between ticks, so a stop request is seen
    /// within one quantum plus the duration of the tick in progress.
    /// Returns the display after it has been closed.
    pub fn run<C: Clock, P: DelayNs>(mut self, run: &RunState, clock: &C, delay: &mut P) -> D {
        debug!("Tick loop started, quantum {}ms", self.tick_ms);
        while run.is_running() {
            let now = clock.now_ms();
            self.tick(now);
            delay.delay_ms(self.tick_ms);
        }
        self.shutdown()
    }

    /// Stop writing, close the display with clear, and hand it back
    ///
    /// Consuming `self` makes the close happen exactly once.
    pub fn shutdown(mut self) -> D {
        self.state = self.state.transition(Event::StopRequested);
        info!(
            "Stopping after {} ticks ({} writes, {} dropped)",
            self.stats.ticks, self.stats.writes, self.stats.write_failures
        );

        if let Err(e) = self.display.close(true) {
            warn!("Failed to close display: {}", e);
        }
        self.state = self.state.transition(Event::Drained);
        debug!("Multiplexer state: {:?}", self.state);
        self.display
    }

    /// Current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Page model, for inspection
    pub fn pages(&self) -> &PageModel {
        &self.pages
    }

    /// Display being driven, for inspection
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Refresh job, for inspection
    pub fn refresh_job(&self) -> &RefreshJob {
        &self.refresh
    }

    /// Counters since start
    pub fn stats(&self) -> TickStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentSource, RotationPolicy};
    use crate::scheduler::JobKind;
    use crate::testing::{FixedThermometer, Op, RecordingDisplay, ScriptedSensor, SimClock, SimDelay};
    use crate::traits::{DisplayError, Reading, SensorError};
    use std::vec::Vec;

    fn make_schedule() -> ScheduleConfig {
        ScheduleConfig {
            tick_ms: 20,
            scroll_ms: 500,
            refresh_ms: 2_000,
            rotation: RotationPolicy::AfterScrolls(1),
        }
    }

    fn make_pages() -> Vec<PageConfig> {
        std::vec![
            PageConfig::new("AB", ContentSource::Sensor),
            PageConfig::new("CPU", ContentSource::System),
        ]
    }

    fn make_reading() -> Result<Reading, SensorError> {
        Ok(Reading::new(21.4, 45.3))
    }

    #[test]
    fn test_start_prepares_display() {
        let mut display = RecordingDisplay::new(16, 2);
        let mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[]),
            FixedThermometer::disabled(),
        )
        .unwrap();
        assert_eq!(mux.state(), State::Running);
        drop(mux);

        assert_eq!(
            display.ops,
            std::vec![Op::Clear, Op::Home, Op::DefineGlyph(0, DEGREE_GLYPH)]
        );
    }

    #[test]
    fn test_start_rejects_bad_config() {
        let mut display = RecordingDisplay::new(16, 2);
        let result = Multiplexer::start(
            &make_schedule(),
            &[],
            &mut display,
            ScriptedSensor::new(&[]),
            FixedThermometer::disabled(),
        );
        assert_eq!(result.err(), Some(StartError::EmptyPages));

        let mut schedule = make_schedule();
        schedule.scroll_ms = 0;
        let result = Multiplexer::start(
            &schedule,
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[]),
            FixedThermometer::disabled(),
        );
        assert_eq!(
            result.err(),
            Some(StartError::NonPositiveCadence(JobKind::Scroll))
        );
        // Nothing touched the device
        assert!(display.ops.is_empty());
    }

    #[test]
    fn test_start_device_failure_is_fatal() {
        let mut display = RecordingDisplay::new(16, 2);
        display.fail_glyphs = true;
        let result = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[]),
            FixedThermometer::disabled(),
        );
        assert_eq!(result.err(), Some(StartError::Device(DisplayError::Write)));

        let mut single_row = RecordingDisplay::new(16, 1);
        let result = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut single_row,
            ScriptedSensor::new(&[]),
            FixedThermometer::disabled(),
        );
        assert_eq!(result.err(), Some(StartError::DisplayTooSmall));
    }

    #[test]
    fn test_start_rejects_panel_wider_than_a_line() {
        let mut wide = RecordingDisplay::new(MAX_COLUMNS + 1, 2);
        let result = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut wide,
            ScriptedSensor::new(&[]),
            FixedThermometer::disabled(),
        );
        assert_eq!(result.err(), Some(StartError::DisplayTooWide));
        assert!(wide.ops.is_empty());
    }

    #[test]
    fn test_widest_panel_gets_full_rows() {
        let mut display = RecordingDisplay::new(MAX_COLUMNS, 2);
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &[PageConfig::new("Température extérieure", ContentSource::Sensor)],
            &mut display,
            ScriptedSensor::new(&[make_reading()]),
            FixedThermometer::disabled(),
        )
        .unwrap();
        assert_eq!(mux.tick(0), 2);
        drop(mux);

        let width = usize::from(MAX_COLUMNS);
        assert_eq!(display.writes_to(0)[0].chars().count(), width);
        assert_eq!(display.writes_to(1)[0].chars().count(), width);
    }

    #[test]
    fn test_first_tick_refreshes_then_scrolls() {
        let mut display = RecordingDisplay::new(16, 2);
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading()]),
            FixedThermometer::disabled(),
        )
        .unwrap();

        assert_eq!(mux.tick(0), 2);
        // Nothing is due again within the same cadence window
        assert_eq!(mux.tick(20), 0);
        drop(mux);

        assert_eq!(display.row(0), "               A");
        assert_eq!(display.row(1), " 45.3%  21.4\x00C  ");
        // Refresh wrote before scroll
        let writes: Vec<_> = display
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::SetCursor(row, _) => Some(*row),
                _ => None,
            })
            .collect();
        assert_eq!(writes, std::vec![1, 0]);
    }

    #[test]
    fn test_rotation_shows_placeholder_before_next_refresh() {
        let mut display = RecordingDisplay::new(4, 2);
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading()]),
            FixedThermometer::reading(48.9),
        )
        .unwrap();

        // "AB" on 4 columns: six scroll steps then the wrap on the seventh
        let mut now = 0;
        for _ in 0..7 {
            mux.tick(now);
            now += 500;
        }
        assert_eq!(mux.pages().active_index(), 0);
        assert_eq!(mux.pages().scroll().scroll_count, 1);

        // Rotation fires first; refresh not due until 4000
        mux.tick(3_520);
        assert_eq!(mux.pages().active_index(), 1);
        assert_eq!(mux.pages().scroll().stage, 1);

        mux.tick(4_000);
        drop(mux);

        let value_writes = display.writes_to(1);
        let placeholder = value_writes
            .iter()
            .position(|w| w.as_str() == "Load")
            .unwrap();
        assert_eq!(
            value_writes.iter().filter(|w| w.as_str() == "Load").count(),
            1
        );
        assert_eq!(value_writes[placeholder + 1], "48.9");
    }

    #[test]
    fn test_old_title_gone_once_page_rotates() {
        let mut display = RecordingDisplay::new(4, 2);
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading()]),
            FixedThermometer::reading(48.9),
        )
        .unwrap();

        let mut rotated_at = None;
        let mut now = 0;
        while now <= 4_000 {
            mux.tick(now);
            if mux.pages().active_index() == 1 {
                rotated_at.get_or_insert(now);
                // Neither character of "AB" may linger on the title row
                let title = mux.display().row(0);
                assert!(!title.contains(|c| c == 'A' || c == 'B'), "row 0 {:?} at {}ms", title, now);
            }
            now += 20;
        }
        assert_eq!(rotated_at, Some(3_020));
        assert_eq!(mux.display().row(0), "  CP");
    }

    #[test]
    fn test_placeholder_not_clobbered_in_same_tick() {
        let mut display = RecordingDisplay::new(4, 2);
        let mut schedule = make_schedule();
        schedule.rotation = RotationPolicy::EveryMs(2_000);
        let mut mux = Multiplexer::start(
            &schedule,
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading(), make_reading()]),
            FixedThermometer::reading(48.9),
        )
        .unwrap();

        mux.tick(0);
        // Rotation and refresh both due: rotation first, then the refresh
        // reads the new page rather than the old one
        mux.tick(2_000);
        drop(mux);

        assert_eq!(display.writes_to(1), ["45.3", "Load", "48.9"]);
    }

    #[test]
    fn test_stalled_tick_does_not_catch_up() {
        let clock = SimClock::default();
        let mut display = RecordingDisplay::new(16, 2);
        let sensor = ScriptedSensor::new(&[make_reading(), make_reading()]).stalling_once(&clock, 5_000);
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            sensor,
            FixedThermometer::disabled(),
        )
        .unwrap();

        // First tick blocks five seconds inside the sensor read
        mux.tick(clock.now_ms());
        assert_eq!(clock.now_ms(), 5_000);

        let mut scroll_writes = 0;
        for _ in 0..5 {
            clock.advance(20);
            if mux.tick(clock.now_ms()) > 0 {
                scroll_writes += 1;
            }
        }
        drop(mux);

        // One scroll and one refresh after the stall, no burst
        assert_eq!(scroll_writes, 1);
        assert_eq!(display.writes_to(0).len(), 2);
        assert_eq!(display.writes_to(1).len(), 2);
    }

    #[test]
    fn test_write_failure_is_skipped() {
        let mut display = RecordingDisplay::new(16, 2);
        display.fail_writes = true;
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading()]),
            FixedThermometer::disabled(),
        )
        .unwrap();

        assert_eq!(mux.tick(0), 0);
        assert_eq!(mux.stats().write_failures, 2);
        assert_eq!(mux.state(), State::Running);

        // Jobs still advanced and keep their cadence
        assert_eq!(mux.pages().scroll().stage, 1);
        assert!(mux.refresh_job().state().last_value.is_some());
        assert_eq!(mux.tick(500), 0);
        assert_eq!(mux.pages().scroll().stage, 2);
    }

    #[test]
    fn test_sensor_flapping_never_tears_rows() {
        let mut display = RecordingDisplay::new(16, 2);
        let script = [
            make_reading(),
            Err(SensorError::Checksum),
            Ok(Reading::new(-5.0, 99.9)),
            Err(SensorError::Unavailable),
            Ok(Reading::new(100.0, 0.0)),
        ];
        let mut mux = Multiplexer::start(
            &make_schedule(),
            &[PageConfig::new("Climate", ContentSource::Sensor)],
            &mut display,
            ScriptedSensor::new(&script),
            FixedThermometer::disabled(),
        )
        .unwrap();

        for i in 0..script.len() as u64 {
            mux.tick(i * 2_000);
        }
        drop(mux);

        let values = display.writes_to(1);
        assert_eq!(values.len(), 3);
        for value in &values {
            assert_eq!(value.chars().count(), 16);
        }
        assert_eq!(values[1], " 99.9%  -5.0\x00C  ");
    }

    #[test]
    fn test_run_stops_and_closes_once() {
        let run = RunState::new();
        let clock = SimClock::default();
        let mut delay = SimDelay::new(&clock).stop_at(&run, 3_000);
        let mut display = RecordingDisplay::new(16, 2);

        let mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading(), make_reading()]),
            FixedThermometer::disabled(),
        )
        .unwrap();
        let returned = mux.run(&run, &clock, &mut delay);
        assert_eq!(returned.close_count(), 1);

        assert_eq!(display.close_count(), 1);
        assert_eq!(display.ops.last(), Some(&Op::Close(true)));
        // Loop exited within one quantum of the request
        assert_eq!(clock.now_ms(), 3_000);
        assert_eq!(display.row(0), "                ");
    }

    #[test]
    fn test_shutdown_closes_without_writing() {
        let mut display = RecordingDisplay::new(16, 2);
        let mux = Multiplexer::start(
            &make_schedule(),
            &make_pages(),
            &mut display,
            ScriptedSensor::new(&[make_reading()]),
            FixedThermometer::disabled(),
        )
        .unwrap();
        let _ = mux.shutdown();
        let ops_after_close = display.ops.len();
        assert_eq!(display.ops.last(), Some(&Op::Close(true)));
        assert_eq!(ops_after_close, 4);
    }
}
