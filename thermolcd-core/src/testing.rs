//! Test doubles shared by the unit tests

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use crate::run::RunState;
use crate::traits::clock::{Clock, Millis};
use crate::traits::{
    CharDisplay, ClimateSensor, CursorMode, DisplayError, Reading, SensorError, SystemThermometer,
};

/// Calls observed by `RecordingDisplay`
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetCursor(u8, u8),
    Write(String),
    Clear,
    Home,
    DefineGlyph(u8, [u8; 8]),
    CursorMode(CursorMode),
    Close(bool),
}

/// In-memory panel that records every call
pub struct RecordingDisplay {
    pub columns: u8,
    pub rows: u8,
    pub ops: Vec<Op>,
    pub grid: Vec<Vec<char>>,
    pub cursor: (u8, u8),
    pub fail_writes: bool,
    pub fail_glyphs: bool,
}

impl RecordingDisplay {
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            columns,
            rows,
            ops: Vec::new(),
            grid: Self::blank(columns, rows),
            cursor: (0, 0),
            fail_writes: false,
            fail_glyphs: false,
        }
    }

    fn blank(columns: u8, rows: u8) -> Vec<Vec<char>> {
        (0..rows).map(|_| std::vec![' '; columns as usize]).collect()
    }

    /// Visible text of a row
    pub fn row(&self, row: usize) -> String {
        self.grid[row].iter().collect()
    }

    /// All text written to `row`, in order
    pub fn writes_to(&self, row: u8) -> Vec<String> {
        let mut current_row = 0;
        let mut writes = Vec::new();
        for op in &self.ops {
            match op {
                Op::SetCursor(r, _) => current_row = *r,
                Op::Home | Op::Clear => current_row = 0,
                Op::Write(text) if current_row == row => writes.push(text.clone()),
                _ => {}
            }
        }
        writes
    }

    pub fn close_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, Op::Close(_))).count()
    }
}

impl CharDisplay for RecordingDisplay {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= self.rows || col >= self.columns {
            return Err(DisplayError::InvalidPosition);
        }
        self.ops.push(Op::SetCursor(row, col));
        self.cursor = (row, col);
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.fail_writes {
            return Err(DisplayError::Write);
        }
        self.ops.push(Op::Write(text.into()));
        let (row, mut col) = self.cursor;
        for c in text.chars() {
            if col >= self.columns {
                break;
            }
            self.grid[row as usize][col as usize] = c;
            col += 1;
        }
        self.cursor = (row, col);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::Clear);
        self.grid = Self::blank(self.columns, self.rows);
        self.cursor = (0, 0);
        Ok(())
    }

    fn home(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::Home);
        self.cursor = (0, 0);
        Ok(())
    }

    fn define_glyph(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), DisplayError> {
        if self.fail_glyphs {
            return Err(DisplayError::Write);
        }
        self.ops.push(Op::DefineGlyph(slot, bitmap));
        Ok(())
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) -> Result<(), DisplayError> {
        self.ops.push(Op::CursorMode(mode));
        Ok(())
    }

    fn close(&mut self, clear: bool) -> Result<(), DisplayError> {
        if clear {
            self.grid = Self::blank(self.columns, self.rows);
        }
        self.ops.push(Op::Close(clear));
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (self.columns, self.rows)
    }
}

/// Sensor replaying a script, then reporting `Unavailable`
pub struct ScriptedSensor<'c> {
    script: VecDeque<Result<Reading, SensorError>>,
    pub reads: usize,
    stall: Option<(&'c SimClock, Millis)>,
}

impl<'c> ScriptedSensor<'c> {
    pub fn new(script: &[Result<Reading, SensorError>]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            reads: 0,
            stall: None,
        }
    }

    /// The first read advances `clock` by `ms`, like a blocking sensor
    pub fn stalling_once(mut self, clock: &'c SimClock, ms: Millis) -> Self {
        self.stall = Some((clock, ms));
        self
    }
}

impl ClimateSensor for ScriptedSensor<'_> {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.reads += 1;
        if let Some((clock, ms)) = self.stall.take() {
            clock.advance(ms);
        }
        self.script.pop_front().unwrap_or(Err(SensorError::Unavailable))
    }
}

/// Thermometer with a constant answer
pub struct FixedThermometer {
    value: Option<f32>,
    enabled: bool,
}

impl FixedThermometer {
    pub fn reading(celsius: f32) -> Self {
        Self {
            value: Some(celsius),
            enabled: true,
        }
    }

    pub fn disabled() -> Self {
        Self {
            value: None,
            enabled: false,
        }
    }
}

impl SystemThermometer for FixedThermometer {
    fn read_system_temperature(&mut self) -> Option<f32> {
        if self.enabled {
            self.value
        } else {
            None
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Manually advanced clock
#[derive(Default)]
pub struct SimClock {
    now: Cell<Millis>,
}

impl SimClock {
    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for SimClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Delay that moves a `SimClock` forward and can request a stop
pub struct SimDelay<'c> {
    clock: &'c SimClock,
    stop: Option<(&'c RunState, Millis)>,
    pub calls: usize,
}

impl<'c> SimDelay<'c> {
    pub fn new(clock: &'c SimClock) -> Self {
        Self {
            clock,
            stop: None,
            calls: 0,
        }
    }

    /// Flip `run` to stopped once the clock reaches `at`
    pub fn stop_at(mut self, run: &'c RunState, at: Millis) -> Self {
        self.stop = Some((run, at));
        self
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.clock.advance(Millis::from(ns / 1_000_000));
        if let Some((run, at)) = self.stop {
            if self.clock.now_ms() >= at {
                run.request_stop();
            }
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_ns(ms.saturating_mul(1_000_000));
    }
}
