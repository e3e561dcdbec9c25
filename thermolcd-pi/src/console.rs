//! Character LCD drawn on a terminal
//!
//! Draws a box the size of the panel once, then updates its rows in
//! place with ANSI cursor movement. The terminal cursor rests just after
//! the bottom border between writes, so a write at row `r` moves up
//! `rows - r` lines and comes back down with as many newlines.

use std::io::Write;

use thermolcd_core::format::DEGREE_CHAR;
use thermolcd_core::traits::display::GLYPH_SLOTS;
use thermolcd_core::traits::{CharDisplay, CursorMode, DisplayError};

/// Cursor to the start of the previous line
const PREVIOUS_LINE: &str = "\x1b[F";

/// Terminal stand-in for an HD44780
pub struct ConsoleLcd<W: Write> {
    out: W,
    columns: u8,
    rows: u8,
    cursor: (u8, u8),
}

impl<W: Write> ConsoleLcd<W> {
    /// Draw an empty panel of `columns` x `rows`
    pub fn new(mut out: W, columns: u8, rows: u8) -> Result<Self, DisplayError> {
        let width = usize::from(columns);
        let mut frame = format!("┌{}┐\n", "─".repeat(width));
        for _ in 0..rows {
            frame.push_str(&format!("│{}│\n", " ".repeat(width)));
        }
        frame.push_str(&format!("└{}┘", "─".repeat(width)));

        out.write_all(frame.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|_| DisplayError::Open)?;

        Ok(Self {
            out,
            columns,
            rows,
            cursor: (0, 0),
        })
    }

    fn emit(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let lines = usize::from(self.rows - row);
        write!(
            self.out,
            "{}\x1b[{}G{}{}",
            PREVIOUS_LINE.repeat(lines),
            usize::from(col) + 2,
            text,
            "\n".repeat(lines)
        )
        .and_then(|()| self.out.flush())
        .map_err(|_| DisplayError::Write)
    }
}

/// Terminal rendering of a panel character
fn render(c: char) -> char {
    match c {
        DEGREE_CHAR => '°',
        c if c.is_control() => ' ',
        c => c,
    }
}

impl<W: Write> CharDisplay for ConsoleLcd<W> {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= self.rows || col >= self.columns {
            return Err(DisplayError::InvalidPosition);
        }
        self.cursor = (row, col);
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        let (row, col) = self.cursor;
        let room = usize::from(self.columns.saturating_sub(col));
        let visible: String = text.chars().take(room).map(render).collect();
        if visible.is_empty() {
            return Ok(());
        }

        self.emit(row, col, &visible)?;
        // room fits in u8, so the count does too
        self.cursor.1 = col + visible.chars().count() as u8;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let blank = " ".repeat(usize::from(self.columns));
        for row in 0..self.rows {
            self.emit(row, 0, &blank)?;
        }
        self.cursor = (0, 0);
        Ok(())
    }

    fn home(&mut self) -> Result<(), DisplayError> {
        self.cursor = (0, 0);
        Ok(())
    }

    fn define_glyph(&mut self, slot: u8, _bitmap: [u8; 8]) -> Result<(), DisplayError> {
        if slot >= GLYPH_SLOTS {
            return Err(DisplayError::InvalidGlyphSlot);
        }
        Ok(())
    }

    fn set_cursor_mode(&mut self, _mode: CursorMode) -> Result<(), DisplayError> {
        // The terminal cursor stays parked below the box
        Ok(())
    }

    fn close(&mut self, clear: bool) -> Result<(), DisplayError> {
        if clear {
            self.clear()?;
        }
        // Leave the shell prompt below the box
        self.out
            .write_all(b"\n")
            .and_then(|()| self.out.flush())
            .map_err(|_| DisplayError::Write)
    }

    fn dimensions(&self) -> (u8, u8) {
        (self.columns, self.rows)
    }
}
