//! Character display driver trait
//!
//! Models an HD44780-style text panel: a cursor, fixed rows and columns,
//! and eight user-definable 5x8 glyphs addressed by code points 0-7.

use core::fmt;

/// Number of custom glyph slots on a character LCD
pub const GLYPH_SLOTS: u8 = 8;

/// Errors that can occur while driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Device could not be opened or initialised
    Open,
    /// A write to the device failed
    Write,
    /// Cursor position outside the panel
    InvalidPosition,
    /// Glyph slot outside 0-7
    InvalidGlyphSlot,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Open => f.write_str("display could not be opened"),
            DisplayError::Write => f.write_str("display write failed"),
            DisplayError::InvalidPosition => f.write_str("cursor position out of range"),
            DisplayError::InvalidGlyphSlot => f.write_str("glyph slot out of range"),
        }
    }
}

/// Cursor appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// No visible cursor
    #[default]
    Hide,
    /// Underline cursor
    Line,
    /// Blinking block cursor
    Blink,
}

/// Trait for character displays
///
/// Writes land at the current cursor and advance it. They never wrap to
/// the next row or scroll the panel: text past the last column is dropped.
pub trait CharDisplay {
    /// Move the cursor
    ///
    /// - `row`: Row number (0-based)
    /// - `col`: Column number (0-based)
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError>;

    /// Write text at the current cursor position
    fn write(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Clear the entire display and home the cursor
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Move the cursor to row 0, column 0
    fn home(&mut self) -> Result<(), DisplayError>;

    /// Register a custom 5x8 glyph
    ///
    /// The glyph is then drawn by writing the code point `slot` (e.g. `'\x00'`).
    fn define_glyph(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), DisplayError>;

    /// Change the cursor appearance
    fn set_cursor_mode(&mut self, mode: CursorMode) -> Result<(), DisplayError>;

    /// Release the device, optionally clearing it first
    fn close(&mut self, clear: bool) -> Result<(), DisplayError>;

    /// Get the display dimensions
    ///
    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);

    /// Write text at a position
    fn write_at(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(row, col)?;
        self.write(text)
    }
}

impl<T: CharDisplay + ?Sized> CharDisplay for &mut T {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        (**self).set_cursor(row, col)
    }

    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        (**self).write(text)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn home(&mut self) -> Result<(), DisplayError> {
        (**self).home()
    }

    fn define_glyph(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), DisplayError> {
        (**self).define_glyph(slot, bitmap)
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) -> Result<(), DisplayError> {
        (**self).set_cursor_mode(mode)
    }

    fn close(&mut self, clear: bool) -> Result<(), DisplayError> {
        (**self).close(clear)
    }

    fn dimensions(&self) -> (u8, u8) {
        (**self).dimensions()
    }
}
