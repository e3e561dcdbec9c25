//! HD44780 character LCD
//!
//! Parallel-bus driver for HD44780-compatible 16x2 / 20x4 modules. Works
//! in 8-bit mode (D0-D7) or 4-bit mode (D4-D7). The RW line, if wired, is
//! held low: the driver never reads the busy flag and waits out each
//! instruction's execution time instead.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use heapless::Vec;
use log::debug;

use thermolcd_core::traits::display::GLYPH_SLOTS;
use thermolcd_core::traits::{CharDisplay, CursorMode, DisplayError};

// Instructions
const CLEAR_DISPLAY: u8 = 0x01;
const RETURN_HOME: u8 = 0x02;
const ENTRY_MODE_SET: u8 = 0x04;
const DISPLAY_CONTROL: u8 = 0x08;
const FUNCTION_SET: u8 = 0x20;
const SET_CGRAM_ADDR: u8 = 0x40;
const SET_DDRAM_ADDR: u8 = 0x80;

// Flags
const ENTRY_INCREMENT: u8 = 0x02;
const DISPLAY_ON: u8 = 0x04;
const CURSOR_ON: u8 = 0x02;
const BLINK_ON: u8 = 0x01;
const EIGHT_BIT_MODE: u8 = 0x10;
const TWO_LINES: u8 = 0x08;

/// ROM code of the degree sign in the A00 character set
const ROM_DEGREE: u8 = 0xDF;

/// Execution time of clear and home
const SLOW_INSTRUCTION_US: u32 = 2_000;

/// Execution time of every other instruction and data write
const FAST_INSTRUCTION_US: u32 = 50;

/// Wires between the host and the module
pub struct Hd44780Pins<P> {
    /// Register select: low for instructions, high for data
    pub rs: P,
    /// Read/write, held low; `None` if tied to ground
    pub rw: Option<P>,
    /// Enable strobe
    pub enable: P,
    /// D0-D7 for 8-bit mode, or D4-D7 for 4-bit mode
    pub data: Vec<P, 8>,
}

/// HD44780 driver
pub struct Hd44780<P, D> {
    pins: Hd44780Pins<P>,
    delay: D,
    columns: u8,
    rows: u8,
    cursor: (u8, u8),
    display_control: u8,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Initialise the module
    ///
    /// Runs the power-on reset-by-instruction sequence, selects the bus
    /// width, and leaves the display on, cleared, cursor hidden.
    pub fn new(
        pins: Hd44780Pins<P>,
        delay: D,
        columns: u8,
        rows: u8,
    ) -> Result<Self, DisplayError> {
        if !matches!(pins.data.len(), 4 | 8) || columns == 0 || !(1..=4).contains(&rows) {
            return Err(DisplayError::Open);
        }

        let mut lcd = Self {
            pins,
            delay,
            columns,
            rows,
            cursor: (0, 0),
            display_control: DISPLAY_ON,
        };
        lcd.init().map_err(|_| DisplayError::Open)?;
        debug!(
            "HD44780 ready: {}x{}, {}-bit bus",
            columns,
            rows,
            lcd.pins.data.len()
        );
        Ok(lcd)
    }

    fn eight_bit(&self) -> bool {
        self.pins.data.len() == 8
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        // Wait for Vcc to settle
        self.delay.delay_ms(50);
        pin(self.pins.rs.set_low())?;
        pin(self.pins.enable.set_low())?;
        if let Some(rw) = self.pins.rw.as_mut() {
            pin(rw.set_low())?;
        }

        let lines = if self.rows > 1 { TWO_LINES } else { 0 };
        if self.eight_bit() {
            for wait_us in [4_500, 4_500, 150] {
                self.write_bus(FUNCTION_SET | EIGHT_BIT_MODE)?;
                self.delay.delay_us(wait_us);
            }
            self.command(FUNCTION_SET | EIGHT_BIT_MODE | lines)?;
        } else {
            // Interface is still 8-bit here; each nibble is one transfer
            for wait_us in [4_500, 4_500, 150] {
                self.write_bus(0x03)?;
                self.delay.delay_us(wait_us);
            }
            self.write_bus(0x02)?;
            self.delay.delay_us(FAST_INSTRUCTION_US);
            self.command(FUNCTION_SET | lines)?;
        }

        self.command(DISPLAY_CONTROL)?;
        self.clear()?;
        self.command(ENTRY_MODE_SET | ENTRY_INCREMENT)?;
        self.command(DISPLAY_CONTROL | self.display_control)
    }

    /// Put `value` on the data lines and strobe enable once
    fn write_bus(&mut self, value: u8) -> Result<(), DisplayError> {
        for (bit, line) in self.pins.data.iter_mut().enumerate() {
            if value & (1 << bit) != 0 {
                pin(line.set_high())?;
            } else {
                pin(line.set_low())?;
            }
        }
        self.pulse_enable()
    }

    fn pulse_enable(&mut self) -> Result<(), DisplayError> {
        pin(self.pins.enable.set_low())?;
        self.delay.delay_us(1);
        pin(self.pins.enable.set_high())?;
        self.delay.delay_us(1);
        pin(self.pins.enable.set_low())?;
        self.delay.delay_us(FAST_INSTRUCTION_US);
        Ok(())
    }

    fn send(&mut self, value: u8, data: bool) -> Result<(), DisplayError> {
        if data {
            pin(self.pins.rs.set_high())?;
        } else {
            pin(self.pins.rs.set_low())?;
        }
        if self.eight_bit() {
            self.write_bus(value)
        } else {
            self.write_bus(value >> 4)?;
            self.write_bus(value & 0x0F)
        }
    }

    fn command(&mut self, value: u8) -> Result<(), DisplayError> {
        self.send(value, false)
    }

    fn ddram_address(&self, row: u8, col: u8) -> u8 {
        let offsets = [0x00, 0x40, self.columns, 0x40 + self.columns];
        offsets[usize::from(row)] + col
    }
}

/// Map a character to the module's A00 ROM
///
/// `\x00`-`\x07` address the custom glyph slots.
pub fn rom_code(c: char) -> u8 {
    match c {
        '\x00'..='\x07' | ' '..='}' => c as u8,
        '°' => ROM_DEGREE,
        _ => b'?',
    }
}

fn pin<E>(result: Result<(), E>) -> Result<(), DisplayError> {
    result.map_err(|_| DisplayError::Write)
}

impl<P: OutputPin, D: DelayNs> CharDisplay for Hd44780<P, D> {
    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        if row >= self.rows || col >= self.columns {
            return Err(DisplayError::InvalidPosition);
        }
        self.command(SET_DDRAM_ADDR | self.ddram_address(row, col))?;
        self.cursor = (row, col);
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DisplayError> {
        for c in text.chars() {
            // The controller would wrap into an off-screen DDRAM region
            if self.cursor.1 >= self.columns {
                break;
            }
            self.send(rom_code(c), true)?;
            self.cursor.1 += 1;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CLEAR_DISPLAY)?;
        self.delay.delay_us(SLOW_INSTRUCTION_US);
        self.cursor = (0, 0);
        Ok(())
    }

    fn home(&mut self) -> Result<(), DisplayError> {
        self.command(RETURN_HOME)?;
        self.delay.delay_us(SLOW_INSTRUCTION_US);
        self.cursor = (0, 0);
        Ok(())
    }

    fn define_glyph(&mut self, slot: u8, bitmap: [u8; 8]) -> Result<(), DisplayError> {
        if slot >= GLYPH_SLOTS {
            return Err(DisplayError::InvalidGlyphSlot);
        }
        self.command(SET_CGRAM_ADDR | (slot << 3))?;
        for row in bitmap {
            self.send(row & 0x1F, true)?;
        }
        // Back to DDRAM so the next write lands on screen
        let (row, col) = self.cursor;
        let col = col.min(self.columns - 1);
        self.command(SET_DDRAM_ADDR | self.ddram_address(row, col))
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) -> Result<(), DisplayError> {
        self.display_control = match mode {
            CursorMode::Hide => DISPLAY_ON,
            CursorMode::Line => DISPLAY_ON | CURSOR_ON,
            CursorMode::Blink => DISPLAY_ON | BLINK_ON,
        };
        self.command(DISPLAY_CONTROL | self.display_control)
    }

    fn close(&mut self, clear: bool) -> Result<(), DisplayError> {
        if clear {
            self.clear()?;
        }
        self.set_cursor_mode(CursorMode::Hide)
    }

    fn dimensions(&self) -> (u8, u8) {
        (self.columns, self.rows)
    }
}
