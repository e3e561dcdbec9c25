//! Intro animation
//!
//! Types a greeting and an author credit one character at a time with a
//! blinking cursor, before the pages take over the display.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::config::IntroConfig;
use crate::format::centre;
use crate::run::RunState;
use crate::traits::{CharDisplay, CursorMode, DisplayError};

/// First line of the intro
pub const GREETING: &str = "Welcome!";

/// Continues the first line when an author is configured
pub const CREDIT_PREFIX: &str = " Made by";

/// Pause after the greeting
const GREETING_PAUSE_MS: u32 = 250;

/// Pause after the credit, before the display is cleared
const CREDIT_PAUSE_MS: u32 = 500;

/// How the intro ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    /// Played to the end
    Completed,
    /// A stop was requested part-way through
    Interrupted,
}

/// Writes text character by character with a delay
struct Typist<'a, D, P> {
    display: &'a mut D,
    delay: &'a mut P,
    run: &'a RunState,
    interval_ms: u32,
    quantum_ms: u32,
}

impl<D: CharDisplay, P: DelayNs> Typist<'_, D, P> {
    /// Type `text`; spaces are written without a pause
    ///
    /// Returns `Ok(false)` if a stop was requested.
    fn type_text(&mut self, text: &str) -> Result<bool, DisplayError> {
        let mut buf = [0u8; 4];
        for c in text.chars() {
            self.display.write(c.encode_utf8(&mut buf))?;
            if c != ' ' && !self.pause(self.interval_ms) {
                return Ok(false);
            }
        }
        Ok(self.run.is_running())
    }

    fn pause(&mut self, ms: u32) -> bool {
        self.run.pause(self.delay, ms, self.quantum_ms)
    }
}

/// Play the intro
///
/// Every wait is sliced to `quantum_ms` so a stop request ends the intro
/// promptly. The cursor is hidden and the display cleared on both normal
/// and interrupted exit.
pub fn play<D: CharDisplay, P: DelayNs>(
    display: &mut D,
    delay: &mut P,
    run: &RunState,
    config: &IntroConfig,
    quantum_ms: u32,
) -> Result<IntroOutcome, DisplayError> {
    info!("Playing intro...");
    let (columns, _) = display.dimensions();

    display.clear()?;
    display.set_cursor_mode(CursorMode::Blink)?;

    let mut typist = Typist {
        display: &mut *display,
        delay,
        run,
        interval_ms: config.typing_ms,
        quantum_ms,
    };

    let mut completed = typist.type_text(GREETING)? && typist.pause(GREETING_PAUSE_MS);
    if completed && !config.author.is_empty() {
        completed = typist.type_text(CREDIT_PREFIX)?;
        if completed {
            typist.display.set_cursor(1, 0)?;
            let credit = centre(&config.author, usize::from(columns), false);
            completed = typist.type_text(&credit)?;
        }
    }
    completed = completed && typist.pause(CREDIT_PAUSE_MS);

    display.set_cursor_mode(CursorMode::Hide)?;
    display.clear()?;

    Ok(if completed {
        IntroOutcome::Completed
    } else {
        IntroOutcome::Interrupted
    })
}
