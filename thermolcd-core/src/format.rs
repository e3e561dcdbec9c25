//! Fixed-width text layout
//!
//! Pure helpers that turn titles and readings into rows for a character
//! display. Widths and offsets are counted in characters, not bytes.

use core::fmt::Write;
use core::iter;

use heapless::String;

use crate::config::MAX_COLUMNS;
use crate::traits::Reading;

/// Capacity of a rendered line in bytes
///
/// Room for a full row of four-byte characters on the widest panel.
pub const MAX_LINE_LEN: usize = MAX_COLUMNS as usize * 4;

/// A rendered display line
pub type Line = String<MAX_LINE_LEN>;

/// Glyph slot holding the degree sign
pub const DEGREE_SLOT: u8 = 0;

/// Code point that draws the degree glyph once registered
pub const DEGREE_CHAR: char = '\x00';

/// 5x8 bitmap of a small raised circle
pub const DEGREE_GLYPH: [u8; 8] = [
    0b01100, 0b10010, 0b10010, 0b01100, 0b00000, 0b00000, 0b00000, 0b00000,
];

/// Placeholder shown on the value row right after a page change
pub const LOADING_TEXT: &str = "Loading...";

/// Centre `text` within `width` columns
///
/// Left padding is `floor((width - len) / 2)`, so odd leftover space goes
/// to the right. With `span_entire_line` the result is right-padded to
/// exactly `width`. Text at least `width` long is returned unpadded and
/// untruncated.
pub fn centre(text: &str, width: usize, span_entire_line: bool) -> Line {
    let len = text.chars().count();
    let padding = width.saturating_sub(len) / 2;

    let mut line = Line::new();
    push_chars(&mut line, iter::repeat(' ').take(padding));
    push_chars(&mut line, text.chars());
    if span_entire_line {
        push_chars(&mut line, iter::repeat(' ').take(width.saturating_sub(padding + len)));
    }
    line
}

/// Window of `width` characters into a title entering from the right
///
/// The title is prefixed with `width` spaces so stage 0 is blank and stage
/// `width` shows the title flush left. Stages past `width + len` are blank.
pub fn scroll_fragment(text: &str, width: usize, stage: usize) -> Line {
    let mut line = Line::new();
    push_chars(
        &mut line,
        iter::repeat(' ')
            .take(width)
            .chain(text.chars())
            .skip(stage)
            .chain(iter::repeat(' '))
            .take(width),
    );
    line
}

/// Truncate or right-pad `text` to exactly `width` characters
pub fn fit(text: &str, width: usize) -> Line {
    let mut line = Line::new();
    push_chars(
        &mut line,
        text.chars().chain(iter::repeat(' ')).take(width),
    );
    line
}

/// Humidity and temperature, e.g. `45.3%  21.4°C`
pub fn climate_line(reading: &Reading) -> Line {
    let mut line = Line::new();
    // Capacity covers any pair of finite f32 values at one decimal
    let _ = write!(
        line,
        "{:.1}%  {:.1}{}C",
        reading.humidity_percent, reading.temperature_celsius, DEGREE_CHAR
    );
    line
}

/// SoC temperature, e.g. `48.9°C`
pub fn system_line(celsius: f32) -> Line {
    let mut line = Line::new();
    let _ = write!(line, "{:.1}{}C", celsius, DEGREE_CHAR);
    line
}

/// Push characters until the line is full
fn push_chars(line: &mut Line, chars: impl Iterator<Item = char>) {
    for c in chars {
        if line.push(c).is_err() {
            break;
        }
    }
}
