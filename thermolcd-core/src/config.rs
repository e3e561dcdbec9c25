//! Configuration type definitions
//!
//! Board-agnostic schedule, page and intro settings. The binary fills
//! these from TOML; with the `serde` feature they deserialize directly.

use heapless::String;

use crate::scheduler::{JobKind, StartError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of pages
pub const MAX_PAGES: usize = 8;

/// Maximum title length in bytes
pub const MAX_TITLE_LEN: usize = 48;

/// Widest panel a rendered line can fill
pub const MAX_COLUMNS: u8 = 40;

/// Default panel width
pub const DEFAULT_COLUMNS: u8 = 16;

/// Default panel height
pub const DEFAULT_ROWS: u8 = 2;

/// Main loop quantum; also the worst-case shutdown latency
pub const DEFAULT_TICK_MS: u32 = 20;

/// Title scroll step on a real LCD
pub const DEFAULT_SCROLL_MS: u32 = 500;

/// Title scroll step for fast sinks such as a terminal
pub const FAST_SCROLL_MS: u32 = 100;

/// Value row refresh period
pub const DEFAULT_REFRESH_MS: u32 = 2_000;

/// Per-character delay of the intro animation
pub const DEFAULT_TYPING_MS: u32 = 100;

/// Where a page gets its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentSource {
    /// Temperature and humidity from the climate sensor
    #[default]
    Sensor,
    /// SoC temperature from the thermal zone
    System,
}

/// Page definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PageConfig {
    /// Scrolling title
    pub title: String<MAX_TITLE_LEN>,
    /// Value row source
    pub source: ContentSource,
}

impl PageConfig {
    /// Create a page, truncating the title to `MAX_TITLE_LEN` bytes on a
    /// character boundary
    pub fn new(title: &str, source: ContentSource) -> Self {
        let mut stored = String::new();
        for c in title.chars() {
            if stored.push(c).is_err() {
                break;
            }
        }
        Self {
            title: stored,
            source,
        }
    }
}

/// When the active page changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RotationPolicy {
    /// After the title has fully scrolled this many times
    AfterScrolls(u8),
    /// On a fixed period in milliseconds
    EveryMs(u32),
}

impl Default for RotationPolicy {
    fn default() -> Self {
        RotationPolicy::AfterScrolls(1)
    }
}

/// Job cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduleConfig {
    /// Pause between ticks of the main loop
    pub tick_ms: u32,
    /// Title scroll step
    pub scroll_ms: u32,
    /// Value refresh period
    pub refresh_ms: u32,
    /// Page rotation policy
    pub rotation: RotationPolicy,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            scroll_ms: DEFAULT_SCROLL_MS,
            refresh_ms: DEFAULT_REFRESH_MS,
            rotation: RotationPolicy::default(),
        }
    }
}

impl ScheduleConfig {
    /// Reject zero cadences
    pub fn validate(&self) -> Result<(), StartError> {
        if self.tick_ms == 0 {
            return Err(StartError::NonPositiveCadence(JobKind::Tick));
        }
        if self.scroll_ms == 0 {
            return Err(StartError::NonPositiveCadence(JobKind::Scroll));
        }
        if self.refresh_ms == 0 {
            return Err(StartError::NonPositiveCadence(JobKind::Refresh));
        }
        match self.rotation {
            RotationPolicy::AfterScrolls(0) | RotationPolicy::EveryMs(0) => {
                Err(StartError::NonPositiveCadence(JobKind::Rotate))
            }
            _ => Ok(()),
        }
    }
}

/// Intro animation settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IntroConfig {
    /// Play the intro before the pages start
    pub enabled: bool,
    /// Credit typed on the second row; empty skips the credit
    pub author: String<MAX_TITLE_LEN>,
    /// Delay after each typed non-space character
    pub typing_ms: u32,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            author: String::new(),
            typing_ms: DEFAULT_TYPING_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_is_valid() {
        assert_eq!(ScheduleConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_cadences_rejected() {
        let mut schedule = ScheduleConfig::default();
        schedule.refresh_ms = 0;
        assert_eq!(
            schedule.validate(),
            Err(StartError::NonPositiveCadence(JobKind::Refresh))
        );

        let mut schedule = ScheduleConfig::default();
        schedule.rotation = RotationPolicy::AfterScrolls(0);
        assert_eq!(
            schedule.validate(),
            Err(StartError::NonPositiveCadence(JobKind::Rotate))
        );

        let mut schedule = ScheduleConfig::default();
        schedule.tick_ms = 0;
        assert_eq!(
            schedule.validate(),
            Err(StartError::NonPositiveCadence(JobKind::Tick))
        );
    }

    #[test]
    fn test_page_title_truncated_on_char_boundary() {
        let long = "Température ".repeat(6);
        let page = PageConfig::new(&long, ContentSource::System);
        assert!(page.title.len() <= MAX_TITLE_LEN);
        assert!(long.starts_with(page.title.as_str()));
    }
}
