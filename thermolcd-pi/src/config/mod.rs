//! Application configuration
//!
//! The TOML file maps onto [`AppConfig`]. Scheduling, page and intro
//! sections deserialize straight into the core configuration types; the
//! display, sensor and thermal sections describe the Linux wiring.
//!
//! ```toml
//! [display]
//! kind = "hd44780"
//! columns = 16
//! rows = 2
//!
//! [display.pins]
//! rs = 21
//! enable = 16
//! data = [26, 19, 13, 6, 1, 7, 8, 25]
//!
//! [[page]]
//! title = "Pi Temperature"
//! source = "sensor"
//! ```

pub mod loader;

pub use loader::load;

use std::path::PathBuf;

use serde::Deserialize;
use thermolcd_core::config::{
    ContentSource, IntroConfig, PageConfig, ScheduleConfig, DEFAULT_COLUMNS, DEFAULT_REFRESH_MS,
    DEFAULT_ROWS,
};

/// Default thermal zone directory
pub const DEFAULT_THERMAL_ZONE: &str = "/sys/class/thermal/thermal_zone0";

/// Which character display to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayKind {
    /// HD44780 module on sysfs GPIO
    #[default]
    Hd44780,
    /// Box drawn on the terminal
    Console,
}

/// Which climate sensor to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// DHT22 on one sysfs GPIO
    #[default]
    Dht22,
    /// Random readings
    Simulated,
}

/// HD44780 wiring, BCM numbering
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub rs: u64,
    /// Omit when RW is tied to ground
    pub rw: Option<u64>,
    pub enable: u64,
    /// D0-D7, or D4-D7 for a 4-bit bus
    pub data: Vec<u64>,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            rs: 21,
            rw: Some(20),
            enable: 16,
            data: vec![26, 19, 13, 6, 1, 7, 8, 25],
        }
    }
}

/// `[display]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub kind: DisplayKind,
    pub columns: u8,
    pub rows: u8,
    pub pins: PinConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            kind: DisplayKind::default(),
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            pins: PinConfig::default(),
        }
    }
}

/// `[sensor]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub kind: SensorKind,
    /// Data pin, BCM numbering
    pub pin: u64,
    /// Attempts per reading before giving up
    pub retries: u8,
    /// Pause between failed attempts
    pub retry_delay_ms: u32,
    /// Pause between readings
    pub poll_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            kind: SensorKind::default(),
            pin: 23,
            retries: 15,
            retry_delay_ms: 2_000,
            poll_ms: DEFAULT_REFRESH_MS,
        }
    }
}

/// `[thermal]` section
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    /// Thermal zone directory containing `temp`
    pub zone: PathBuf,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            zone: PathBuf::from(DEFAULT_THERMAL_ZONE),
        }
    }
}

/// Complete configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub sensor: SensorConfig,
    pub thermal: ThermalConfig,
    pub schedule: ScheduleConfig,
    pub intro: IntroConfig,
    #[serde(rename = "page")]
    pub pages: Vec<PageConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            sensor: SensorConfig::default(),
            thermal: ThermalConfig::default(),
            schedule: ScheduleConfig::default(),
            intro: IntroConfig::default(),
            pages: vec![PageConfig::new("Pi Temperature", ContentSource::Sensor)],
        }
    }
}
