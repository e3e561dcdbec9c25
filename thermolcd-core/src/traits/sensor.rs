//! Climate sensor and system thermometer traits

use core::fmt;

/// Errors that can occur while reading the climate sensor
///
/// All variants are transient: the next read may succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Sensor gave no usable answer
    Unavailable,
    /// Sensor did not respond within the protocol timing
    Timeout,
    /// Frame checksum mismatch
    Checksum,
    /// Decoded value outside the sensor's physical range
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::Unavailable => f.write_str("sensor unavailable"),
            SensorError::Timeout => f.write_str("sensor timed out"),
            SensorError::Checksum => f.write_str("sensor checksum mismatch"),
            SensorError::OutOfRange => f.write_str("sensor reading out of range"),
        }
    }
}

/// One temperature/humidity sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Air temperature in degrees Celsius
    pub temperature_celsius: f32,
    /// Relative humidity in percent
    pub humidity_percent: f32,
}

impl Reading {
    /// Create a reading
    pub const fn new(temperature_celsius: f32, humidity_percent: f32) -> Self {
        Self {
            temperature_celsius,
            humidity_percent,
        }
    }
}

/// Trait for temperature/humidity sensors
///
/// Reads may be slow (a DHT22 retry loop takes seconds). Implementations
/// used directly by the multiplexer should return promptly, e.g. by
/// serving a cached sample produced elsewhere.
pub trait ClimateSensor {
    /// Take a reading
    fn read(&mut self) -> Result<Reading, SensorError>;
}

/// Trait for the SoC temperature source
pub trait SystemThermometer {
    /// Current SoC temperature in degrees Celsius, or `None` if unknown
    fn read_system_temperature(&mut self) -> Option<f32>;

    /// Whether the source exists at all
    ///
    /// Decided once when the source is constructed; a disabled source
    /// stays disabled for the process lifetime.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl<T: ClimateSensor + ?Sized> ClimateSensor for &mut T {
    fn read(&mut self) -> Result<Reading, SensorError> {
        (**self).read()
    }
}

impl<T: SystemThermometer + ?Sized> SystemThermometer for &mut T {
    fn read_system_temperature(&mut self) -> Option<f32> {
        (**self).read_system_temperature()
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}
