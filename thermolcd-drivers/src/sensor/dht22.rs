//! DHT22 / AM2302 temperature and humidity sensor
//!
//! Single-wire protocol: the host pulls the line low for >1ms and
//! releases it; the sensor answers with an 80us low / 80us high preamble
//! followed by 40 bits. Each bit is a ~50us low followed by a high pulse
//! of ~26us (zero) or ~70us (one). The frame is humidity x10 (16 bits),
//! temperature x10 (15 bits plus sign), and an 8-bit checksum.
//!
//! Phases are measured in polls, not microseconds. A bit is a one when
//! its high phase outlasts its own low phase.

use embedded_hal::delay::DelayNs;
use log::debug;

use thermolcd_core::traits::{ClimateSensor, Reading, SensorError};

/// Host start pulse length
const START_LOW_US: u32 = 1_100;

/// Poll budget for any single phase of the waveform
const PHASE_TIMEOUT_POLLS: u32 = 200;

/// Humidity range the sensor can report
const HUMIDITY_RANGE: core::ops::RangeInclusive<f32> = 0.0..=100.0;

/// Temperature range the sensor can report
const TEMPERATURE_RANGE: core::ops::RangeInclusive<f32> = -40.0..=80.0;

/// Open-drain data line with a pull-up
///
/// Implementations switch the GPIO between output-low and input.
pub trait DataLine {
    /// Pin error
    type Error;

    /// Actively pull the line low
    fn drive_low(&mut self) -> Result<(), Self::Error>;

    /// Stop driving and let the pull-up (or the sensor) set the level
    fn release(&mut self) -> Result<(), Self::Error>;

    /// Sample the line
    fn is_high(&mut self) -> Result<bool, Self::Error>;
}

/// DHT22 driver
pub struct Dht22<L, D> {
    line: L,
    delay: D,
}

impl<L: DataLine, D: DelayNs> Dht22<L, D> {
    /// Create a driver; the line is released immediately
    pub fn new(mut line: L, delay: D) -> Self {
        let _ = line.release();
        Self { line, delay }
    }

    /// Read, retrying on failure
    ///
    /// Waits `retry_delay_ms` between attempts (the sensor needs about
    /// two seconds between conversions). Returns the last error if every
    /// attempt fails.
    pub fn read_retry(&mut self, attempts: u8, retry_delay_ms: u32) -> Result<Reading, SensorError> {
        let mut last = SensorError::Unavailable;
        for attempt in 1..=attempts.max(1) {
            match self.read_frame().and_then(decode) {
                Ok(reading) => return Ok(reading),
                Err(e) => {
                    debug!("DHT22 attempt {}/{} failed: {}", attempt, attempts, e);
                    last = e;
                }
            }
            if attempt < attempts {
                self.delay.delay_ms(retry_delay_ms);
            }
        }
        Err(last)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.line.drive_low().map_err(|_| SensorError::Unavailable)?;
        self.delay.delay_us(START_LOW_US);
        self.line.release().map_err(|_| SensorError::Unavailable)?;

        // Preamble: pull-up high, sensor low 80us, sensor high 80us
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low = self.wait_while(false)?;
            let high = self.wait_while(true)?;
            if high > low {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Wait for the line to leave `level`; returns the number of polls
    fn wait_while(&mut self, level: bool) -> Result<u32, SensorError> {
        let mut polls = 0;
        loop {
            let high = self.line.is_high().map_err(|_| SensorError::Unavailable)?;
            if high != level {
                return Ok(polls);
            }
            if polls >= PHASE_TIMEOUT_POLLS {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
            polls += 1;
        }
    }
}

impl<L: DataLine, D: DelayNs> ClimateSensor for Dht22<L, D> {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.read_frame().and_then(decode)
    }
}

/// Decode a 5-byte frame
pub fn decode(frame: [u8; 5]) -> Result<Reading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature = if frame[2] & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    };

    if !HUMIDITY_RANGE.contains(&humidity) || !TEMPERATURE_RANGE.contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }
    Ok(Reading::new(temperature, humidity))
}
