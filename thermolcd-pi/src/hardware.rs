//! Raspberry Pi wiring over sysfs GPIO
//!
//! One [`GpioLine`] type serves both the HD44780 bus (push-pull outputs)
//! and the DHT22 data wire (switched between output-low and input).

use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};
use linux_embedded_hal::sysfs_gpio::{self, Direction, Pin};
use linux_embedded_hal::Delay;
use log::{debug, warn};

use thermolcd_core::traits::{ClimateSensor, Reading, SensorError};
use thermolcd_drivers::lcd::{Hd44780, Hd44780Pins};
use thermolcd_drivers::sensor::{DataLine, Dht22};

use crate::config::{DisplayConfig, SensorConfig};

/// Time for udev to apply permissions after an export
const EXPORT_SETTLE: Duration = Duration::from_millis(10);

/// HD44780 on sysfs GPIO
pub type PiLcd = Hd44780<GpioLine, Delay>;

/// DHT22 on sysfs GPIO, read with retries
pub struct PiDht22 {
    dht: Dht22<GpioLine, Delay>,
    retries: u8,
    retry_delay_ms: u32,
}

impl ClimateSensor for PiDht22 {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.dht.read_retry(self.retries, self.retry_delay_ms)
    }
}

/// Failure on one GPIO line
#[derive(Debug, thiserror::Error)]
#[error("GPIO {line}: {source}")]
pub struct GpioError {
    line: u64,
    #[source]
    source: sysfs_gpio::Error,
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Exported sysfs GPIO line, unexported on drop
pub struct GpioLine {
    pin: Pin,
    line: u64,
}

impl GpioLine {
    fn export(line: u64, direction: Direction) -> Result<Self, GpioError> {
        let pin = Pin::new(line);
        let gpio = Self { pin, line };
        gpio.check(gpio.pin.export())?;
        thread::sleep(EXPORT_SETTLE);
        gpio.check(gpio.pin.set_direction(direction))?;
        debug!("GPIO {} exported", line);
        Ok(gpio)
    }

    /// Export `line` as an output driven low
    pub fn output(line: u64) -> Result<Self, GpioError> {
        Self::export(line, Direction::Low)
    }

    /// Export `line` as an input, for a wire with a pull-up
    pub fn open_drain(line: u64) -> Result<Self, GpioError> {
        Self::export(line, Direction::In)
    }

    fn check<T>(&self, result: sysfs_gpio::Result<T>) -> Result<T, GpioError> {
        result.map_err(|source| GpioError {
            line: self.line,
            source,
        })
    }
}

impl Drop for GpioLine {
    fn drop(&mut self) {
        if let Err(e) = self.pin.unexport() {
            warn!("GPIO {}: unexport failed: {}", self.line, e);
        }
    }
}

impl ErrorType for GpioLine {
    type Error = GpioError;
}

impl OutputPin for GpioLine {
    fn set_low(&mut self) -> Result<(), GpioError> {
        self.check(self.pin.set_value(0))
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.check(self.pin.set_value(1))
    }
}

impl DataLine for GpioLine {
    type Error = GpioError;

    fn drive_low(&mut self) -> Result<(), GpioError> {
        self.check(self.pin.set_direction(Direction::Low))
    }

    fn release(&mut self) -> Result<(), GpioError> {
        self.check(self.pin.set_direction(Direction::In))
    }

    fn is_high(&mut self) -> Result<bool, GpioError> {
        self.check(self.pin.get_value()).map(|v| v != 0)
    }
}

/// Export the LCD pins and initialise the module
pub fn open_lcd(config: &DisplayConfig) -> Result<PiLcd> {
    let pins = &config.pins;
    let mut data = heapless::Vec::new();
    for &line in &pins.data {
        let gpio = GpioLine::output(line).context("exporting LCD data pin")?;
        data.push(gpio)
            .map_err(|_| anyhow!("too many LCD data pins: {}", pins.data.len()))?;
    }

    let bus = Hd44780Pins {
        rs: GpioLine::output(pins.rs).context("exporting LCD RS pin")?,
        rw: pins
            .rw
            .map(GpioLine::output)
            .transpose()
            .context("exporting LCD RW pin")?,
        enable: GpioLine::output(pins.enable).context("exporting LCD E pin")?,
        data,
    };

    Hd44780::new(bus, Delay, config.columns, config.rows)
        .map_err(|e| anyhow!("HD44780 initialisation failed: {}", e))
}

/// Export the sensor pin
pub fn open_dht22(config: &SensorConfig) -> Result<PiDht22> {
    let line = GpioLine::open_drain(config.pin).context("exporting DHT22 data pin")?;
    Ok(PiDht22 {
        dht: Dht22::new(line, Delay),
        retries: config.retries,
        retry_delay_ms: config.retry_delay_ms,
    })
}
