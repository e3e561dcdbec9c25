//! Simulated climate sensor
//!
//! Stands in for a DHT22 when running without hardware. Each read blocks
//! for a random time like a real retry loop, then returns plausible
//! indoor values at the sensor's 0.1 resolution.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use thermolcd_core::traits::{ClimateSensor, Reading, SensorError};

/// Longest simulated acquisition time
pub const MAX_READ_DELAY: Duration = Duration::from_secs(2);

/// Random readings: humidity 30.0-60.0 %, temperature 15.0-35.0 C
pub struct SimulatedSensor<R = StdRng> {
    rng: R,
    max_delay: Duration,
}

impl SimulatedSensor {
    /// Create a sensor seeded from the OS
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), MAX_READ_DELAY)
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedSensor<R> {
    /// Create a sensor with a given generator and delay bound
    pub fn with_rng(rng: R, max_delay: Duration) -> Self {
        Self { rng, max_delay }
    }
}

impl<R: Rng> ClimateSensor for SimulatedSensor<R> {
    fn read(&mut self) -> Result<Reading, SensorError> {
        if !self.max_delay.is_zero() {
            thread::sleep(self.max_delay.mul_f64(self.rng.gen::<f64>()));
        }
        let humidity = f32::from(self.rng.gen_range(300u16..=600)) / 10.0;
        let temperature = f32::from(self.rng.gen_range(150u16..=350)) / 10.0;
        Ok(Reading::new(temperature, humidity))
    }
}
