//! Sensor acquisition task
//!
//! A slow sensor (a DHT22 retry loop can block for many seconds) runs on
//! its own worker thread and publishes each good reading into a shared
//! slot. The display thread reads that slot through [`CachedSensor`] and
//! never blocks on the hardware.

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use linux_embedded_hal::Delay;
use log::{debug, warn};

use thermolcd_core::traits::{ClimateSensor, Reading, SensorError};
use thermolcd_core::RunState;

/// Granularity of the worker's sleep between readings
const POLL_QUANTUM_MS: u32 = 20;

/// Last known good reading, shared between the worker and the display
#[derive(Debug, Clone, Default)]
pub struct CachedSensor {
    latest: Arc<Mutex<Option<Reading>>>,
}

impl CachedSensor {
    /// Create an empty cache; reads report `Unavailable` until a publish
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached reading
    pub fn publish(&self, reading: Reading) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(reading);
        }
    }
}

impl ClimateSensor for CachedSensor {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.latest
            .lock()
            .ok()
            .and_then(|latest| *latest)
            .ok_or(SensorError::Unavailable)
    }
}

/// Spawn the worker reading `sensor` every `poll_ms` into `cache`
///
/// The worker exits once `run` is cleared; a read in progress finishes
/// first.
pub fn spawn<S>(
    mut sensor: S,
    cache: CachedSensor,
    poll_ms: u32,
    run: Arc<RunState>,
) -> Result<JoinHandle<()>>
where
    S: ClimateSensor + Send + 'static,
{
    thread::Builder::new()
        .name("sensor".into())
        .spawn(move || {
            debug!("Sensor worker started, polling every {}ms", poll_ms);
            let mut delay = Delay;
            while run.is_running() {
                match sensor.read() {
                    Ok(reading) => {
                        debug!(
                            "Sensor: {:.1}% {:.1}C",
                            reading.humidity_percent, reading.temperature_celsius
                        );
                        cache.publish(reading);
                    }
                    Err(e) => warn!("Sensor read failed: {}", e),
                }
                if !run.pause(&mut delay, poll_ms, POLL_QUANTUM_MS) {
                    break;
                }
            }
            debug!("Sensor worker stopped");
        })
        .context("spawning sensor worker")
}
