//! Display thread
//!
//! The multiplexer and the display it owns live on one dedicated thread.
//! [`MultiplexerHandle`] starts that thread, reports whether the start
//! succeeded, and stops it again.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use anyhow::{anyhow, Result};
use linux_embedded_hal::Delay;
use log::{error, info, warn};

use thermolcd_core::config::{PageConfig, ScheduleConfig};
use thermolcd_core::traits::clock::{Clock, Millis};
use thermolcd_core::traits::{CharDisplay, ClimateSensor, DisplayError, SystemThermometer};
use thermolcd_core::{Multiplexer, RunState, StartError};

/// Milliseconds since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        Millis::try_from(self.origin.elapsed().as_millis()).unwrap_or(Millis::MAX)
    }
}

/// Running display thread
pub struct MultiplexerHandle<D> {
    run: Arc<RunState>,
    thread: JoinHandle<D>,
}

impl<D> MultiplexerHandle<D>
where
    D: CharDisplay + Send + 'static,
{
    /// Start the multiplexer on its own thread
    ///
    /// Returns once the display has been prepared. If the start fails the
    /// thread still attempts `close(true)` on the display before exiting.
    pub fn spawn<S, T>(
        schedule: ScheduleConfig,
        pages: Vec<PageConfig>,
        display: D,
        sensor: S,
        thermometer: T,
        run: Arc<RunState>,
    ) -> Result<Self, StartError>
    where
        S: ClimateSensor + Send + 'static,
        T: SystemThermometer + Send + 'static,
    {
        let (started_tx, started_rx) = mpsc::channel();
        let thread_run = Arc::clone(&run);

        let spawned = thread::Builder::new().name("display".into()).spawn(move || {
            let mut display = display;
            let failed = match Multiplexer::start(&schedule, &pages, &mut display, sensor, thermometer) {
                Ok(mux) => {
                    let _ = started_tx.send(Ok(()));
                    mux.run(&thread_run, &MonotonicClock::new(), &mut Delay);
                    None
                }
                Err(e) => Some(e),
            };
            if let Some(e) = failed {
                if let Err(close) = display.close(true) {
                    warn!("Failed to close display: {}", close);
                }
                let _ = started_tx.send(Err(e));
            }
            display
        });
        let thread = spawned.map_err(|e| {
            error!("Failed to spawn display thread: {}", e);
            StartError::Device(DisplayError::Open)
        })?;

        match started_rx.recv() {
            Ok(Ok(())) => Ok(Self { run, thread }),
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            // Thread died before reporting
            Err(_) => {
                let _ = thread.join();
                Err(StartError::Device(DisplayError::Open))
            }
        }
    }

    /// Whether the display thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Request a stop and wait until the display has been closed
    ///
    /// No writes reach the display after this returns.
    pub fn stop(self) -> Result<D> {
        self.run.request_stop();
        let display = self
            .thread
            .join()
            .map_err(|_| anyhow!("display thread panicked"))?;
        info!("Display thread stopped");
        Ok(display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::Mutex;
    use std::time::Duration;

    use thermolcd_core::config::{ContentSource, RotationPolicy};
    use thermolcd_core::traits::Reading;

    use crate::console::ConsoleLcd;
    use crate::tasks::sensor::CachedSensor;
    use crate::thermal::SysfsThermal;

    /// Writer whose bytes stay readable after the display moves threads
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn make_schedule() -> ScheduleConfig {
        ScheduleConfig {
            tick_ms: 5,
            scroll_ms: 10,
            refresh_ms: 20,
            rotation: RotationPolicy::AfterScrolls(1),
        }
    }

    fn make_sensor() -> CachedSensor {
        let sensor = CachedSensor::new();
        sensor.publish(Reading::new(21.4, 45.3));
        sensor
    }

    fn no_thermal() -> SysfsThermal {
        SysfsThermal::new(std::path::Path::new("/nonexistent/thermal_zone0"))
    }

    #[test]
    fn test_clock_is_monotonic() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        thread::sleep(Duration::from_millis(5));
        assert!(clock.now_ms() >= a + 5);
    }

    #[test]
    fn test_runs_and_stops_cleanly() {
        let buf = SharedBuf::default();
        let lcd = ConsoleLcd::new(buf.clone(), 16, 2).unwrap();
        let run = Arc::new(RunState::new());
        let pages = vec![PageConfig::new("Pi Temperature", ContentSource::Sensor)];

        let handle =
            MultiplexerHandle::spawn(make_schedule(), pages, lcd, make_sensor(), no_thermal(), run.clone())
                .unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(!handle.is_finished());

        let lcd = handle.stop().unwrap();
        assert!(!run.is_running());

        let out = buf.text();
        assert!(out.contains("45.3%  21.4°C"));

        // Last output is the clearing close; nothing follows it
        let blank = " ".repeat(16);
        let close = format!("\x1b[F\x1b[F\x1b[2G{blank}\n\n\x1b[F\x1b[2G{blank}\n\n");
        assert!(out.ends_with(&close));

        let len = buf.text().len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(buf.text().len(), len);
        drop(lcd);
    }

    #[test]
    fn test_start_failure_closes_display() {
        let buf = SharedBuf::default();
        let lcd = ConsoleLcd::new(buf.clone(), 16, 2).unwrap();
        let run = Arc::new(RunState::new());

        let result = MultiplexerHandle::spawn(make_schedule(), Vec::new(), lcd, make_sensor(), no_thermal(), run);
        assert!(matches!(result, Err(StartError::EmptyPages)));
        assert!(buf.text().ends_with('\n'));
    }

    #[test]
    fn test_external_stop_ends_thread() {
        let lcd = ConsoleLcd::new(SharedBuf::default(), 16, 2).unwrap();
        let run = Arc::new(RunState::new());
        let pages = vec![PageConfig::new("CPU", ContentSource::System)];

        let handle =
            MultiplexerHandle::spawn(make_schedule(), pages, lcd, make_sensor(), no_thermal(), run.clone())
                .unwrap();
        run.request_stop();

        let deadline = Instant::now() + Duration::from_secs(2);
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(handle.is_finished());
        assert!(handle.stop().is_ok());
    }
}
