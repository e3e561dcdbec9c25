//! thermolcd - climate readout for character LCDs
//!
//! Shows a scrolling page title on the top row of a character LCD and a
//! live reading on the bottom row: air temperature and humidity from a
//! DHT22, or the SoC temperature from the Linux thermal zone. Pages
//! rotate after their title has scrolled past.
//!
//! Threads:
//! - main: setup, intro, then waits for a stop request
//! - display: owns the panel and runs the multiplexer tick loop
//! - sensor: blocking sensor reads into a shared cache
//! - signals: turns SIGINT/SIGTERM/SIGTSTP into a stop request

mod config;
mod console;
mod hardware;
mod signals;
mod simulation;
mod tasks;
mod thermal;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use linux_embedded_hal::Delay;
use log::{info, warn};

use thermolcd_core::config::FAST_SCROLL_MS;
use thermolcd_core::intro::{self, IntroOutcome};
use thermolcd_core::traits::CharDisplay;
use thermolcd_core::RunState;

use crate::config::{AppConfig, DisplayKind, SensorKind};
use crate::console::ConsoleLcd;
use crate::simulation::SimulatedSensor;
use crate::tasks::{CachedSensor, MultiplexerHandle};
use crate::thermal::SysfsThermal;

/// Climate readout for HD44780 character LCDs
#[derive(Parser, Debug)]
#[command(name = "thermolcd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: the configuration built into the binary)
    #[arg(short = 'c', long, env = "THERMOLCD_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Draw the LCD on this terminal and simulate the sensor
    #[arg(short = 's', long)]
    simulate: bool,

    /// Scroll titles every 0.1s, for fast sinks such as a terminal
    #[arg(short = 'f', long)]
    fast: bool,

    /// Skip the intro animation
    #[arg(long)]
    no_intro: bool,
}

impl Args {
    /// Apply command line overrides on top of the file
    fn apply(&self, config: &mut AppConfig) {
        if self.simulate {
            config.display.kind = DisplayKind::Console;
            config.sensor.kind = SensorKind::Simulated;
        }
        if self.fast {
            config.schedule.scroll_ms = FAST_SCROLL_MS;
        }
        if self.no_intro {
            config.intro.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never land inside the console LCD on stdout
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    info!("thermolcd starting...");

    let mut config = config::load(args.config.as_deref()).context("loading configuration")?;
    args.apply(&mut config);

    let run = Arc::new(RunState::new());
    let flag = Arc::clone(&run);
    signals::on_cancel_requested(move || flag.request_stop())?;

    let thermometer = SysfsThermal::new(&config.thermal.zone);
    let sensor = start_sensor(&config, Arc::clone(&run))?;

    let (columns, rows) = (config.display.columns, config.display.rows);
    match config.display.kind {
        DisplayKind::Console => {
            let lcd = ConsoleLcd::new(io::stdout(), columns, rows)
                .map_err(|e| anyhow!("opening console display: {}", e))?;
            drive(lcd, &config, sensor, thermometer, run)
        }
        DisplayKind::Hd44780 => {
            info!("Initialising LCD display...");
            let lcd = hardware::open_lcd(&config.display)?;
            drive(lcd, &config, sensor, thermometer, run)
        }
    }
}

/// Start the acquisition worker and return the cache it fills
///
/// The worker is not joined on exit; it may be inside a multi-second
/// read when the process ends.
fn start_sensor(config: &AppConfig, run: Arc<RunState>) -> Result<CachedSensor> {
    let cache = CachedSensor::new();
    let poll_ms = config.sensor.poll_ms;
    match config.sensor.kind {
        SensorKind::Simulated => {
            info!("Using simulated sensor");
            tasks::sensor::spawn(SimulatedSensor::new(), cache.clone(), poll_ms, run)?;
        }
        SensorKind::Dht22 => {
            info!("Using DHT22 on GPIO {}", config.sensor.pin);
            let dht = hardware::open_dht22(&config.sensor)?;
            tasks::sensor::spawn(dht, cache.clone(), poll_ms, run)?;
        }
    }
    Ok(cache)
}

/// Play the intro, run the multiplexer until stopped, close the display
fn drive<D>(
    mut display: D,
    config: &AppConfig,
    sensor: CachedSensor,
    thermometer: SysfsThermal,
    run: Arc<RunState>,
) -> Result<()>
where
    D: CharDisplay + Send + 'static,
{
    let tick_ms = config.schedule.tick_ms;

    if config.intro.enabled {
        match intro::play(&mut display, &mut Delay, &run, &config.intro, tick_ms) {
            Ok(IntroOutcome::Completed) => {}
            Ok(IntroOutcome::Interrupted) => info!("Intro interrupted"),
            Err(e) => warn!("Intro failed: {}", e),
        }
    }

    if !run.is_running() {
        if let Err(e) = display.close(true) {
            warn!("Failed to close display: {}", e);
        }
        info!("Quitting program");
        return Ok(());
    }

    let handle = MultiplexerHandle::spawn(
        config.schedule,
        config.pages.clone(),
        display,
        sensor,
        thermometer,
        Arc::clone(&run),
    )
    .map_err(|e| anyhow!("starting display: {}", e))?;
    info!("LCD display initialised successfully!");

    let wait = Duration::from_millis(u64::from(tick_ms));
    while run.is_running() && !handle.is_finished() {
        thread::sleep(wait);
    }

    handle.stop()?;
    info!("Quitting program");
    Ok(())
}
