//! SoC temperature from a Linux thermal zone

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, trace};

use thermolcd_core::traits::SystemThermometer;
use thermolcd_drivers::sensor::parse_millidegrees;

/// Thermal zone reader
///
/// Whether the zone exists is decided once, in [`SysfsThermal::new`].
#[derive(Debug, Clone)]
pub struct SysfsThermal {
    temp_path: PathBuf,
    enabled: bool,
}

impl SysfsThermal {
    /// Probe `zone` (e.g. `/sys/class/thermal/thermal_zone0`)
    pub fn new(zone: &Path) -> Self {
        let enabled = zone.is_dir();
        if enabled {
            info!("Thermal zone {} found", zone.display());
        } else {
            info!("Thermal zone {} not present", zone.display());
        }
        Self {
            temp_path: zone.join("temp"),
            enabled,
        }
    }
}

impl SystemThermometer for SysfsThermal {
    fn read_system_temperature(&mut self) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        match fs::read_to_string(&self.temp_path) {
            Ok(text) => parse_millidegrees(&text),
            Err(e) => {
                trace!("{}: {}", self.temp_path.display(), e);
                None
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
