//! Hardware abstraction traits
//!
//! These traits define the interface between the scheduling core
//! and hardware-specific implementations.

pub mod clock;
pub mod display;
pub mod sensor;

pub use clock::Clock;
pub use display::{CharDisplay, CursorMode, DisplayError};
pub use sensor::{ClimateSensor, Reading, SensorError, SystemThermometer};
