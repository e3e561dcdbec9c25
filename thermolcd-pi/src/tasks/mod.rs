//! Threads of the running application
//!
//! - `multiplexer`: the display thread, sole owner of the panel
//! - `sensor`: the acquisition worker feeding the display a cached reading

pub mod multiplexer;
pub mod sensor;

pub use multiplexer::MultiplexerHandle;
pub use sensor::CachedSensor;
