//! Sensor drivers

pub mod dht22;
pub mod thermal;

pub use dht22::{DataLine, Dht22};
pub use thermal::parse_millidegrees;
