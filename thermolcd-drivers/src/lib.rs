//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in thermolcd-core:
//!
//! - Character LCDs (HD44780 over a 4- or 8-bit parallel bus)
//! - Climate sensors (DHT22 single-wire)
//! - SoC thermal zone value parsing

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod lcd;
pub mod sensor;
