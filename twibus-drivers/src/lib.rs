//! Peripheral drivers
//!
//! Drivers here depend only on the `embedded-hal` I2C trait, so they run
//! on [`twibus_core::Twi`] as well as on any other bus implementation.
//!
//! - Register-mapped devices (sensors, EEPROMs, port expanders)

#![no_std]
#![deny(unsafe_code)]

pub mod register;

pub use register::{DeviceError, RegisterDevice};
