//! ATmega328P-specific HAL for the twibus driver
//!
//! This crate implements the `twibus-hal` register interface for the
//! TWI block of the ATmega328P (and the pin-compatible ATmega168/88/48
//! family, which share its register map).
//!
//! The application must link a `critical-section` implementation (for
//! example through `avr-device`'s `critical-section-impl` feature), which
//! backs the atomic guarding [`Atmega328pTwi::take`].
//!
//! # Usage
//!
//! ```ignore
//! use twibus_core::Twi;
//! use twibus_hal::I2cConfig;
//! use twibus_hal_atmega328p::Atmega328pTwi;
//!
//! let regs = Atmega328pTwi::take().unwrap();
//! let mut twi = Twi::new(regs);
//! twi.init(&I2cConfig::STANDARD)?;
//! ```

#![no_std]

pub mod twi;

pub use twi::Atmega328pTwi;
