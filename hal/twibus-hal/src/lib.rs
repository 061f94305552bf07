//! Twibus Hardware Abstraction Layer
//!
//! This crate defines the register-level interface that chip-specific
//! HALs implement for their two-wire (TWI/I2C) peripheral, together with
//! the small value types shared by every layer of the driver. It holds
//! no protocol logic: sequencing start/stop conditions and framing bytes
//! lives in `twibus-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / device drivers           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  twibus-core (bus protocol)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  twibus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ twibus-hal-   │       │   sim (host   │
//! │  atmega328p   │       │    testing)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`registers::TwiRegisters`] - Control/status/data register access
//! - [`i2c::I2cBus`] - Application-facing bus master operations

#![no_std]
#![deny(unsafe_code)]

pub mod address;
pub mod config;
pub mod i2c;
pub mod registers;
pub mod status;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export key types at crate root for convenience
pub use address::{Address, Direction, InvalidAddress};
pub use config::{BusTiming, ConfigError, I2cConfig, Prescaler};
pub use i2c::I2cBus;
pub use registers::{Ack, Control, TwiRegisters};
pub use status::Status;
