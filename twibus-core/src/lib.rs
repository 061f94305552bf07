//! Board-agnostic TWI/I2C master protocol
//!
//! This crate turns a [`TwiRegisters`](twibus_hal::TwiRegisters)
//! implementation into a bus master:
//!
//! - Bus primitives: start, stop, byte write, byte read with ACK control
//! - Transactions: burst write, burst read, and write-then-read with a
//!   repeated start
//! - Generic transactions over `embedded-hal` operations, bus probing
//! - Blocking ([`Twi`]) and polling-async ([`AsyncTwi`]) front ends
//!
//! Every operation runs to completion before returning. The driver
//! assumes it is the only master on an electrically healthy bus: it never
//! inspects status after a transfer, never times out, and never retries.

#![no_std]
#![deny(unsafe_code)]

pub mod asynch;
pub mod error;
mod frame;
mod bus;
pub mod transaction;
pub mod twi;

pub use asynch::AsyncTwi;
pub use error::Error;
pub use transaction::{ScanResult, SCAN_CAPACITY, SCAN_RANGE};
pub use twi::Twi;

// Re-export the HAL types that appear in this crate's API
pub use twibus_hal::{Ack, Address, BusTiming, ConfigError, Direction, I2cConfig, Status};
