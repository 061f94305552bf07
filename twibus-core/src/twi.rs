//! Blocking bus master and bus primitives
//!
//! [`Twi`] owns the register handle of one peripheral. Each primitive
//! writes a control word and, except for stop, spins until the
//! peripheral raises its completion flag.
//!
//! # Bus states
//!
//! ```text
//! Idle ──start──▶ Address ──write_byte──▶ Data ──write_byte/read_byte──▶ Data
//!                    ▲                      │
//!                    └─────start (repeated)─┤
//!                                           └──stop──▶ Idle
//! ```
//!
//! The driver keeps no record of these states: they live in the
//! peripheral and in the control flow of the caller.

use twibus_hal::{Ack, BusTiming, ConfigError, Control, I2cConfig, Status, TwiRegisters};

use crate::frame;

/// Program clock and enable bit of a peripheral
pub(crate) fn configure<R: TwiRegisters>(
    regs: &mut R,
    config: &I2cConfig,
) -> Result<BusTiming, ConfigError> {
    let timing = config.timing()?;

    regs.set_prescaler(timing.prescaler);
    regs.set_rate_divisor(timing.divisor);
    regs.set_control_bit(Control::ENABLE);

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "TWI enabled: {} Hz (prescaler {}, divisor {})",
        timing.frequency(config.cpu_frequency),
        timing.prescaler,
        timing.divisor
    );

    Ok(timing)
}

/// Blocking TWI master
pub struct Twi<R> {
    regs: R,
}

impl<R: TwiRegisters> Twi<R> {
    /// Wrap a register handle
    ///
    /// The peripheral is left untouched; call [`init`](Self::init) before
    /// the first transaction.
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Configure the bus clock and enable the peripheral
    ///
    /// Prescaler, divisor and enable bit are assigned rather than
    /// accumulated, so repeated calls leave the same state as one call.
    pub fn init(&mut self, config: &I2cConfig) -> Result<BusTiming, ConfigError> {
        configure(&mut self.regs, config)
    }

    /// Give the register handle back
    pub fn release(self) -> R {
        self.regs
    }

    /// Access the register handle
    pub fn regs_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Drive a start condition and wait until it is on the bus
    ///
    /// Issued while the bus is already held, this is a repeated start.
    pub fn start(&mut self) {
        self.regs.write_control(frame::START);
        self.regs.wait_until_asserted(Control::INTERRUPT);
    }

    /// Drive a stop condition
    ///
    /// Returns immediately: nothing else happens on the bus until the next
    /// start, which the peripheral will not begin before the stop is out.
    pub fn stop(&mut self) {
        self.regs.write_control(frame::STOP);
    }

    /// Transmit one byte and wait for it to leave
    ///
    /// The slave's acknowledge is not inspected.
    pub fn write_byte(&mut self, data: u8) {
        self.regs.write_data(data);
        self.regs.write_control(frame::TRANSFER);
        self.regs.wait_until_asserted(Control::INTERRUPT);
    }

    /// Receive one byte, answering it with `ack`
    pub fn read_byte(&mut self, ack: Ack) -> u8 {
        self.regs.write_control(frame::receive(ack));
        self.regs.wait_until_asserted(Control::INTERRUPT);
        self.regs.read_data()
    }

    /// Outcome of the most recent phase
    pub fn status(&mut self) -> Status {
        Status::from_code(self.regs.status())
    }
}
