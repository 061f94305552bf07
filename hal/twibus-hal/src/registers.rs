//! Peripheral register interface
//!
//! A TWI peripheral is driven through three registers: a control
//! register whose writes launch bus phases, a status register reporting
//! the outcome of the last phase, and a data register holding the byte
//! being shifted in or out. Chip HALs implement [`TwiRegisters`] once per
//! microcontroller family; the protocol layer depends only on this trait.

use core::ops::{BitOr, BitOrAssign};

use crate::config::Prescaler;

/// Control register bits
///
/// The bit layout is the canonical one used across the driver (it matches
/// the AVR `TWCR` register). Chips with a different layout translate these
/// flags in their [`TwiRegisters`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control(u8);

impl Control {
    /// Completion flag. Reads 1 when the current phase has finished;
    /// writing 1 clears it and launches the next phase.
    pub const INTERRUPT: Self = Self(1 << 7);
    /// Acknowledge the next received byte
    pub const ENABLE_ACK: Self = Self(1 << 6);
    /// Generate a (repeated) start condition
    pub const START: Self = Self(1 << 5);
    /// Generate a stop condition
    pub const STOP: Self = Self(1 << 4);
    /// Peripheral enable
    pub const ENABLE: Self = Self(1 << 2);

    /// No bits set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from a raw register value
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw register value
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check whether every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Const-friendly union
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Clear the bits of `other`
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for Control {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for Control {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Acknowledge decision for a received byte
///
/// The master sends this bit after each byte it receives; `Nack` tells
/// the slave to stop driving data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ack {
    /// More bytes are expected
    Ack,
    /// Last byte of the read phase
    Nack,
}

impl Ack {
    /// Decision for byte `index` of a read phase of `count` bytes
    ///
    /// Only the final byte is NACKed, so a single-byte read NACKs at once.
    #[inline]
    pub const fn for_index(index: usize, count: usize) -> Self {
        if index + 1 == count {
            Ack::Nack
        } else {
            Ack::Ack
        }
    }

    /// Whether the acknowledge bit is driven low
    #[inline]
    pub const fn is_ack(self) -> bool {
        matches!(self, Ack::Ack)
    }
}

impl From<bool> for Ack {
    fn from(ack: bool) -> Self {
        if ack {
            Ack::Ack
        } else {
            Ack::Nack
        }
    }
}

/// Register-level access to a TWI peripheral
///
/// Implementations are stateless translations onto hardware registers.
/// None of the methods may fail; a peripheral that never completes a
/// phase makes [`wait_until_asserted`](Self::wait_until_asserted) block
/// forever.
pub trait TwiRegisters {
    /// Write the whole control register
    ///
    /// Writing with [`Control::INTERRUPT`] set clears the completion flag
    /// and starts the phase described by the other bits.
    fn write_control(&mut self, control: Control);

    /// Set individual control bits, leaving the others untouched
    fn set_control_bit(&mut self, bit: Control);

    /// Clear individual control bits, leaving the others untouched
    fn clear_control_bit(&mut self, bit: Control);

    /// Non-blocking check of a control flag
    fn is_asserted(&mut self, flag: Control) -> bool;

    /// Block until `flag` reads as set
    ///
    /// There is no timeout.
    fn wait_until_asserted(&mut self, flag: Control) {
        while !self.is_asserted(flag) {
            core::hint::spin_loop();
        }
    }

    /// Read the data register
    fn read_data(&mut self) -> u8;

    /// Write the data register
    fn write_data(&mut self, byte: u8);

    /// Status register with the prescaler bits masked off
    fn status(&mut self) -> u8;

    /// Select the clock prescaler
    fn set_prescaler(&mut self, prescaler: Prescaler);

    /// Set the bit-rate divisor
    fn set_rate_divisor(&mut self, divisor: u8);
}

impl<T: TwiRegisters + ?Sized> TwiRegisters for &mut T {
    fn write_control(&mut self, control: Control) {
        T::write_control(self, control)
    }

    fn set_control_bit(&mut self, bit: Control) {
        T::set_control_bit(self, bit)
    }

    fn clear_control_bit(&mut self, bit: Control) {
        T::clear_control_bit(self, bit)
    }

    fn is_asserted(&mut self, flag: Control) -> bool {
        T::is_asserted(self, flag)
    }

    fn wait_until_asserted(&mut self, flag: Control) {
        T::wait_until_asserted(self, flag)
    }

    fn read_data(&mut self) -> u8 {
        T::read_data(self)
    }

    fn write_data(&mut self, byte: u8) {
        T::write_data(self, byte)
    }

    fn status(&mut self) -> u8 {
        T::status(self)
    }

    fn set_prescaler(&mut self, prescaler: Prescaler) {
        T::set_prescaler(self, prescaler)
    }

    fn set_rate_divisor(&mut self, divisor: u8) {
        T::set_rate_divisor(self, divisor)
    }
}
