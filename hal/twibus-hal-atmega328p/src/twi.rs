//! TWI register access for the ATmega328P
//!
//! The TWI block lives in extended I/O space and is reached through
//! plain volatile loads and stores.

use portable_atomic::{AtomicBool, Ordering};
use twibus_hal::{Control, Prescaler, TwiRegisters};

/// TWI register addresses (data memory space)
pub mod reg {
    /// Bit rate register
    pub const TWBR: *mut u8 = 0xB8 as *mut u8;
    /// Status register (bits 7:3 status, bits 1:0 prescaler)
    pub const TWSR: *mut u8 = 0xB9 as *mut u8;
    /// Data register
    pub const TWDR: *mut u8 = 0xBB as *mut u8;
    /// Control register
    pub const TWCR: *mut u8 = 0xBC as *mut u8;
}

/// Mask selecting the status code in TWSR
const STATUS_MASK: u8 = 0xF8;

/// Mask selecting the prescaler bits in TWSR
const PRESCALER_MASK: u8 = 0x03;

/// Set once [`Atmega328pTwi::take`] has handed out the handle
static TAKEN: AtomicBool = AtomicBool::new(false);

/// Handle to the ATmega328P TWI registers
///
/// `twibus-hal`'s canonical [`Control`] layout is the TWCR layout, so
/// control values are written through unchanged.
pub struct Atmega328pTwi {
    _private: (),
}

impl Atmega328pTwi {
    /// Take the handle to the TWI registers
    ///
    /// Returns `None` on every call after the first. Handles created with
    /// [`steal`](Self::steal) are not tracked.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self { _private: () })
        }
    }

    /// Create a handle to the TWI registers
    ///
    /// # Safety
    ///
    /// Only one handle may exist at a time, and nothing else (including
    /// interrupt handlers) may touch the TWI registers while it does.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }

    #[inline(always)]
    fn read(register: *mut u8) -> u8 {
        // SAFETY: `register` is one of the fixed TWI MMIO addresses in `reg`
        unsafe { register.read_volatile() }
    }

    #[inline(always)]
    fn write(register: *mut u8, value: u8) {
        // SAFETY: `register` is one of the fixed TWI MMIO addresses in `reg`
        unsafe { register.write_volatile(value) }
    }
}

impl TwiRegisters for Atmega328pTwi {
    #[inline]
    fn write_control(&mut self, control: Control) {
        Self::write(reg::TWCR, control.bits());
    }

    #[inline]
    fn set_control_bit(&mut self, bit: Control) {
        // TWINT is write-one-to-clear; never carry a pending flag into the write
        let current = Control::from_bits(Self::read(reg::TWCR)).difference(Control::INTERRUPT);
        Self::write(reg::TWCR, current.union(bit).bits());
    }

    #[inline]
    fn clear_control_bit(&mut self, bit: Control) {
        let current = Control::from_bits(Self::read(reg::TWCR)).difference(Control::INTERRUPT);
        Self::write(reg::TWCR, current.difference(bit).bits());
    }

    #[inline]
    fn is_asserted(&mut self, flag: Control) -> bool {
        Control::from_bits(Self::read(reg::TWCR)).contains(flag)
    }

    #[inline]
    fn read_data(&mut self) -> u8 {
        Self::read(reg::TWDR)
    }

    #[inline]
    fn write_data(&mut self, byte: u8) {
        Self::write(reg::TWDR, byte);
    }

    #[inline]
    fn status(&mut self) -> u8 {
        Self::read(reg::TWSR) & STATUS_MASK
    }

    #[inline]
    fn set_prescaler(&mut self, prescaler: Prescaler) {
        let twsr = Self::read(reg::TWSR) & !PRESCALER_MASK;
        Self::write(reg::TWSR, twsr | prescaler.bits());
    }

    #[inline]
    fn set_rate_divisor(&mut self, divisor: u8) {
        Self::write(reg::TWBR, divisor);
    }
}
