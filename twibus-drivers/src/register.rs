//! Register-mapped I2C device
//!
//! Most addressable peripherals expose a register file: the first byte
//! written after the address selects a register, following bytes are
//! written into consecutive registers, and a read after a repeated start
//! returns bytes from the selected register onward.
//!
//! # Usage
//!
//! ```ignore
//! let mut imu = RegisterDevice::new(twi, Address::const_new(0x68));
//! let who_am_i = imu.read_register(0x75)?;
//! imu.modify_register(0x6B, |v| v & !0x40)?; // clear sleep bit
//! ```

use embedded_hal::i2c::I2c;
use heapless::Vec;
use twibus_core::Address;

/// Maximum payload of a single [`RegisterDevice::write_registers`] call
pub const MAX_WRITE_LEN: usize = 32;

/// Errors from register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<E> {
    /// Underlying bus error
    Bus(E),
    /// Payload exceeds [`MAX_WRITE_LEN`]
    PayloadTooLong,
}

/// Register-mapped device at a fixed address
pub struct RegisterDevice<I2C> {
    bus: I2C,
    address: Address,
}

impl<I2C: I2c> RegisterDevice<I2C> {
    /// Bind a bus to a device address
    pub fn new(bus: I2C, address: Address) -> Self {
        Self { bus, address }
    }

    /// Device address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Give the bus back
    pub fn release(self) -> I2C {
        self.bus
    }

    /// Read one register
    pub fn read_register(&mut self, register: u8) -> Result<u8, DeviceError<I2C::Error>> {
        let mut value = [0u8; 1];
        self.read_registers(register, &mut value)?;
        Ok(value[0])
    }

    /// Read consecutive registers starting at `register`
    pub fn read_registers(
        &mut self,
        register: u8,
        buf: &mut [u8],
    ) -> Result<(), DeviceError<I2C::Error>> {
        self.bus
            .write_read(self.address.value(), &[register], buf)
            .map_err(DeviceError::Bus)
    }

    /// Write one register
    pub fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), DeviceError<I2C::Error>> {
        self.bus
            .write(self.address.value(), &[register, value])
            .map_err(DeviceError::Bus)
    }

    /// Write consecutive registers starting at `register` in one burst
    pub fn write_registers(
        &mut self,
        register: u8,
        data: &[u8],
    ) -> Result<(), DeviceError<I2C::Error>> {
        if data.len() > MAX_WRITE_LEN {
            return Err(DeviceError::PayloadTooLong);
        }

        let mut frame: Vec<u8, { MAX_WRITE_LEN + 1 }> = Vec::new();
        frame
            .push(register)
            .map_err(|_| DeviceError::PayloadTooLong)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| DeviceError::PayloadTooLong)?;

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "{}: write {=u8:#04x} [{} bytes]",
            self.address,
            register,
            data.len()
        );

        self.bus
            .write(self.address.value(), &frame)
            .map_err(DeviceError::Bus)
    }

    /// Read a register, transform it, and write the result back
    ///
    /// Returns the value written. The two accesses are separate
    /// transactions.
    pub fn modify_register<F>(
        &mut self,
        register: u8,
        f: F,
    ) -> Result<u8, DeviceError<I2C::Error>>
    where
        F: FnOnce(u8) -> u8,
    {
        let value = f(self.read_register(register)?);
        self.write_register(register, value)?;
        Ok(value)
    }
}
