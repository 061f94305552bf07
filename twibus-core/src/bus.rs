//! Bus trait implementations for [`Twi`]
//!
//! Raw `u8` addresses are validated here, before any bus activity.

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use twibus_hal::{Address, I2cBus, TwiRegisters};

use crate::error::Error;
use crate::twi::Twi;

impl<R: TwiRegisters> ErrorType for Twi<R> {
    type Error = Error;
}

impl<R: TwiRegisters> I2c<SevenBitAddress> for Twi<R> {
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.read_burst(Address::new(address)?, read);
        Ok(())
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.write_burst(Address::new(address)?, write);
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_then_read(Address::new(address)?, write, read);
        Ok(())
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        Twi::transaction(self, Address::new(address)?, operations);
        Ok(())
    }
}

impl<R: TwiRegisters> I2cBus for Twi<R> {
    type Error = Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.write_burst(Address::new(address)?, data);
        Ok(())
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.read_burst(Address::new(address)?, buf);
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_then_read(Address::new(address)?, write_data, read_buf);
        Ok(())
    }
}
