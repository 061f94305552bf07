//! Polling async bus master
//!
//! [`AsyncTwi`] performs the same phases in the same order as
//! [`Twi`](crate::Twi), but suspends with [`yield_now`] between polls of
//! the completion flag instead of spinning. The future of an operation
//! resolves only once its last phase is finished on the bus.

use embassy_futures::yield_now;
use embedded_hal::i2c::{ErrorType, Operation, SevenBitAddress};
use twibus_hal::{
    Ack, Address, BusTiming, ConfigError, Control, Direction, I2cConfig, Status, TwiRegisters,
};

use crate::error::Error;
use crate::frame::{self, Step};
use crate::twi::configure;

/// Async TWI master
pub struct AsyncTwi<R> {
    regs: R,
}

impl<R: TwiRegisters> AsyncTwi<R> {
    /// Wrap a register handle
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Configure the bus clock and enable the peripheral
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

    async fn complete(&mut self) {
        while !self.regs.is_asserted(Control::INTERRUPT) {
            yield_now().await;
        }
    }

    /// Drive a (repeated) start condition
    pub async fn start(&mut self) {
        self.regs.write_control(frame::START);
        self.complete().await;
    }

    /// Drive a stop condition; does not wait
    pub fn stop(&mut self) {
        self.regs.write_control(frame::STOP);
    }

    /// Transmit one byte without inspecting the acknowledge
    pub async fn write_byte(&mut self, data: u8) {
        self.regs.write_data(data);
        self.regs.write_control(frame::TRANSFER);
        self.complete().await;
    }

    /// Receive one byte, answering it with `ack`
    pub async fn read_byte(&mut self, ack: Ack) -> u8 {
        self.regs.write_control(frame::receive(ack));
        self.complete().await;
        self.regs.read_data()
    }

    /// Outcome of the most recent phase
    pub fn status(&mut self) -> Status {
        Status::from_code(self.regs.status())
    }

    async fn address(&mut self, address: Address, direction: Direction) {
        self.write_byte(address.byte(direction)).await;
    }

    async fn receive_into(&mut self, buf: &mut [u8], step: Step) {
        let count = buf.len();
        for (index, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(step.ack(index, count)).await;
        }
    }

    /// Write `data` to a slave
    pub async fn write_burst(&mut self, address: Address, data: &[u8]) {
        self.transaction(address, &mut [Operation::Write(data)]).await;
    }

    /// Read `buf.len()` bytes from a slave, NACKing the last
    pub async fn read_burst(&mut self, address: Address, buf: &mut [u8]) {
        self.transaction(address, &mut [Operation::Read(buf)]).await;
    }

    /// Write `tx`, then read into `rx` after a repeated start
    pub async fn write_then_read(&mut self, address: Address, tx: &[u8], rx: &mut [u8]) {
        self.transaction(address, &mut [Operation::Write(tx), Operation::Read(rx)])
            .await;
    }

    /// Run a sequence of operations as one transaction
    pub async fn transaction(&mut self, address: Address, operations: &mut [Operation<'_>]) {
        if operations.is_empty() {
            return;
        }

        for index in 0..operations.len() {
            let step = frame::step(operations, index);
            if let Some(direction) = step.open {
                self.start().await;
                self.address(address, direction).await;
            }

            match &mut operations[index] {
                Operation::Write(data) => {
                    for &byte in data.iter() {
                        self.write_byte(byte).await;
                    }
                }
                Operation::Read(buf) => self.receive_into(buf, step).await,
            }
        }

        self.stop();
    }

    /// Check whether a slave acknowledges its address
    pub async fn probe(&mut self, address: Address) -> bool {
        self.start().await;
        self.address(address, Direction::Write).await;
        let acked = self.status().is_address_ack();
        self.stop();
        acked
    }
}

impl<R: TwiRegisters> ErrorType for AsyncTwi<R> {
    type Error = Error;
}

impl<R: TwiRegisters> embedded_hal_async::i2c::I2c<SevenBitAddress> for AsyncTwi<R> {
    async fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.read_burst(Address::new(address)?, read).await;
        Ok(())
    }

    async fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.write_burst(Address::new(address)?, write).await;
        Ok(())
    }

    async fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_then_read(Address::new(address)?, write, read).await;
        Ok(())
    }

    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        AsyncTwi::transaction(self, Address::new(address)?, operations).await;
        Ok(())
    }
}
