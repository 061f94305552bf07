//! Transactions
//!
//! Multi-byte exchanges built from the bus primitives. Every transaction
//! opens with exactly one start, closes with exactly one stop, and holds
//! the bus in between: a change of direction inside a transaction uses a
//! repeated start, never a stop.
//!
//! Within a read phase every byte is ACKed except the last, which is
//! NACKed so the slave releases SDA before the stop (or repeated start).

use embedded_hal::i2c::Operation;
use heapless::Vec;
use twibus_hal::{Address, Direction, TwiRegisters};

use crate::frame::{self, Step};
use crate::twi::Twi;

const SCAN_FIRST: u8 = 0x08;
const SCAN_LAST: u8 = 0x77;

/// Addresses visited by [`Twi::scan`] (the non-reserved range)
pub const SCAN_RANGE: core::ops::RangeInclusive<u8> = SCAN_FIRST..=SCAN_LAST;

/// Number of addresses in [`SCAN_RANGE`]
pub const SCAN_CAPACITY: usize = (SCAN_LAST - SCAN_FIRST) as usize + 1;

/// Devices found by a bus scan
pub type ScanResult = Vec<Address, SCAN_CAPACITY>;

impl<R: TwiRegisters> Twi<R> {
    /// Send the address byte for `direction`
    fn address(&mut self, address: Address, direction: Direction) {
        self.write_byte(address.byte(direction));
    }

    /// Fill `buf` from the bus, acknowledging as `step` plans
    fn receive_into(&mut self, buf: &mut [u8], step: Step) {
        let count = buf.len();
        for (index, slot) in buf.iter_mut().enumerate() {
            *slot = self.read_byte(step.ack(index, count));
        }
    }

    /// Write `data` to a slave
    ///
    /// With empty `data` only the address is sent, which checks that the slave is present.
    pub fn write_burst(&mut self, address: Address, data: &[u8]) {
        #[cfg(feature = "defmt")]
        defmt::trace!("write {} [{} bytes]", address, data.len());

        self.transaction(address, &mut [Operation::Write(data)]);
    }

    /// Read `buf.len()` bytes from a slave
    ///
    /// The last byte is NACKed; a one-byte read NACKs its only byte.
    pub fn read_burst(&mut self, address: Address, buf: &mut [u8]) {
        #[cfg(feature = "defmt")]
        defmt::trace!("read {} [{} bytes]", address, buf.len());

        self.transaction(address, &mut [Operation::Read(buf)]);
    }

    /// Write `tx`, then read into `rx` after a repeated start
    ///
    /// The bus is not released between the two phases, so no other master
    /// can address the slave between selecting a register and reading it.
    pub fn write_then_read(&mut self, address: Address, tx: &[u8], rx: &mut [u8]) {
        #[cfg(feature = "defmt")]
        defmt::trace!(
            "write_read {} [{} bytes out, {} bytes in]",
            address,
            tx.len(),
            rx.len()
        );

        self.transaction(address, &mut [Operation::Write(tx), Operation::Read(rx)]);
    }

    /// Run a sequence of operations as one transaction
    ///
    /// Adjacent operations of the same direction share an address phase;
    /// each change of direction issues a repeated start. A single stop
    /// follows the last operation. An empty sequence does not touch the
    /// bus.
    pub fn transaction(&mut self, address: Address, operations: &mut [Operation<'_>]) {
        if operations.is_empty() {
            return;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("transaction {} [{} operations]", address, operations.len());

        for index in 0..operations.len() {
            let step = frame::step(operations, index);
            if let Some(direction) = step.open {
                self.start();
                self.address(address, direction);
            }

            match &mut operations[index] {
                Operation::Write(data) => {
                    for &byte in data.iter() {
                        self.write_byte(byte);
                    }
                }
                Operation::Read(buf) => self.receive_into(buf, step),
            }
        }

        self.stop();
    }

    /// Check whether a slave acknowledges its address
    ///
    /// Sends the address for writing and reads the peripheral status
    /// before releasing the bus.
    pub fn probe(&mut self, address: Address) -> bool {
        self.start();
        self.address(address, Direction::Write);
        let acked = self.status().is_address_ack();
        self.stop();
        acked
    }

    /// Check every non-reserved address for a slave
    pub fn scan(&mut self) -> ScanResult {
        let mut found = ScanResult::new();
        for raw in SCAN_RANGE {
            let address = Address::const_new(raw);
            if self.probe(address) {
                #[cfg(feature = "defmt")]
                defmt::debug!("found device at {}", address);
                let pushed = found.push(address);
                debug_assert!(pushed.is_ok(), "scan result sized to SCAN_RANGE");
            }
        }
        found
    }
}
