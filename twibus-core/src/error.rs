//! Error types
//!
//! Bus outcomes (address NACK, arbitration loss) are never reported: the
//! only failures are arguments rejected before the bus is touched.

use twibus_hal::InvalidAddress;

/// Errors from driver entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Raw address does not fit in 7 bits
    InvalidAddress(u8),
}

impl From<InvalidAddress> for Error {
    fn from(e: InvalidAddress) -> Self {
        Error::InvalidAddress(e.0)
    }
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        embedded_hal::i2c::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{Error as _, ErrorKind};
    use twibus_hal::Address;

    #[test]
    fn test_from_invalid_address() {
        let err: Error = Address::new(0x80).unwrap_err().into();
        assert_eq!(err, Error::InvalidAddress(0x80));
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
