//! Slave addressing
//!
//! The first byte after a start condition carries the 7-bit slave
//! address in its upper bits and the transfer direction in bit 0.

/// Transfer direction encoded in bit 0 of the address byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    /// Master transmits to the slave (R/W = 0)
    Write = 0,
    /// Master receives from the slave (R/W = 1)
    Read = 1,
}

/// Error returned when a value does not fit in 7 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAddress(pub u8);

/// 7-bit slave address (0x00-0x7F)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u8);

impl Address {
    /// Largest valid 7-bit address
    pub const MAX: u8 = 0x7F;

    /// Create an address, rejecting values above 0x7F
    #[inline]
    pub const fn new(raw: u8) -> Result<Self, InvalidAddress> {
        if raw > Self::MAX {
            Err(InvalidAddress(raw))
        } else {
            Ok(Self(raw))
        }
    }

    /// Create an address in const context
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a const) if `raw` exceeds 0x7F.
    #[inline]
    pub const fn const_new(raw: u8) -> Self {
        if raw > Self::MAX {
            panic!("I2C address out of 7-bit range")
        }
        Self(raw)
    }

    /// The raw 7-bit value
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Address byte for a write phase
    #[inline]
    pub const fn write_byte(self) -> u8 {
        self.0 << 1
    }

    /// Address byte for a read phase
    #[inline]
    pub const fn read_byte(self) -> u8 {
        (self.0 << 1) | Direction::Read as u8
    }

    /// Address byte for the given direction
    #[inline]
    pub const fn byte(self, direction: Direction) -> u8 {
        (self.0 << 1) | direction as u8
    }

    /// Addresses 0x00-0x07 and 0x78-0x7F are reserved by the I2C standard
    #[inline]
    pub const fn is_reserved(self) -> bool {
        self.0 < 0x08 || self.0 > 0x77
    }
}

impl TryFrom<u8> for Address {
    type Error = InvalidAddress;

    #[inline]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for u8 {
    #[inline]
    fn from(address: Address) -> u8 {
        address.0
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert!(Address::new(0x00).is_ok());
        assert!(Address::new(0x7F).is_ok());
        assert_eq!(Address::new(0x80), Err(InvalidAddress(0x80)));
        assert_eq!(Address::try_from(0xFF), Err(InvalidAddress(0xFF)));
    }

    #[test]
    fn test_address_bytes() {
        let addr = Address::const_new(0x50);
        assert_eq!(addr.write_byte(), 0xA0);
        assert_eq!(addr.read_byte(), 0xA1);
        assert_eq!(addr.byte(Direction::Write), 0xA0);
        assert_eq!(addr.byte(Direction::Read), 0xA1);

        // Top address keeps all seven bits
        let top = Address::const_new(0x7F);
        assert_eq!(top.write_byte(), 0xFE);
        assert_eq!(top.read_byte(), 0xFF);
    }

    #[test]
    fn test_reserved() {
        assert!(Address::const_new(0x00).is_reserved());
        assert!(Address::const_new(0x07).is_reserved());
        assert!(!Address::const_new(0x08).is_reserved());
        assert!(!Address::const_new(0x77).is_reserved());
        assert!(Address::const_new(0x78).is_reserved());
    }

    #[test]
    fn test_into_u8() {
        let raw: u8 = Address::const_new(0x3C).into();
        assert_eq!(raw, 0x3C);
    }
}
