//! Master-mode status codes
//!
//! After every phase the peripheral reports an outcome in the upper five
//! bits of its status register. The transaction layer does not act on
//! these codes; they are decoded here for diagnostics and bus probing.

/// Decoded status register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// Illegal start or stop condition detected
    BusError,
    /// Start condition transmitted
    StartSent,
    /// Repeated start condition transmitted
    RepeatedStartSent,
    /// Address + W transmitted, ACK received
    AddressWriteAck,
    /// Address + W transmitted, NACK received
    AddressWriteNack,
    /// Data byte transmitted, ACK received
    DataSentAck,
    /// Data byte transmitted, NACK received
    DataSentNack,
    /// Arbitration lost to another master
    ArbitrationLost,
    /// Address + R transmitted, ACK received
    AddressReadAck,
    /// Address + R transmitted, NACK received
    AddressReadNack,
    /// Data byte received, ACK returned
    DataReceivedAck,
    /// Data byte received, NACK returned
    DataReceivedNack,
    /// No relevant state information (flag not set)
    NoInfo,
    /// Code outside the master-mode set
    Unknown(u8),
}

impl Status {
    /// Decode a masked status register value
    pub const fn from_code(code: u8) -> Self {
        match code & 0xF8 {
            0x00 => Status::BusError,
            0x08 => Status::StartSent,
            0x10 => Status::RepeatedStartSent,
            0x18 => Status::AddressWriteAck,
            0x20 => Status::AddressWriteNack,
            0x28 => Status::DataSentAck,
            0x30 => Status::DataSentNack,
            0x38 => Status::ArbitrationLost,
            0x40 => Status::AddressReadAck,
            0x48 => Status::AddressReadNack,
            0x50 => Status::DataReceivedAck,
            0x58 => Status::DataReceivedNack,
            0xF8 => Status::NoInfo,
            other => Status::Unknown(other),
        }
    }

    /// Encode back to the register value
    pub const fn code(self) -> u8 {
        match self {
            Status::BusError => 0x00,
            Status::StartSent => 0x08,
            Status::RepeatedStartSent => 0x10,
            Status::AddressWriteAck => 0x18,
            Status::AddressWriteNack => 0x20,
            Status::DataSentAck => 0x28,
            Status::DataSentNack => 0x30,
            Status::ArbitrationLost => 0x38,
            Status::AddressReadAck => 0x40,
            Status::AddressReadNack => 0x48,
            Status::DataReceivedAck => 0x50,
            Status::DataReceivedNack => 0x58,
            Status::NoInfo => 0xF8,
            Status::Unknown(code) => code,
        }
    }

    /// Whether a slave acknowledged its address
    pub const fn is_address_ack(self) -> bool {
        matches!(self, Status::AddressWriteAck | Status::AddressReadAck)
    }

    /// Whether the code signals a bus fault rather than a protocol outcome
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Status::BusError | Status::ArbitrationLost | Status::Unknown(_)
        )
    }
}

impl From<u8> for Status {
    fn from(code: u8) -> Self {
        Status::from_code(code)
    }
}
