//! Bus clock configuration
//!
//! The SCL frequency of a TWI master is derived from the CPU clock:
//!
//! ```text
//! scl = cpu / (16 + 2 * divisor * prescaler)
//! ```
//!
//! [`I2cConfig::timing`] solves this for the divisor, picking the
//! smallest prescaler that keeps the divisor within one byte.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Clock prescaler (status register bits 1:0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Prescaler {
    /// Divide by 1
    #[default]
    Div1,
    /// Divide by 4
    Div4,
    /// Divide by 16
    Div16,
    /// Divide by 64
    Div64,
}

impl Prescaler {
    /// All prescalers, smallest first
    pub const ALL: [Prescaler; 4] = [
        Prescaler::Div1,
        Prescaler::Div4,
        Prescaler::Div16,
        Prescaler::Div64,
    ];

    /// Division factor
    pub const fn factor(self) -> u32 {
        match self {
            Prescaler::Div1 => 1,
            Prescaler::Div4 => 4,
            Prescaler::Div16 => 16,
            Prescaler::Div64 => 64,
        }
    }

    /// Register encoding
    pub const fn bits(self) -> u8 {
        match self {
            Prescaler::Div1 => 0b00,
            Prescaler::Div4 => 0b01,
            Prescaler::Div16 => 0b10,
            Prescaler::Div64 => 0b11,
        }
    }

    /// Decode from the low two bits of a register value
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Prescaler::Div1,
            0b01 => Prescaler::Div4,
            0b10 => Prescaler::Div16,
            _ => Prescaler::Div64,
        }
    }
}

/// Errors from clock configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// SCL or CPU frequency is zero
    ZeroFrequency,
    /// Requested SCL is faster than the CPU clock allows (cpu < 16 * scl)
    FrequencyTooHigh,
    /// Requested SCL needs a divisor beyond 255 even at the largest prescaler
    FrequencyTooLow,
}

/// Register values producing a bus clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// Prescaler selection
    pub prescaler: Prescaler,
    /// Bit-rate divisor register value
    pub divisor: u8,
}

impl BusTiming {
    /// SCL frequency this timing produces for the given CPU clock
    pub fn frequency(&self, cpu_frequency: u32) -> u32 {
        cpu_frequency / (16 + 2 * self.divisor as u32 * self.prescaler.factor())
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct I2cConfig {
    /// SCL frequency in Hz
    pub frequency: u32,
    /// CPU clock feeding the peripheral, in Hz
    pub cpu_frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// CPU clock assumed by the named constants
    pub const DEFAULT_CPU_FREQUENCY: u32 = 16_000_000;

    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        frequency: 100_000,
        cpu_frequency: Self::DEFAULT_CPU_FREQUENCY,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        frequency: 400_000,
        cpu_frequency: Self::DEFAULT_CPU_FREQUENCY,
    };

    /// Same bus frequency on a different CPU clock
    pub const fn with_cpu_frequency(self, cpu_frequency: u32) -> Self {
        Self {
            frequency: self.frequency,
            cpu_frequency,
        }
    }

    /// Compute prescaler and divisor for this configuration
    ///
    /// Both divisions round up, so the resulting SCL never exceeds the
    /// requested frequency.
    pub fn timing(&self) -> Result<BusTiming, ConfigError> {
        if self.frequency == 0 || self.cpu_frequency == 0 {
            return Err(ConfigError::ZeroFrequency);
        }

        let ratio = self.cpu_frequency.div_ceil(self.frequency);
        if ratio < 16 {
            return Err(ConfigError::FrequencyTooHigh);
        }

        for prescaler in Prescaler::ALL {
            let divisor = (ratio - 16).div_ceil(2 * prescaler.factor());
            if divisor <= u8::MAX as u32 {
                return Ok(BusTiming {
                    prescaler,
                    divisor: divisor as u8,
                });
            }
        }

        Err(ConfigError::FrequencyTooLow)
    }
}
