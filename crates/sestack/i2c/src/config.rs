//! Configuration options for the I2C transport

use sestack_core::BusProperties;
use sestack_core::property::{DEFAULT_CLOCK_FREQUENCY, DEFAULT_SLAVE_ADDRESS};

/// Initial bus properties of an [`I2cLayer`](crate::I2cLayer)
///
/// The values are applied when the layer first allocates its property block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct I2cConfig {
    /// Address of the secure element
    pub slave_address: u16,

    /// Bus clock frequency in Hz
    pub clock_frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,
            clock_frequency: DEFAULT_CLOCK_FREQUENCY,
        }
    }
}

impl I2cConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slave address
    pub const fn with_slave_address(mut self, address: u16) -> Self {
        self.slave_address = address;
        self
    }

    /// Set the clock frequency in Hz
    pub const fn with_clock_frequency(mut self, hz: u32) -> Self {
        self.clock_frequency = hz;
        self
    }
}

impl From<I2cConfig> for BusProperties {
    fn from(config: I2cConfig) -> Self {
        Self {
            slave_address: config.slave_address,
            clock_frequency: config.clock_frequency,
        }
    }
}
