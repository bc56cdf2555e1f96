//! Configuration options for a session

use sestack_core::Checksum;
use sestack_core::property::{
    DEFAULT_CLOCK_FREQUENCY, DEFAULT_INFORMATION_FIELD_SIZE, DEFAULT_SLAVE_ADDRESS,
};
use sestack_transport_i2c::I2cConfig;

/// Parameters applied when a [`Session`](crate::Session) is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Address of the secure element on the bus
    pub slave_address: u16,

    /// Bus clock frequency in Hz
    pub clock_frequency: u32,

    /// Integrity code appended to every frame
    pub checksum: Checksum,

    /// Maximum payload of one frame
    pub information_field_size: u16,

    /// Push an APDU layer on top of the framing layer
    pub application_layer: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,
            clock_frequency: DEFAULT_CLOCK_FREQUENCY,
            checksum: Checksum::default(),
            information_field_size: DEFAULT_INFORMATION_FIELD_SIZE,
            application_layer: true,
        }
    }
}

impl SessionConfig {
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

    /// Set the frame checksum
    pub const fn with_checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = checksum;
        self
    }

    /// Set the information field size
    pub const fn with_information_field_size(mut self, size: u16) -> Self {
        self.information_field_size = size;
        self
    }

    /// Set whether an APDU layer is stacked on top
    pub const fn with_application_layer(mut self, enabled: bool) -> Self {
        self.application_layer = enabled;
        self
    }

    /// Bus part of this configuration
    pub const fn i2c(&self) -> I2cConfig {
        I2cConfig {
            slave_address: self.slave_address,
            clock_frequency: self.clock_frequency,
        }
    }
}
