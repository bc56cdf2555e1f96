//! Per-layer configuration located by layer identity
//!
//! Every property id is owned by exactly one layer type. Requests are routed
//! down the chain until the owning layer is found; the owner allocates its
//! property block with the documented defaults on first access.

use crate::layer::{LayerId, Operation};
use crate::{Error, Result};

/// Default I2C address of the secure element
pub const DEFAULT_SLAVE_ADDRESS: u16 = 0x50;

/// Default I2C clock frequency in Hz
pub const DEFAULT_CLOCK_FREQUENCY: u32 = 400_000;

/// Default maximum payload accepted by a framing layer
pub const DEFAULT_INFORMATION_FIELD_SIZE: u16 = 254;

/// Highest address reachable with 10-bit I2C addressing
pub const MAX_SLAVE_ADDRESS: u16 = 0x3FF;

/// Identifier of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PropertyId {
    /// Peer address on the bus
    #[display("slave address")]
    SlaveAddress,
    /// Bus clock frequency in Hz
    #[display("clock frequency")]
    ClockFrequency,
    /// Maximum payload length of a frame
    #[display("information field size")]
    InformationFieldSize,
}

impl PropertyId {
    /// Layer that owns this property
    pub const fn owner(&self) -> LayerId {
        match self {
            Self::SlaveAddress | Self::ClockFrequency => LayerId::I2C,
            Self::InformationFieldSize => LayerId::FRAMING,
        }
    }
}

/// Property value tagged with its identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    /// Peer address on the bus
    SlaveAddress(u16),
    /// Bus clock frequency in Hz
    ClockFrequency(u32),
    /// Maximum payload length of a frame
    InformationFieldSize(u16),
}

impl Property {
    /// Identity of this property
    pub const fn id(&self) -> PropertyId {
        match self {
            Self::SlaveAddress(_) => PropertyId::SlaveAddress,
            Self::ClockFrequency(_) => PropertyId::ClockFrequency,
            Self::InformationFieldSize(_) => PropertyId::InformationFieldSize,
        }
    }

    /// Check the value against the limits of its property
    pub fn validate(&self, layer: LayerId) -> Result<()> {
        let reason = match *self {
            Self::SlaveAddress(address) if address > MAX_SLAVE_ADDRESS => {
                "address exceeds 10-bit range"
            }
            Self::ClockFrequency(0) => "clock frequency must be non-zero",
            Self::InformationFieldSize(0) => "information field size must be non-zero",
            _ => return Ok(()),
        };
        Err(Error::illegal_argument(layer, Operation::SetProperty, reason))
    }
}

/// Property block of a bus transport layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusProperties {
    /// Address currently in use
    pub slave_address: u16,
    /// Clock frequency in Hz
    pub clock_frequency: u32,
}

impl Default for BusProperties {
    fn default() -> Self {
        Self {
            slave_address: DEFAULT_SLAVE_ADDRESS,
            clock_frequency: DEFAULT_CLOCK_FREQUENCY,
        }
    }
}

impl BusProperties {
    /// Read the value of `id`, failing for ids not held in this block
    pub const fn get(&self, id: PropertyId) -> Result<Property> {
        match id {
            PropertyId::SlaveAddress => Ok(Property::SlaveAddress(self.slave_address)),
            PropertyId::ClockFrequency => Ok(Property::ClockFrequency(self.clock_frequency)),
            _ => Err(Error::invalid_stack(
                Operation::GetProperty,
                "property is not owned by a bus layer",
            )),
        }
    }

    /// Validate and store `property`, failing for ids not held in this block
    pub fn set(&mut self, property: Property) -> Result<()> {
        if property.id().owner() != LayerId::I2C {
            return Err(Error::invalid_stack(
                Operation::SetProperty,
                "property is not owned by a bus layer",
            ));
        }
        property.validate(LayerId::I2C)?;
        match property {
            Property::SlaveAddress(address) => self.slave_address = address,
            Property::ClockFrequency(frequency) => self.clock_frequency = frequency,
            Property::InformationFieldSize(_) => {}
        }
        Ok(())
    }
}

/// Property block of a framing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingProperties {
    /// Maximum payload length of one frame
    pub information_field_size: u16,
}

impl Default for FramingProperties {
    fn default() -> Self {
        Self {
            information_field_size: DEFAULT_INFORMATION_FIELD_SIZE,
        }
    }
}
