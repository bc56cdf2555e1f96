//! Protocol layer abstraction
//!
//! A layer is one node of a linear chain. Each layer receives a [`Base`]
//! handle to the part of the chain beneath it and decides itself how much of
//! an operation it handles and what it forwards downward.

use core::fmt;

use bytes::Bytes;

use crate::property::{Property, PropertyId};
use crate::stack::Base;
use crate::{Error, Result};

/// Stable identity of a concrete layer type
///
/// Used to route property requests to the one layer that owns them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u8);

impl LayerId {
    /// I2C transport layer
    pub const I2C: Self = Self(0x34);
    /// Frame integrity layer
    pub const FRAMING: Self = Self(0x21);
    /// ISO/IEC 7816-4 APDU application layer
    pub const APDU: Self = Self(0x41);

    const fn name(&self) -> Option<&'static str> {
        match *self {
            Self::I2C => Some("I2C"),
            Self::FRAMING => Some("FRAMING"),
            Self::APDU => Some("APDU"),
            _ => None,
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({:#04x})", self.0),
            None => write!(f, "LAYER({:#04x})", self.0),
        }
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Lifecycle of a layer inside a stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum LayerState {
    /// Not attached to a stack yet
    #[default]
    #[display("uninitialized")]
    Uninitialized,
    /// Attached to a stack, not activated
    #[display("constructed")]
    Constructed,
    /// Activated, ready for transmit and receive
    #[display("activated")]
    Activated,
    /// Torn down, all resources released
    #[display("destroyed")]
    Destroyed,
}

/// Operation performed on a layer, used in error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Operation {
    /// Attaching a layer to a stack
    #[display("initialize")]
    Initialize,
    /// Session activation
    #[display("activate")]
    Activate,
    /// Sending bytes
    #[display("transmit")]
    Transmit,
    /// Receiving bytes
    #[display("receive")]
    Receive,
    /// Teardown
    #[display("destroy")]
    Destroy,
    /// Reading a property
    #[display("get property")]
    GetProperty,
    /// Writing a property
    #[display("set property")]
    SetProperty,
}

/// Trait implemented by every layer of a protocol stack
///
/// The stack tracks the lifecycle of each layer and only dispatches
/// `transmit`/`receive` to activated layers, so implementations can focus on
/// their own transformation.
pub trait ProtocolLayer: Send + fmt::Debug {
    /// Identity of this layer
    fn layer_id(&self) -> LayerId;

    /// Whether this layer needs another layer beneath it
    ///
    /// Transport layers performing the actual I/O return `false`.
    fn requires_base(&self) -> bool {
        true
    }

    /// Activate this layer and everything beneath it
    ///
    /// Returns the initial response produced during activation, if any.
    fn activate(&mut self, mut base: Base<'_>) -> Result<Option<Bytes>> {
        base.activate()
    }

    /// Send `data`, possibly transformed, through this layer
    fn transmit(&mut self, data: &[u8], base: Base<'_>) -> Result<()>;

    /// Obtain a response of `expected_len` wire bytes and strip this layer's framing
    fn receive(&mut self, expected_len: usize, base: Base<'_>) -> Result<Bytes>;

    /// Release every resource held by this layer
    ///
    /// Must be safe to call more than once.
    fn destroy(&mut self);

    /// Read a property owned by this layer
    fn get_property(&mut self, id: PropertyId) -> Result<Property> {
        let _ = id;
        Err(Error::invalid_stack(
            Operation::GetProperty,
            "layer does not own the property",
        ))
    }

    /// Write a property owned by this layer
    fn set_property(&mut self, property: Property) -> Result<()> {
        let _ = property;
        Err(Error::invalid_stack(
            Operation::SetProperty,
            "layer does not own the property",
        ))
    }
}
