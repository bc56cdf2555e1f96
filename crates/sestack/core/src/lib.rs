//! Layered protocol stack for secure element links
//!
//! A session with a secure element is carried by a linear chain of protocol
//! layers: a transport layer performing the actual bus I/O at the bottom, a
//! framing layer protecting each frame with a checksum trailer above it, and
//! optionally an application layer on top.
//!
//! ## Overview
//!
//! - [`ProtocolLayer`] is implemented by every layer of a chain
//! - [`ProtocolStack`] owns the chain, dispatches operations top-down and
//!   guarantees a single teardown
//! - [`Property`] values are routed to the one layer that owns them
//! - [`checksum`] holds the CRC16 and LRC routines used by [`FramingLayer`]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub use bytes::{Bytes, BytesMut};

pub mod checksum;
pub mod framing;
pub mod layer;
pub mod property;
pub mod stack;
pub mod transport;

mod error;
pub use error::{Error, Result};

pub use checksum::Checksum;
pub use framing::FramingLayer;
pub use layer::{LayerId, LayerState, Operation, ProtocolLayer};
pub use property::{BusProperties, FramingProperties, Property, PropertyId};
pub use stack::{Base, ProtocolStack};
pub use transport::TransportError;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{
        Base, Bytes, BytesMut, Checksum, Error, FramingLayer, LayerId, ProtocolLayer,
        ProtocolStack, Property, PropertyId, Result, TransportError,
    };
}
