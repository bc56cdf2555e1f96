//! Secure element sessions over a layered protocol stack
//!
//! [`Session::open`] assembles an I2C transport, a framing layer and an
//! optional [`ApduLayer`] into a [`ProtocolStack`](sestack_core::ProtocolStack),
//! activates it and exposes request/response round-trips. Command libraries
//! implement [`Command`] and run their requests through [`Session::execute`].
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod apdu;
pub mod command;
pub mod config;
pub mod session;
pub mod status;

pub use apdu::ApduLayer;
pub use command::{Command, CommandApdu, Select};
pub use config::SessionConfig;
pub use session::Session;
pub use status::StatusWord;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{ApduLayer, Command, CommandApdu, Select, Session, SessionConfig, StatusWord};
    pub use sestack_core::{Checksum, Error, Result, TransportError};
    pub use sestack_transport_i2c::I2cBus;
}
