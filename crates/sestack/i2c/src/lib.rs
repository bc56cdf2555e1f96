//! I2C transport layer for secure element protocol stacks
//!
//! The layer sits at the bottom of a [`ProtocolStack`](sestack_core::ProtocolStack)
//! and performs raw reads and writes through an external [`I2cBus`] driver. It
//! owns the slave address and clock frequency properties of the chain.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

pub mod bus;
pub mod config;
pub mod layer;

pub use bus::I2cBus;
pub use config::I2cConfig;
pub use layer::I2cLayer;
