//! Session orchestration
//!
//! Builds the concrete stack for one secure element, activates it and exposes
//! request/response round-trips on top of it.

use bytes::Bytes;
use sestack_core::prelude::*;
use sestack_transport_i2c::{I2cBus, I2cLayer};
use tracing::{debug, info, instrument, warn};

use crate::apdu::ApduLayer;
use crate::command::Command;
use crate::config::SessionConfig;

/// An activated protocol stack talking to one secure element
#[derive(Debug)]
pub struct Session {
    stack: ProtocolStack,
    config: SessionConfig,
    initial_response: Option<Bytes>,
}

impl Session {
    /// Assemble and activate a stack over `bus`
    ///
    /// The stack is I2C at the bottom, a framing layer above it and, when
    /// configured, an APDU layer on top. If any step fails the layers built so
    /// far are destroyed once before the error is returned.
    #[instrument(level = "debug", skip(bus), fields(address = config.slave_address))]
    pub fn open<B: I2cBus + 'static>(bus: B, config: SessionConfig) -> Result<Self> {
        let mut stack = ProtocolStack::new(I2cLayer::new(bus))?;

        match Self::assemble(&mut stack, &config) {
            Ok(initial_response) => {
                info!(
                    layers = stack.depth(),
                    checksum = %config.checksum,
                    "Session opened"
                );
                Ok(Self {
                    stack,
                    config,
                    initial_response,
                })
            }
            Err(e) => {
                warn!(error = %e, "Failed to open session");
                stack.destroy();
                Err(e)
            }
        }
    }

    fn assemble(stack: &mut ProtocolStack, config: &SessionConfig) -> Result<Option<Bytes>> {
        stack.push(FramingLayer::new(config.checksum))?;
        if config.application_layer {
            stack.push(ApduLayer::new())?;
        }

        stack.set_slave_address(config.slave_address)?;
        stack.set_clock_frequency(config.clock_frequency)?;
        stack.set_property(Property::InformationFieldSize(
            config.information_field_size,
        ))?;

        stack.activate()
    }

    /// Transmit `request` and receive a response of `response_len` bytes
    ///
    /// `response_len` counts the bytes seen above the framing layer, so it
    /// includes the status word when an APDU layer is present. The integrity
    /// trailer is accounted for here.
    pub fn exchange(&mut self, request: &[u8], response_len: usize) -> Result<Bytes> {
        debug!(len = request.len(), response_len, "Exchange");
        self.stack.transmit(request)?;
        self.stack
            .receive(response_len + self.config.checksum.trailer_len())
    }

    /// Encode `command`, exchange it and parse the response
    pub fn execute<C: Command>(&mut self, command: &C) -> Result<C::Response> {
        let request = command.to_bytes();
        let payload = self.exchange(&request, command.expected_len())?;
        command.parse(payload)
    }

    /// Response produced while activating the stack, if any
    pub const fn initial_response(&self) -> Option<&Bytes> {
        self.initial_response.as_ref()
    }

    /// Configuration the session was opened with
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get a reference to the underlying stack
    pub const fn stack(&self) -> &ProtocolStack {
        &self.stack
    }

    /// Get a mutable reference to the underlying stack
    pub const fn stack_mut(&mut self) -> &mut ProtocolStack {
        &mut self.stack
    }

    /// Tear the stack down and end the session
    pub fn close(mut self) {
        self.stack.destroy();
        info!("Session closed");
    }
}
