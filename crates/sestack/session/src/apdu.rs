//! ISO/IEC 7816-4 application layer
//!
//! Sits on top of a framing layer. Outgoing buffers must be well formed short
//! command APDUs; incoming responses are split into payload and status word
//! and anything other than `90 00` is reported as [`Error::Status`].

use bytes::Bytes;
use sestack_core::prelude::*;
use sestack_core::Operation;
use tracing::{debug, info, trace, warn};

use crate::status::StatusWord;

/// Length of the status word trailing every response
pub const STATUS_WORD_LEN: usize = 2;

/// Longest short command APDU: header, Lc, 255 data bytes and Le
pub const MAX_SHORT_COMMAND_LEN: usize = 4 + 1 + 255 + 1;

/// Layer validating command APDUs and response status words
#[derive(Debug, Default)]
pub struct ApduLayer {
    last_status: Option<StatusWord>,
}

impl ApduLayer {
    /// Create a new APDU layer
    pub const fn new() -> Self {
        Self { last_status: None }
    }

    /// Status word of the most recent response
    pub const fn last_status(&self) -> Option<StatusWord> {
        self.last_status
    }
}

/// Check that `command` is a short APDU of case 1, 2, 3 or 4
fn check_short_command(command: &[u8]) -> Result<(), &'static str> {
    if command.len() < 4 {
        return Err("command shorter than its header");
    }
    if command.len() > MAX_SHORT_COMMAND_LEN {
        return Err("command exceeds short APDU length");
    }

    match command.len() {
        // Case 1 (header only) and case 2 (header and Le)
        4 | 5 => Ok(()),
        len => {
            let lc = usize::from(command[4]);
            if lc == 0 {
                return Err("zero Lc with trailing bytes");
            }
            // Case 3 (header, Lc, data) and case 4 (header, Lc, data, Le)
            if len == 5 + lc || len == 6 + lc {
                Ok(())
            } else {
                Err("Lc inconsistent with command length")
            }
        }
    }
}

impl ProtocolLayer for ApduLayer {
    fn layer_id(&self) -> LayerId {
        LayerId::APDU
    }

    fn transmit(&mut self, data: &[u8], mut base: Base<'_>) -> Result<()> {
        check_short_command(data)
            .map_err(|reason| Error::illegal_argument(LayerId::APDU, Operation::Transmit, reason))?;
        trace!(cla = data[0], ins = data[1], "Sending command APDU");
        base.transmit(data)
    }

    fn receive(&mut self, expected_len: usize, mut base: Base<'_>) -> Result<Bytes> {
        if expected_len < STATUS_WORD_LEN {
            return Err(Error::illegal_argument(
                LayerId::APDU,
                Operation::Receive,
                "expected length shorter than a status word",
            ));
        }

        let mut payload = base.receive(expected_len)?;
        if payload.len() < STATUS_WORD_LEN {
            return Err(Error::UnexpectedLength {
                layer: LayerId::APDU,
                expected: expected_len,
                actual: payload.len(),
            });
        }

        let trailer = payload.split_off(payload.len() - STATUS_WORD_LEN);
        let status = StatusWord::new(trailer[0], trailer[1]);
        self.last_status = Some(status);

        if status.is_success() {
            debug!(%status, len = payload.len(), "Response APDU");
            return Ok(payload);
        }

        let level = status.tracing_level();
        if level == tracing::Level::INFO {
            info!(%status, description = status.description(), "Command completed with warning");
        } else {
            warn!(%status, description = status.description(), "Command rejected");
        }
        Err(Error::Status {
            layer: LayerId::APDU,
            status: status.to_u16(),
        })
    }

    fn destroy(&mut self) {
        self.last_status = None;
    }
}
