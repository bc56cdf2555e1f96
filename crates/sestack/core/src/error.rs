//! Core error type for all protocol stack operations
//!
//! Every variant names the layer and the operation that failed so callers can
//! tell a transport fault apart from a corrupted frame or a misassembled stack.

use crate::layer::{LayerId, LayerState, Operation};
use crate::transport::TransportError;

/// Result type used throughout the stack
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Core error type that encompasses all possible errors in the crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter was empty, zero or too large
    #[error("{layer} {operation}: illegal argument: {reason}")]
    IllegalArgument {
        /// Layer that rejected the argument
        layer: LayerId,
        /// Operation that was invoked
        operation: Operation,
        /// What was wrong with the argument
        reason: &'static str,
    },

    /// A buffer could not be allocated
    #[error("{layer} {operation}: out of memory")]
    OutOfMemory {
        /// Layer that failed to allocate
        layer: LayerId,
        /// Operation that was invoked
        operation: Operation,
    },

    /// The chain does not contain the layer an operation needs
    #[error("{operation}: invalid protocol stack: {reason}")]
    InvalidProtocolStack {
        /// Operation that was invoked
        operation: Operation,
        /// Why the stack could not serve the request
        reason: &'static str,
    },

    /// The layer is not in a state that allows the operation
    #[error("{layer} {operation}: not allowed while {state}")]
    InvalidState {
        /// Layer that was addressed
        layer: LayerId,
        /// Operation that was invoked
        operation: Operation,
        /// State the layer was in
        state: LayerState,
    },

    /// Failure reported by the external transport, passed through verbatim
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The integrity trailer of a received frame does not match its content
    #[error("{layer}: frame integrity failure: expected {expected:#06x}, received {actual:#06x}")]
    FrameIntegrity {
        /// Layer that validated the frame
        layer: LayerId,
        /// Checksum computed over the received payload
        expected: u16,
        /// Checksum carried in the received trailer
        actual: u16,
    },

    /// A response did not have the exact length that was requested
    #[error("{layer}: expected {expected} bytes, received {actual}")]
    UnexpectedLength {
        /// Layer that checked the length
        layer: LayerId,
        /// Number of bytes requested
        expected: usize,
        /// Number of bytes obtained
        actual: usize,
    },

    /// The peer rejected a request with an application status code
    #[error("{layer}: request rejected with status {status:#06X}")]
    Status {
        /// Layer that decoded the status
        layer: LayerId,
        /// Status code returned by the peer
        status: u16,
    },
}

impl Error {
    /// Create a new illegal argument error
    pub const fn illegal_argument(
        layer: LayerId,
        operation: Operation,
        reason: &'static str,
    ) -> Self {
        Self::IllegalArgument {
            layer,
            operation,
            reason,
        }
    }

    /// Create a new invalid protocol stack error
    pub const fn invalid_stack(operation: Operation, reason: &'static str) -> Self {
        Self::InvalidProtocolStack { operation, reason }
    }

    /// Check if this error reports a corrupted frame
    pub const fn is_frame_integrity(&self) -> bool {
        matches!(self, Self::FrameIntegrity { .. })
    }

    /// Check if this error was raised by the external transport
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Check if this error reports a misassembled stack or a missing property owner
    pub const fn is_invalid_stack(&self) -> bool {
        matches!(self, Self::InvalidProtocolStack { .. })
    }
}
