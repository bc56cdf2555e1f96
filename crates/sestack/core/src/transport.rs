//! Error reported by the external bus driver beneath the transport layer

/// Transport error type
///
/// Values are produced by the driver and handed to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The addressed device did not acknowledge
    #[error("No acknowledge from device at address {address:#04x}")]
    Nack {
        /// Bus address that was addressed
        address: u16,
    },

    /// Another bus master took over the bus
    #[error("Bus arbitration lost")]
    ArbitrationLost,

    /// Operation timed out
    #[error("Operation timed out")]
    Timeout,

    /// The bus could not be configured
    #[error("Failed to configure bus")]
    Configuration,

    /// Driver error (with code)
    #[error("Driver error code: {0}")]
    Driver(i32),

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a new driver error
    pub const fn driver(code: i32) -> Self {
        Self::Driver(code)
    }

    /// Get the driver status code if this is a driver error
    pub const fn driver_code(&self) -> Option<i32> {
        match self {
            Self::Driver(code) => Some(*code),
            _ => None,
        }
    }

    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }
}
