//! Driver contract for the physical bus

use core::fmt;

use sestack_core::TransportError;

/// Register-level I2C driver used by [`I2cLayer`](crate::I2cLayer)
///
/// Implementations report failures as [`TransportError`] values, which are
/// handed to the caller unchanged.
pub trait I2cBus: fmt::Debug + Send {
    /// Configure the bus clock frequency in Hz
    fn set_frequency(&mut self, hz: u32) -> Result<(), TransportError>;

    /// Write `data` to the device at `address`
    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), TransportError>;

    /// Fill `buffer` with bytes read from the device at `address`
    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), TransportError>;

    /// Release the bus, called once when the transport layer is destroyed
    fn release(&mut self) {}
}

impl<B: I2cBus + ?Sized> I2cBus for Box<B> {
    fn set_frequency(&mut self, hz: u32) -> Result<(), TransportError> {
        (**self).set_frequency(hz)
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(address, data)
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), TransportError> {
        (**self).read(address, buffer)
    }

    fn release(&mut self) {
        (**self).release();
    }
}
