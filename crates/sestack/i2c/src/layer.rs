//! Bottom layer performing bus I/O

use bytes::Bytes;
use sestack_core::prelude::*;
use sestack_core::{BusProperties, Operation};
use tracing::{debug, trace};

use crate::bus::I2cBus;
use crate::config::I2cConfig;

/// Transport layer driving an [`I2cBus`]
///
/// Owns the [`PropertyId::SlaveAddress`] and [`PropertyId::ClockFrequency`]
/// properties. Frequency changes are pushed to the bus immediately and the
/// slave address is used for every subsequent transfer.
#[derive(Debug)]
pub struct I2cLayer<B: I2cBus> {
    bus: B,
    config: I2cConfig,
    properties: Option<BusProperties>,
    released: bool,
}

impl<B: I2cBus> I2cLayer<B> {
    /// Create a layer over `bus` with default properties
    pub fn new(bus: B) -> Self {
        Self::with_config(bus, I2cConfig::default())
    }

    /// Create a layer over `bus` whose properties start from `config`
    pub const fn with_config(bus: B, config: I2cConfig) -> Self {
        Self {
            bus,
            config,
            properties: None,
            released: false,
        }
    }

    /// Get a reference to the underlying bus
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    fn properties(&mut self) -> &mut BusProperties {
        let config = self.config;
        self.properties.get_or_insert_with(|| config.into())
    }
}

impl<B: I2cBus> ProtocolLayer for I2cLayer<B> {
    fn layer_id(&self) -> LayerId {
        LayerId::I2C
    }

    fn requires_base(&self) -> bool {
        false
    }

    fn activate(&mut self, _base: Base<'_>) -> Result<Option<Bytes>> {
        let BusProperties {
            slave_address,
            clock_frequency,
        } = *self.properties();
        debug!(
            address = slave_address,
            hz = clock_frequency,
            "Configuring I2C bus"
        );
        self.bus.set_frequency(clock_frequency)?;
        Ok(None)
    }

    fn transmit(&mut self, data: &[u8], _base: Base<'_>) -> Result<()> {
        if data.is_empty() {
            return Err(Error::illegal_argument(
                LayerId::I2C,
                Operation::Transmit,
                "empty payload",
            ));
        }

        let address = self.properties().slave_address;
        trace!(address, data = %hex::encode(data), "I2C write");
        self.bus.write(address, data)?;
        Ok(())
    }

    fn receive(&mut self, expected_len: usize, _base: Base<'_>) -> Result<Bytes> {
        if expected_len == 0 {
            return Err(Error::illegal_argument(
                LayerId::I2C,
                Operation::Receive,
                "zero length read",
            ));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(expected_len)
            .map_err(|_| Error::OutOfMemory {
                layer: LayerId::I2C,
                operation: Operation::Receive,
            })?;
        buffer.resize(expected_len, 0);

        let address = self.properties().slave_address;
        self.bus.read(address, &mut buffer)?;
        trace!(address, data = %hex::encode(&buffer), "I2C read");
        Ok(Bytes::from(buffer))
    }

    fn destroy(&mut self) {
        self.properties = None;
        if !self.released {
            self.released = true;
            self.bus.release();
            debug!("Released I2C bus");
        }
    }

    fn get_property(&mut self, id: PropertyId) -> Result<Property> {
        self.properties().get(id)
    }

    fn set_property(&mut self, property: Property) -> Result<()> {
        if let Property::ClockFrequency(hz) = property {
            property.validate(LayerId::I2C)?;
            self.bus.set_frequency(hz)?;
        }
        self.properties().set(property)
    }
}

impl<B: I2cBus> Drop for I2cLayer<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}
