//! Frame integrity layer
//!
//! Appends a checksum trailer to every outgoing payload and verifies the
//! trailer of every incoming frame before handing the payload upward.

use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use crate::checksum::Checksum;
use crate::layer::{LayerId, Operation, ProtocolLayer};
use crate::property::{FramingProperties, Property, PropertyId};
use crate::stack::Base;
use crate::{Error, Result};

/// Layer protecting frames with a [`Checksum`] trailer
#[derive(Debug, Default)]
pub struct FramingLayer {
    checksum: Checksum,
    properties: Option<FramingProperties>,
}

impl FramingLayer {
    /// Create a framing layer using `checksum`
    pub const fn new(checksum: Checksum) -> Self {
        Self {
            checksum,
            properties: None,
        }
    }

    /// Checksum algorithm of this layer
    pub const fn checksum(&self) -> Checksum {
        self.checksum
    }

    fn properties(&mut self) -> &mut FramingProperties {
        self.properties.get_or_insert_with(FramingProperties::default)
    }

    fn information_field_size(&self) -> usize {
        usize::from(self.properties.unwrap_or_default().information_field_size)
    }
}

impl ProtocolLayer for FramingLayer {
    fn layer_id(&self) -> LayerId {
        LayerId::FRAMING
    }

    fn transmit(&mut self, data: &[u8], mut base: Base<'_>) -> Result<()> {
        if data.is_empty() {
            return Err(Error::illegal_argument(
                LayerId::FRAMING,
                Operation::Transmit,
                "empty payload",
            ));
        }
        if data.len() > self.information_field_size() {
            return Err(Error::illegal_argument(
                LayerId::FRAMING,
                Operation::Transmit,
                "payload exceeds information field size",
            ));
        }

        let mut frame = BytesMut::with_capacity(data.len() + self.checksum.trailer_len());
        frame.extend_from_slice(data);
        self.checksum.append(data, &mut frame);
        trace!(checksum = %self.checksum, frame = %hex::encode(&frame), "Framed payload");

        base.transmit(&frame)
    }

    fn receive(&mut self, expected_len: usize, mut base: Base<'_>) -> Result<Bytes> {
        let trailer_len = self.checksum.trailer_len();
        if expected_len <= trailer_len {
            return Err(Error::illegal_argument(
                LayerId::FRAMING,
                Operation::Receive,
                "expected length does not exceed the trailer",
            ));
        }

        let mut payload = base.receive(expected_len)?;
        if payload.len() != expected_len {
            return Err(Error::UnexpectedLength {
                layer: LayerId::FRAMING,
                expected: expected_len,
                actual: payload.len(),
            });
        }

        let trailer = payload.split_off(expected_len - trailer_len);
        let computed = self.checksum.compute(&payload);
        let received = self.checksum.read(&trailer).ok_or(Error::UnexpectedLength {
            layer: LayerId::FRAMING,
            expected: trailer_len,
            actual: trailer.len(),
        })?;
        if computed != received {
            warn!(
                checksum = %self.checksum,
                expected = computed,
                actual = received,
                "Frame integrity check failed"
            );
            return Err(Error::FrameIntegrity {
                layer: LayerId::FRAMING,
                expected: computed,
                actual: received,
            });
        }

        Ok(payload)
    }

    fn destroy(&mut self) {
        self.properties = None;
    }

    fn get_property(&mut self, id: PropertyId) -> Result<Property> {
        match id {
            PropertyId::InformationFieldSize => Ok(Property::InformationFieldSize(
                self.properties().information_field_size,
            )),
            _ => Err(Error::invalid_stack(
                Operation::GetProperty,
                "property is not owned by a framing layer",
            )),
        }
    }

    fn set_property(&mut self, property: Property) -> Result<()> {
        match property {
            Property::InformationFieldSize(size) => {
                property.validate(LayerId::FRAMING)?;
                self.properties().information_field_size = size;
                Ok(())
            }
            _ => Err(Error::invalid_stack(
                Operation::SetProperty,
                "property is not owned by a framing layer",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use hex_literal::hex;

    use super::*;
    use crate::stack::ProtocolStack;

    /// Loopback transport returning whatever is scripted into `rx`
    #[derive(Debug, Default)]
    struct Loopback {
        tx: Arc<Mutex<Vec<Vec<u8>>>>,
        rx: Arc<Mutex<Vec<u8>>>,
    }

    impl ProtocolLayer for Loopback {
        fn layer_id(&self) -> LayerId {
            LayerId::I2C
        }

        fn requires_base(&self) -> bool {
            false
        }

        fn transmit(&mut self, data: &[u8], _base: Base<'_>) -> Result<()> {
            self.tx.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        fn receive(&mut self, expected_len: usize, _base: Base<'_>) -> Result<Bytes> {
            let rx = self.rx.lock().unwrap();
            let len = expected_len.min(rx.len());
            Ok(Bytes::copy_from_slice(&rx[..len]))
        }

        fn destroy(&mut self) {}
    }

    type Wire = (Arc<Mutex<Vec<Vec<u8>>>>, Arc<Mutex<Vec<u8>>>);

    fn framed_stack(checksum: Checksum) -> (ProtocolStack, Wire) {
        let loopback = Loopback::default();
        let wire = (Arc::clone(&loopback.tx), Arc::clone(&loopback.rx));
        let mut stack = ProtocolStack::new(loopback)
            .unwrap()
            .with_layer(FramingLayer::new(checksum))
            .unwrap();
        stack.activate().unwrap();
        (stack, wire)
    }

    #[test]
    fn test_transmit_appends_trailer() {
        let (mut stack, (tx, _)) = framed_stack(Checksum::Crc16X25);
        stack.transmit(&hex!("00010203")).unwrap();
        assert_eq!(tx.lock().unwrap()[0], hex!("00010203A729"));

        let (mut stack, (tx, _)) = framed_stack(Checksum::Lrc8);
        stack.transmit(&hex!("00A40400")).unwrap();
        assert_eq!(tx.lock().unwrap()[0], hex!("00A40400A0"));
    }

    #[test]
    fn test_transmit_rejects_bad_payloads() {
        let (mut stack, (tx, _)) = framed_stack(Checksum::Crc16X25);
        assert!(matches!(
            stack.transmit(&[]),
            Err(Error::IllegalArgument { .. })
        ));

        stack
            .set_property(Property::InformationFieldSize(4))
            .unwrap();
        assert!(matches!(
            stack.transmit(&[0u8; 5]),
            Err(Error::IllegalArgument { .. })
        ));
        stack.transmit(&[0u8; 4]).unwrap();
        assert_eq!(tx.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_receive_verifies_trailer() {
        let (mut stack, (_, rx)) = framed_stack(Checksum::Crc16T1Gd);
        *rx.lock().unwrap() = hex!("00A404000568").to_vec();
        assert_eq!(stack.receive(6).unwrap().as_ref(), &hex!("00A40400"));

        *rx.lock().unwrap() = hex!("00A404000569").to_vec();
        let err = stack.receive(6).unwrap_err();
        assert!(matches!(
            err,
            Error::FrameIntegrity {
                expected: 0x0568,
                actual: 0x0569,
                ..
            }
        ));
    }

    #[test]
    fn test_receive_length_checks() {
        let (mut stack, (_, rx)) = framed_stack(Checksum::Crc16X25);
        assert!(matches!(
            stack.receive(2),
            Err(Error::IllegalArgument { .. })
        ));

        *rx.lock().unwrap() = hex!("0001").to_vec();
        assert!(matches!(
            stack.receive(6),
            Err(Error::UnexpectedLength {
                expected: 6,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_information_field_size_property() {
        let mut layer = FramingLayer::default();
        assert_eq!(
            layer
                .get_property(PropertyId::InformationFieldSize)
                .unwrap(),
            Property::InformationFieldSize(254)
        );
        assert!(matches!(
            layer.set_property(Property::InformationFieldSize(0)),
            Err(Error::IllegalArgument { .. })
        ));
        assert!(layer
            .set_property(Property::SlaveAddress(0x51))
            .unwrap_err()
            .is_invalid_stack());

        layer
            .set_property(Property::InformationFieldSize(32))
            .unwrap();
        layer.destroy();
        assert_eq!(
            layer
                .get_property(PropertyId::InformationFieldSize)
                .unwrap(),
            Property::InformationFieldSize(254)
        );
    }
}
