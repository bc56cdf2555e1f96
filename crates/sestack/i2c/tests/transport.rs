//! I2C transport below a framing layer

mod common;

use hex_literal::hex;
use sestack_core::prelude::*;
use sestack_transport_i2c::{I2cConfig, I2cLayer};

use common::RecordingBus;

fn framed(bus: &RecordingBus, checksum: Checksum) -> ProtocolStack {
    ProtocolStack::new(I2cLayer::new(bus.clone()))
        .unwrap()
        .with_layer(FramingLayer::new(checksum))
        .unwrap()
}

#[test]
fn test_end_to_end_exchange() {
    let bus = RecordingBus::default();
    let mut stack = framed(&bus, Checksum::Crc16X25);

    stack.set_slave_address(0x51).unwrap();
    stack.set_clock_frequency(100_000).unwrap();
    assert_eq!(stack.activate().unwrap(), None);
    assert_eq!(bus.log.lock().unwrap().frequencies, vec![100_000, 100_000]);

    stack.transmit(&[0, 1, 2, 3]).unwrap();
    assert_eq!(bus.written(), vec![(0x51, hex!("00010203A729").to_vec())]);

    bus.respond(&hex!("00010203A729"));
    assert_eq!(stack.receive(6).unwrap().as_ref(), &[0, 1, 2, 3]);

    bus.respond(&hex!("00010203A728"));
    let err = stack.receive(6).unwrap_err();
    assert!(err.is_frame_integrity());
    assert!(matches!(
        err,
        Error::FrameIntegrity {
            layer: LayerId::FRAMING,
            expected: 0xA729,
            actual: 0xA728,
        }
    ));

    stack.destroy();
    drop(stack);
    assert_eq!(bus.log.lock().unwrap().released, 1);
}

#[test]
fn test_configured_initial_properties() {
    let bus = RecordingBus::default();
    let config = I2cConfig::new()
        .with_slave_address(0x30)
        .with_clock_frequency(1_000_000);
    let mut stack = ProtocolStack::new(I2cLayer::with_config(bus.clone(), config)).unwrap();

    assert_eq!(stack.slave_address().unwrap(), 0x30);
    assert_eq!(stack.clock_frequency().unwrap(), 1_000_000);
    stack.activate().unwrap();
    assert_eq!(bus.log.lock().unwrap().frequencies, vec![1_000_000]);
}

#[test]
fn test_missing_response_is_a_transport_error() {
    let bus = RecordingBus::default();
    let mut stack = framed(&bus, Checksum::Lrc8);
    stack.activate().unwrap();

    let err = stack.receive(3).unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(
        err,
        Error::Transport(TransportError::Nack { address: 0x50 })
    ));
}
