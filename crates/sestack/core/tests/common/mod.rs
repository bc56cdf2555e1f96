//! Common test utilities

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use sestack_core::BusProperties;
use sestack_core::prelude::*;

/// Observable state of a [`MockTransport`]
#[derive(Debug, Default)]
pub struct Wire {
    /// Every buffer handed to the transport
    pub written: Vec<Vec<u8>>,
    /// Responses returned by subsequent receives, oldest first
    pub responses: VecDeque<Vec<u8>>,
    /// Number of times the transport was destroyed
    pub destroyed: usize,
    /// Error injected into the next transmit
    pub fail_transmit: Option<TransportError>,
}

/// Property block counting how many blocks are alive
#[derive(Debug)]
struct Counted {
    props: BusProperties,
    live: Arc<AtomicUsize>,
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Transport layer with scripted responses
#[derive(Debug)]
pub struct MockTransport {
    properties: Option<Counted>,
    wire: Arc<Mutex<Wire>>,
    live: Arc<AtomicUsize>,
}

impl MockTransport {
    /// Create a transport and the handles used to observe it
    pub fn new() -> (Self, Arc<Mutex<Wire>>, Arc<AtomicUsize>) {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let live = Arc::new(AtomicUsize::new(0));
        let transport = Self {
            properties: None,
            wire: Arc::clone(&wire),
            live: Arc::clone(&live),
        };
        (transport, wire, live)
    }

    fn properties(&mut self) -> &mut BusProperties {
        let live = &self.live;
        &mut self
            .properties
            .get_or_insert_with(|| {
                live.fetch_add(1, Ordering::SeqCst);
                Counted {
                    props: BusProperties::default(),
                    live: Arc::clone(live),
                }
            })
            .props
    }
}

impl ProtocolLayer for MockTransport {
    fn layer_id(&self) -> LayerId {
        LayerId::I2C
    }

    fn requires_base(&self) -> bool {
        false
    }

    fn transmit(&mut self, data: &[u8], _base: Base<'_>) -> Result<()> {
        let mut wire = self.wire.lock().unwrap();
        if let Some(err) = wire.fail_transmit.take() {
            return Err(err.into());
        }
        wire.written.push(data.to_vec());
        Ok(())
    }

    fn receive(&mut self, expected_len: usize, _base: Base<'_>) -> Result<Bytes> {
        let response = self
            .wire
            .lock()
            .unwrap()
            .responses
            .pop_front()
            .ok_or(TransportError::Timeout)?;
        assert_eq!(response.len(), expected_len, "scripted response length");
        Ok(Bytes::from(response))
    }

    fn destroy(&mut self) {
        self.wire.lock().unwrap().destroyed += 1;
        self.properties = None;
    }

    fn get_property(&mut self, id: PropertyId) -> Result<Property> {
        self.properties().get(id)
    }

    fn set_property(&mut self, property: Property) -> Result<()> {
        self.properties().set(property)
    }
}
