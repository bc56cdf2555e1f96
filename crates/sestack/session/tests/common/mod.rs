//! Common test utilities

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sestack_core::{BytesMut, Checksum, TransportError};
use sestack_transport_i2c::I2cBus;

/// Everything the secure element side of a [`ScriptedBus`] observed
#[derive(Debug, Default)]
pub struct BusLog {
    /// Frequencies configured, in order
    pub frequencies: Vec<u32>,
    /// Writes as `(address, bytes)`
    pub writes: Vec<(u16, Vec<u8>)>,
    /// Responses for subsequent reads
    pub responses: VecDeque<Vec<u8>>,
    /// Number of releases
    pub released: usize,
    /// Error returned by every frequency change
    pub frequency_error: Option<TransportError>,
}

/// Bus standing in for a secure element with scripted responses
#[derive(Debug, Clone, Default)]
pub struct ScriptedBus {
    /// Shared log
    pub log: Arc<Mutex<BusLog>>,
}

impl ScriptedBus {
    /// Queue a response for the next read
    pub fn respond(&self, frame: Vec<u8>) {
        self.log.lock().unwrap().responses.push_back(frame);
    }

    /// Make every frequency change fail with `error`
    pub fn fail_frequency(&self, error: TransportError) {
        self.log.lock().unwrap().frequency_error = Some(error);
    }

    /// Bytes written so far
    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.log.lock().unwrap().writes.clone()
    }

    /// Number of times the bus was released
    pub fn released(&self) -> usize {
        self.log.lock().unwrap().released
    }
}

impl I2cBus for ScriptedBus {
    fn set_frequency(&mut self, hz: u32) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();
        if let Some(error) = log.frequency_error.clone() {
            return Err(error);
        }
        log.frequencies.push(hz);
        Ok(())
    }

    fn write(&mut self, address: u16, data: &[u8]) -> Result<(), TransportError> {
        self.log.lock().unwrap().writes.push((address, data.to_vec()));
        Ok(())
    }

    fn read(&mut self, address: u16, buffer: &mut [u8]) -> Result<(), TransportError> {
        let response = self
            .log
            .lock()
            .unwrap()
            .responses
            .pop_front()
            .ok_or(TransportError::Nack { address })?;
        if response.len() != buffer.len() {
            return Err(TransportError::other("unexpected read length"));
        }
        buffer.copy_from_slice(&response);
        Ok(())
    }

    fn release(&mut self) {
        self.log.lock().unwrap().released += 1;
    }
}

/// Append the `checksum` trailer to `payload`
pub fn frame(payload: &[u8], checksum: Checksum) -> Vec<u8> {
    let mut out = BytesMut::from(payload);
    checksum.append(payload, &mut out);
    out.to_vec()
}
