//! Common test utilities

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use sestack_core::TransportError;
use sestack_transport_i2c::I2cBus;

/// Everything a [`RecordingBus`] observed
#[derive(Debug, Default)]
pub struct BusLog {
    /// Frequencies configured, in order
    pub frequencies: Vec<u32>,
    /// Writes as `(address, bytes)`
    pub writes: Vec<(u16, Vec<u8>)>,
    /// Responses for subsequent reads
    pub reads: VecDeque<Vec<u8>>,
    /// Number of releases
    pub released: usize,
}

/// Bus recording every transfer into a shared [`BusLog`]
#[derive(Debug, Clone, Default)]
pub struct RecordingBus {
    /// Shared log
    pub log: Arc<Mutex<BusLog>>,
}

impl RecordingBus {
    /// Queue a response for the next read
    pub fn respond(&self, bytes: &[u8]) {
        self.log.lock().unwrap().reads.push_back(bytes.to_vec());
    }

    /// Bytes written so far
    pub fn written(&self) -> Vec<(u16, Vec<u8>)> {
        self.log.lock().unwrap().writes.clone()
    }
}

impl I2cBus for RecordingBus {
    fn set_frequency(&mut self, hz: u32) -> Result<(), TransportError> {
        self.log.lock().unwrap().frequencies.push(hz);
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
            .reads
            .pop_front()
            .ok_or(TransportError::Nack { address })?;
        if response.len() != buffer.len() {
            return Err(TransportError::other("short read"));
        }
        buffer.copy_from_slice(&response);
        Ok(())
    }

    fn release(&mut self) {
        self.log.lock().unwrap().released += 1;
    }
}
