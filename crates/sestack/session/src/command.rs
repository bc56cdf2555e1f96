//! Command contract consumed by [`Session::execute`](crate::Session::execute)
//!
//! A command library built on top of a session implements [`Command`] for each
//! request it supports. [`CommandApdu`] covers the byte layout of ISO/IEC
//! 7816-4 short commands and [`Select`] is the one command every application
//! starts with.

use bytes::{BufMut, Bytes, BytesMut};
use sestack_core::{Error, LayerId, Operation, Result};

use crate::apdu::STATUS_WORD_LEN;

/// Longest application identifier accepted by SELECT
pub const MAX_AID_LEN: usize = 16;

/// Request/response pair exchanged over a session
pub trait Command {
    /// Parsed response type
    type Response;

    /// Encode the request
    fn to_bytes(&self) -> Bytes;

    /// Length of the response seen above the framing layer
    ///
    /// Includes the status word when the session carries an APDU layer.
    fn expected_len(&self) -> usize;

    /// Parse the response payload returned by the session
    fn parse(&self, payload: Bytes) -> Result<Self::Response>;
}

/// Short command APDU: `CLA INS P1 P2 [Lc data] [Le]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandApdu {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data (optional)
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<u8>,
}

impl CommandApdu {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: u8) -> Self {
        self.le = Some(le);
        self
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        4 + self.data.as_ref().map_or(0, |data| 1 + data.len()) + usize::from(self.le.is_some())
    }

    /// Number of response bytes announced by Le, `00` standing for 256
    pub fn response_data_len(&self) -> usize {
        match self.le {
            Some(0) => 256,
            Some(le) => usize::from(le),
            None => 0,
        }
    }
}

impl Command for CommandApdu {
    type Response = Bytes;

    fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(data) = &self.data {
            buffer.put_u8(data.len() as u8);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        buffer.freeze()
    }

    fn expected_len(&self) -> usize {
        self.response_data_len() + STATUS_WORD_LEN
    }

    fn parse(&self, payload: Bytes) -> Result<Bytes> {
        Ok(payload)
    }
}

/// SELECT by application identifier, `00 A4 04 00 Lc AID 00`
///
/// Returns the raw file control information sent back by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    aid: Bytes,
    fci_len: usize,
}

impl Select {
    /// Select the application `aid`, expecting `fci_len` bytes of response data
    pub fn new<T: Into<Bytes>>(aid: T, fci_len: usize) -> Result<Self> {
        let aid = aid.into();
        if aid.is_empty() || aid.len() > MAX_AID_LEN {
            return Err(Error::illegal_argument(
                LayerId::APDU,
                Operation::Transmit,
                "application identifier must be 1 to 16 bytes",
            ));
        }
        Ok(Self { aid, fci_len })
    }

    /// Application identifier to select
    pub const fn aid(&self) -> &Bytes {
        &self.aid
    }

    fn apdu(&self) -> CommandApdu {
        CommandApdu::new(0x00, 0xA4, 0x04, 0x00)
            .with_data(self.aid.clone())
            .with_le(0x00)
    }
}

impl Command for Select {
    type Response = Bytes;

    fn to_bytes(&self) -> Bytes {
        self.apdu().to_bytes()
    }

    fn expected_len(&self) -> usize {
        self.fci_len + STATUS_WORD_LEN
    }

    fn parse(&self, payload: Bytes) -> Result<Bytes> {
        Ok(payload)
    }
}
