//! Frame integrity checksums
//!
//! Four algorithms used to protect frames on the wire. x.25 and MCRF4xx share
//! one reflected loop; the G+D T=1 routine is a separate bit-serial variant.

use bytes::{BufMut, BytesMut};

/// Reflected CCITT polynomial (x^16 + x^12 + x^5 + 1)
const POLY_REFLECTED: u16 = 0x8408;

/// Feedback constant of the G+D T=1 routine
const POLY_T1GD: u32 = 0x1_0810;

/// Calculates 16 bit CRC according to CCITT x.25
pub fn crc16_ccitt_x25(data: &[u8]) -> u16 {
    crc16_reflected(data) ^ 0xFFFF
}

/// Calculates 16 bit CRC according to MCRF4xx
pub fn crc16_mcrf4xx(data: &[u8]) -> u16 {
    crc16_reflected(data)
}

fn crc16_reflected(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLY_REFLECTED
            } else {
                crc >> 1
            };
        }
    }
    crc
}

/// Calculates 16 bit CRC according to the G+D T=1 protocol
///
/// The register is 16 bits wide, so bit 16 of the feedback constant is
/// dropped when it is XORed in, before the register is shifted.
pub fn crc16_t1gd(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            if (crc ^ u16::from(b)) & 0x01 != 0 {
                crc = (u32::from(crc) ^ POLY_T1GD) as u16;
            }
            crc >>= 1;
            b >>= 1;
        }
    }
    crc
}

/// Calculates 8 bit Longitudinal Redundancy Code
pub fn lrc8(data: &[u8]) -> u8 {
    data.iter().fold(0x00, |lrc, &byte| lrc ^ byte)
}

/// Integrity code appended by a framing layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Checksum {
    /// CRC16 CCITT x.25, two byte trailer
    #[default]
    #[display("CRC16/X.25")]
    Crc16X25,
    /// CRC16 MCRF4xx, two byte trailer
    #[display("CRC16/MCRF4XX")]
    Crc16Mcrf4xx,
    /// CRC16 G+D T=1, two byte trailer
    #[display("CRC16/T1-GD")]
    Crc16T1Gd,
    /// XOR LRC, one byte trailer
    #[display("LRC8")]
    Lrc8,
}

impl Checksum {
    /// Length of the trailer in bytes
    pub const fn trailer_len(&self) -> usize {
        match self {
            Self::Lrc8 => 1,
            _ => 2,
        }
    }

    /// Compute the integrity code over `data`
    pub fn compute(&self, data: &[u8]) -> u16 {
        match self {
            Self::Crc16X25 => crc16_ccitt_x25(data),
            Self::Crc16Mcrf4xx => crc16_mcrf4xx(data),
            Self::Crc16T1Gd => crc16_t1gd(data),
            Self::Lrc8 => u16::from(lrc8(data)),
        }
    }

    /// Append the integrity code over `data` to `out`
    ///
    /// CRC16 trailers are written most significant byte first.
    pub fn append(&self, data: &[u8], out: &mut BytesMut) {
        let code = self.compute(data);
        match self {
            Self::Lrc8 => out.put_u8(code as u8),
            _ => out.put_u16(code),
        }
    }

    /// Decode a trailer previously written by [`Self::append`]
    ///
    /// Returns `None` when `trailer` does not have the trailer length.
    pub fn read(&self, trailer: &[u8]) -> Option<u16> {
        match (self, trailer) {
            (Self::Lrc8, [code]) => Some(u16::from(*code)),
            (Self::Lrc8, _) => None,
            (_, [hi, lo]) => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }
}
