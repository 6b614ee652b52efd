//! CRC16 used by the link protocol.
//!
//! CCITT polynomial 0x1021, seed 0x0000, MSB-first, no final xor
//! (the XMODEM parameterization). The `crc` crate computes it table-driven.

use crc::{Crc, CRC_16_XMODEM};

/// Shared table-driven CRC16 engine.
pub static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Checksum of `data`.
pub fn crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}
