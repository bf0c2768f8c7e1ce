//! Decoding the 512-byte IDENTIFY DEVICE page.
//!
//! Offsets are in bytes of the page as it sits in memory after a normal
//! sector read, so numeric fields are little-endian and strings come in
//! swapped character pairs.

use core::fmt;

use log::trace;

use crate::block::SECTOR_SIZE;

pub const ATA_ID_SERNO: usize = 2 * 10;
pub const ATA_ID_SERNO_LEN: usize = 20;
pub const ATA_ID_FW_REV: usize = 2 * 23;
pub const ATA_ID_FW_REV_LEN: usize = 8;
pub const ATA_ID_PROD: usize = 2 * 27;
pub const ATA_ID_PROD_LEN: usize = 40;
pub const ATA_ID_CAPABILITY: usize = 2 * 49;
pub const ATA_ID_LBA_CAPACITY: usize = 2 * 60;

// word 49 bit 9, i.e. bit 1 of the high byte
const CAP_LBA: u8 = 0x02;

pub struct IdentifyPage([u8; SECTOR_SIZE]);

impl IdentifyPage {
    pub const fn new(raw: [u8; SECTOR_SIZE]) -> Self {
        Self(raw)
    }

    pub fn as_bytes(&self) -> &[u8; SECTOR_SIZE] {
        &self.0
    }

    pub fn supports_lba(&self) -> bool {
        self.0[ATA_ID_CAPABILITY + 1] & CAP_LBA != 0
    }

    /// Addressable sectors in LBA28 mode.
    pub fn lba_capacity(&self) -> u32 {
        let at = ATA_ID_LBA_CAPACITY;
        u32::from_le_bytes([self.0[at], self.0[at + 1], self.0[at + 2], self.0[at + 3]])
    }

    pub fn model(&self) -> IdString<ATA_ID_PROD_LEN> {
        IdString::decode(&self.0, ATA_ID_PROD)
    }

    pub fn serial(&self) -> IdString<ATA_ID_SERNO_LEN> {
        IdString::decode(&self.0, ATA_ID_SERNO)
    }

    pub fn firmware(&self) -> IdString<ATA_ID_FW_REV_LEN> {
        IdString::decode(&self.0, ATA_ID_FW_REV)
    }

    pub fn dump(&self) {
        for (row, line) in self.0.chunks(16).enumerate() {
            trace!("{:03x}: {}", row * 16, HexLine(line));
        }
    }
}

struct HexLine<'a>(&'a [u8]);

impl fmt::Display for HexLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x} ", byte)?;
        }
        f.write_str("   ")?;
        for &byte in self.0 {
            let c = if (0x20..0x7f).contains(&byte) {
                byte as char
            } else {
                '.'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Fixed-width ASCII field from the IDENTIFY page with trailing blanks removed.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct IdString<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> IdString<N> {
    pub fn decode(page: &[u8], offset: usize) -> Self {
        let mut bytes = [0u8; N];
        for (out, pair) in bytes
            .chunks_exact_mut(2)
            .zip(page[offset..offset + N].chunks_exact(2))
        {
            out[0] = pair[1];
            out[1] = pair[0];
        }

        let mut len = bytes.iter().position(|&b| b == 0).unwrap_or(N);
        while len > 0 && bytes[len - 1] == b' ' {
            len -= 1;
        }
        Self { bytes, len }
    }

    pub fn as_str(&self) -> &str {
        let raw = &self.bytes[..self.len];
        match core::str::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => core::str::from_utf8(&raw[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const N: usize> fmt::Display for IdString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for IdString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}
