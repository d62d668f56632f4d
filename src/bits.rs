//! Bit-granular cursor over a byte slice.
//!
//! Single choke point for every sub-byte read in the crate: BMP 1/4-bit
//! planes, PNM P4 rows, and LZW codes all go through [`BitReader`], so
//! out-of-bounds reads surface as `None` rather than panics.

/// Order in which bits are pulled out of each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Bit 7 first; earlier bits are more significant in the result.
    Msb,
    /// Bit 0 first; earlier bits are less significant in the result.
    /// This is the GIF code packing.
    Lsb,
}

#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute position in bits.
    pos: usize,
    order: BitOrder,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8], order: BitOrder) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }

    pub fn order(&self) -> BitOrder {
        self.order
    }

    pub fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.pos)
    }

    /// Byte index of the next unread bit (rounded down).
    pub fn byte_position(&self) -> usize {
        self.pos / 8
    }

    /// Skip to the start of the next byte, if not already there.
    pub fn byte_align(&mut self) {
        self.pos = self.pos.div_ceil(8) * 8;
    }

    /// Jump to the start of byte `offset`. Positions past the end are
    /// allowed; subsequent reads just fail.
    pub fn seek_byte(&mut self, offset: usize) {
        self.pos = offset.saturating_mul(8);
    }

    /// Read `n` bits (0..=32). Returns `None` without consuming anything if
    /// fewer than `n` bits remain or `n > 32`.
    pub fn read_bits(&mut self, n: u32) -> Option<u32> {
        if n > 32 || self.bits_remaining() < n as usize {
            return None;
        }
        let mut value: u32 = 0;
        for i in 0..n {
            let byte = self.data[self.pos / 8];
            let shift = self.pos % 8;
            match self.order {
                BitOrder::Msb => {
                    let bit = (byte >> (7 - shift)) & 1;
                    value = (value << 1) | u32::from(bit);
                }
                BitOrder::Lsb => {
                    let bit = (byte >> shift) & 1;
                    value |= u32::from(bit) << i;
                }
            }
            self.pos += 1;
        }
        Some(value)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_bits(8).map(|v| v as u8)
    }

    pub fn read_u16_le(&mut self) -> Option<u16> {
        let lo = self.read_u8()?;
        let hi = self.read_u8()?;
        Some(u16::from_le_bytes([lo, hi]))
    }

    pub fn read_u16_be(&mut self) -> Option<u16> {
        let hi = self.read_u8()?;
        let lo = self.read_u8()?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    pub fn read_u32_le(&mut self) -> Option<u32> {
        let mut b = [0u8; 4];
        for slot in &mut b {
            *slot = self.read_u8()?;
        }
        Some(u32::from_le_bytes(b))
    }
}
