//! PNM header tokenizer (P1..P6).

use log::debug;

use crate::error::DecodeError;
use crate::raster::row_stride;
use crate::source::ByteSource;

/// Largest sample value the format allows.
pub const MAX_SAMPLE_VALUE: u32 = 65535;

/// The six PNM subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PnmKind {
    /// P1
    AsciiBitmap,
    /// P2
    AsciiGraymap,
    /// P3
    AsciiPixmap,
    /// P4
    BinaryBitmap,
    /// P5
    BinaryGraymap,
    /// P6
    BinaryPixmap,
}

impl PnmKind {
    pub fn from_magic(digit: u8) -> Option<Self> {
        Some(match digit {
            b'1' => Self::AsciiBitmap,
            b'2' => Self::AsciiGraymap,
            b'3' => Self::AsciiPixmap,
            b'4' => Self::BinaryBitmap,
            b'5' => Self::BinaryGraymap,
            b'6' => Self::BinaryPixmap,
            _ => return None,
        })
    }

    pub fn is_ascii(self) -> bool {
        matches!(
            self,
            Self::AsciiBitmap | Self::AsciiGraymap | Self::AsciiPixmap
        )
    }

    pub fn is_bitmap(self) -> bool {
        matches!(self, Self::AsciiBitmap | Self::BinaryBitmap)
    }

    /// Samples per pixel.
    pub fn channels(self) -> u32 {
        match self {
            Self::AsciiPixmap | Self::BinaryPixmap => 3,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PnmHeader {
    pub kind: PnmKind,
    pub width: u32,
    pub height: u32,
    /// Absent for bitmaps.
    pub max_value: Option<u32>,
    /// Offset of the first pixel-data byte.
    pub data_offset: usize,
}

impl PnmHeader {
    /// Bytes per binary sample: 1 below 256, otherwise 2 (big-endian).
    pub fn sample_bytes(&self) -> u32 {
        match self.max_value {
            Some(max) if max > 255 => 2,
            _ => 1,
        }
    }

    /// Bytes per row of binary data. P4 rows are padded to a whole byte as
    /// netpbm writes them, not read as one continuous bit stream.
    pub fn binary_row_bytes(&self) -> Option<usize> {
        let bits = if self.kind.is_bitmap() {
            1
        } else {
            self.kind.channels() * self.sample_bytes() * 8
        };
        row_stride(self.width, bits, 1)
    }
}

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Advance past any mix of whitespace runs and `#`-to-end-of-line comments.
pub(crate) fn skip_whitespace_and_comments(data: &[u8], mut pos: usize) -> usize {
    loop {
        while data.get(pos).is_some_and(|&b| is_whitespace(b)) {
            pos += 1;
        }
        if data.get(pos) == Some(&b'#') {
            while data.get(pos).is_some_and(|&b| b != b'\n') {
                pos += 1;
            }
        } else {
            return pos;
        }
    }
}

/// Read one decimal header token.
fn read_number(data: &[u8], pos: &mut usize, what: &str) -> Result<u32, DecodeError> {
    *pos = skip_whitespace_and_comments(data, *pos);
    let start = *pos;
    let mut value: u32 = 0;
    while let Some(&b) = data.get(*pos).filter(|b| b.is_ascii_digit()) {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or_else(|| DecodeError::InvalidFormat(alloc::format!("PNM {what} overflows")))?;
        *pos += 1;
    }
    if *pos == start {
        return Err(match data.get(*pos) {
            None => DecodeError::Truncated(alloc::format!("PNM header ends before {what}")),
            Some(b) => {
                DecodeError::InvalidFormat(alloc::format!("expected PNM {what}, found 0x{b:02X}"))
            }
        });
    }
    Ok(value)
}

pub(crate) fn parse(source: &ByteSource) -> Result<PnmHeader, DecodeError> {
    let data = source.as_slice();
    let kind = match data {
        [b'P', digit, ..] => PnmKind::from_magic(*digit),
        _ => None,
    }
    .ok_or_else(|| DecodeError::InvalidFormat("missing P1..P6 magic".into()))?;

    let mut pos = 2;
    let width = read_number(data, &mut pos, "width")?;
    let height = read_number(data, &mut pos, "height")?;
    let max_value = if kind.is_bitmap() {
        None
    } else {
        Some(read_number(data, &mut pos, "max value")?)
    };

    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat(alloc::format!(
            "zero PNM dimension {width}x{height}"
        )));
    }
    if let Some(max) = max_value
        && (max == 0 || max > MAX_SAMPLE_VALUE)
    {
        return Err(DecodeError::InvalidFormat(alloc::format!(
            "PNM max value {max} not in 1..={MAX_SAMPLE_VALUE}"
        )));
    }
    if width.checked_mul(height).is_none() {
        return Err(DecodeError::DimensionsTooLarge { width, height });
    }

    // Binary data starts after exactly one whitespace byte.
    if !kind.is_ascii() {
        match data.get(pos) {
            None => {
                return Err(DecodeError::Truncated("PNM header ends without pixel data".into()));
            }
            Some(&b) if is_whitespace(b) => pos += 1,
            Some(&b) => {
                return Err(DecodeError::InvalidFormat(alloc::format!(
                    "expected whitespace after PNM header, found 0x{b:02X}"
                )));
            }
        }
    }

    let header = PnmHeader {
        kind,
        width,
        height,
        max_value,
        data_offset: pos,
    };
    debug!(
        "PNM {kind:?}: {width}x{height}, max value {max_value:?}, data at {pos}"
    );

    if !kind.is_ascii() {
        let needed = header
            .binary_row_bytes()
            .and_then(|row| row.checked_mul(height as usize))
            .ok_or(DecodeError::DimensionsTooLarge { width, height })?;
        let available = data.len() - pos;
        if available < needed {
            return Err(DecodeError::Truncated(alloc::format!(
                "PNM pixel data needs {needed} bytes, found {available}"
            )));
        }
    }
    Ok(header)
}
