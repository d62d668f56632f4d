//! PNM pixel streams: ASCII token scanning and fixed-width binary samples.

use log::warn;

use enough::Stop;

use super::header::{PnmHeader, PnmKind, is_whitespace, skip_whitespace_and_comments};
use crate::bits::{BitOrder, BitReader};
use crate::error::DecodeError;
use crate::raster::{RowLayout, RowOrder, walk_rows};
use crate::sink::{PixelSink, Viewport};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Rescale `v` in `0..=max` to `0..=255`, rounding to nearest.
#[inline]
fn scale(v: u32, max: u32) -> u8 {
    if max == 255 {
        return v as u8;
    }
    ((v * 255 + max / 2) / max) as u8
}

fn gray(v: u8) -> [u8; 4] {
    [v, v, v, 255]
}

fn bit_color(ink: bool) -> [u8; 4] {
    if ink { BLACK } else { WHITE }
}

// ── ASCII scanning ──────────────────────────────────────────────────

/// Cursor over an ASCII pixel stream.
struct AsciiScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> AsciiScanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn next_nonblank(&mut self) -> Result<u8, DecodeError> {
        self.pos = skip_whitespace_and_comments(self.data, self.pos);
        let b = *self
            .data
            .get(self.pos)
            .ok_or_else(|| DecodeError::Truncated("ASCII pixel data ended early".into()))?;
        self.pos += 1;
        Ok(b)
    }

    /// P1: every non-blank byte is one pixel; `1` is ink.
    fn next_bit(&mut self) -> Result<[u8; 4], DecodeError> {
        let b = self.next_nonblank()?;
        Ok(match b {
            b'0' => WHITE,
            b'1' => BLACK,
            other => {
                warn!(
                    "unexpected byte 0x{other:02X} in P1 data at {}, treating as ink",
                    self.pos - 1
                );
                BLACK
            }
        })
    }

    /// P2/P3: one decimal sample, terminated by whitespace, `#` or the end.
    fn next_sample(&mut self, max: u32) -> Result<u32, DecodeError> {
        let first = self.next_nonblank()?;
        let bad = |b: u8, at: usize| {
            DecodeError::InvalidFormat(alloc::format!(
                "unexpected byte 0x{b:02X} in ASCII pixel data at {at}"
            ))
        };
        if !first.is_ascii_digit() {
            return Err(bad(first, self.pos - 1));
        }
        let mut value = u32::from(first - b'0');
        while let Some(&b) = self.data.get(self.pos) {
            if b.is_ascii_digit() {
                value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
                self.pos += 1;
            } else if is_whitespace(b) || b == b'#' {
                break;
            } else {
                return Err(bad(b, self.pos));
            }
        }
        if value > max {
            return Err(DecodeError::OutOfRange(alloc::format!(
                "sample {value} exceeds max value {max}"
            )));
        }
        Ok(value)
    }
}

// ── Binary samples ──────────────────────────────────────────────────

fn read_binary_sample(r: &mut BitReader<'_>, wide: bool, max: u32) -> Result<u8, DecodeError> {
    let v = if wide {
        r.read_u16_be().map(u32::from)
    } else {
        r.read_u8().map(u32::from)
    }
    .ok_or_else(|| DecodeError::Truncated("binary pixel data ended early".into()))?;
    if v > max {
        return Err(DecodeError::OutOfRange(alloc::format!(
            "sample {v} exceeds max value {max}"
        )));
    }
    Ok(scale(v, max))
}

/// Walk the pixel stream top-down into `sink`.
pub(crate) fn render(
    header: &PnmHeader,
    pixels: &[u8],
    sink: &mut PixelSink<'_>,
    viewport: Viewport,
    stop: &dyn Stop,
) -> Result<(), DecodeError> {
    let max = header.max_value.unwrap_or(1);
    let wide = header.sample_bytes() == 2;
    let layout = RowLayout {
        width: header.width,
        height: header.height,
        stride: if header.kind.is_ascii() {
            0
        } else {
            header.binary_row_bytes().unwrap_or(0)
        },
        order: RowOrder::TopDown,
        bits: BitOrder::Msb,
    };

    let mut ascii = AsciiScanner::new(pixels);
    match header.kind {
        PnmKind::AsciiBitmap => walk_rows(pixels, layout, sink, viewport, stop, |_| {
            ascii.next_bit()
        }),
        PnmKind::AsciiGraymap => walk_rows(pixels, layout, sink, viewport, stop, |_| {
            Ok(gray(scale(ascii.next_sample(max)?, max)))
        }),
        PnmKind::AsciiPixmap => walk_rows(pixels, layout, sink, viewport, stop, |_| {
            let r = scale(ascii.next_sample(max)?, max);
            let g = scale(ascii.next_sample(max)?, max);
            let b = scale(ascii.next_sample(max)?, max);
            Ok([r, g, b, 255])
        }),
        PnmKind::BinaryBitmap => walk_rows(pixels, layout, sink, viewport, stop, |r| {
            r.read_bits(1)
                .map(|bit| bit_color(bit == 1))
                .ok_or_else(|| DecodeError::Truncated("binary pixel data ended early".into()))
        }),
        PnmKind::BinaryGraymap => walk_rows(pixels, layout, sink, viewport, stop, |r| {
            Ok(gray(read_binary_sample(r, wide, max)?))
        }),
        PnmKind::BinaryPixmap => walk_rows(pixels, layout, sink, viewport, stop, |r| {
            let red = read_binary_sample(r, wide, max)?;
            let g = read_binary_sample(r, wide, max)?;
            let b = read_binary_sample(r, wide, max)?;
            Ok([red, g, b, 255])
        }),
    }
}
