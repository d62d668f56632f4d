//! BMP pixel-plane decoding for 1, 4, 8, 16, 24 and 32 bits per pixel.

use enough::Stop;

use super::header::{BitMasks, BmpHeader, Compression};
use super::utils::{rgb555, scale_masked};
use crate::bits::{BitOrder, BitReader};
use crate::error::DecodeError;
use crate::raster::{RowLayout, RowOrder, walk_rows};
use crate::sink::{PixelSink, Viewport};

type PixelResult = Result<[u8; 4], DecodeError>;

fn eof() -> DecodeError {
    DecodeError::Truncated("pixel data ended early".into())
}

/// Per-depth sample format, resolved once per render.
enum Plane<'p> {
    Indexed { bits: u32, palette: &'p [[u8; 4]] },
    Rgb555,
    Masked16(BitMasks),
    Bgr24,
    Bgra32,
    Masked32(BitMasks),
}

impl<'p> Plane<'p> {
    fn new(header: &BmpHeader, palette: &'p [[u8; 4]]) -> Result<Self, DecodeError> {
        let bpp = header.bits_per_pixel();
        let masks = header.masks();
        Ok(match (bpp, masks) {
            (1 | 4 | 8, _) => Plane::Indexed {
                bits: u32::from(bpp),
                palette,
            },
            (16, Some(m)) => Plane::Masked16(m),
            (16, None) => Plane::Rgb555,
            (24, _) => Plane::Bgr24,
            (32, Some(m)) if header.compression() == Compression::BitFields && !m.any_rgb_zero() => {
                Plane::Masked32(m)
            }
            (32, _) => Plane::Bgra32,
            _ => {
                return Err(DecodeError::InvalidFormat(alloc::format!(
                    "{bpp} bits per pixel"
                )));
            }
        })
    }

    fn read(&self, r: &mut BitReader<'_>) -> PixelResult {
        match self {
            Plane::Indexed { bits, palette } => {
                let index = r.read_bits(*bits).ok_or_else(eof)?;
                palette.get(index as usize).copied().ok_or_else(|| {
                    DecodeError::OutOfRange(alloc::format!(
                        "palette index {index} >= {} entries",
                        palette.len()
                    ))
                })
            }
            Plane::Rgb555 => r.read_u16_le().map(rgb555).ok_or_else(eof),
            Plane::Masked16(m) => {
                let word = r.read_u16_le().ok_or_else(eof)?;
                Ok(masked(u32::from(word), m))
            }
            Plane::Bgr24 => {
                let b = r.read_u8().ok_or_else(eof)?;
                let g = r.read_u8().ok_or_else(eof)?;
                let red = r.read_u8().ok_or_else(eof)?;
                Ok([red, g, b, 255])
            }
            Plane::Bgra32 => {
                let [b, g, red, a] = r.read_u32_le().ok_or_else(eof)?.to_le_bytes();
                Ok([red, g, b, a])
            }
            Plane::Masked32(m) => {
                let word = r.read_u32_le().ok_or_else(eof)?;
                Ok(masked(word, m))
            }
        }
    }
}

/// Apply the mask ratio per channel; absent colour channels read as 0,
/// absent alpha as opaque.
fn masked(word: u32, m: &BitMasks) -> [u8; 4] {
    [
        scale_masked(word, m.red).unwrap_or(0),
        scale_masked(word, m.green).unwrap_or(0),
        scale_masked(word, m.blue).unwrap_or(0),
        m.alpha
            .and_then(|a| scale_masked(word, a))
            .unwrap_or(255),
    ]
}

/// Walk the pixel data bottom-up into `sink`.
pub(crate) fn render(
    header: &BmpHeader,
    palette: &[[u8; 4]],
    pixels: &[u8],
    sink: &mut PixelSink<'_>,
    viewport: Viewport,
    stop: &dyn Stop,
) -> Result<(), DecodeError> {
    let plane = Plane::new(header, palette)?;
    let layout = RowLayout {
        width: header.width(),
        height: header.height(),
        stride: header.row_stride(),
        order: RowOrder::BottomUp,
        bits: BitOrder::Msb,
    };
    walk_rows(pixels, layout, sink, viewport, stop, |r| plane.read(r))
}
