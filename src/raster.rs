//! Row walker shared by the BMP pixel planes and the PNM pixel streams.

use enough::Stop;

use crate::bits::{BitOrder, BitReader};
use crate::error::DecodeError;
use crate::sink::{PixelSink, Viewport};

/// Vertical storage order of rows in the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowOrder {
    /// First stored row is the bottom of the image (BMP).
    BottomUp,
    /// First stored row is the top of the image (PNM).
    TopDown,
}

/// Geometry of a stored pixel plane.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RowLayout {
    pub width: u32,
    pub height: u32,
    /// Bytes from one stored row start to the next, padding included.
    /// Zero for streams whose pixel function tracks its own position.
    pub stride: usize,
    pub order: RowOrder,
    pub bits: BitOrder,
}

/// Size in bytes of one row of `width` samples of `bits_per_pixel` bits,
/// rounded up to a multiple of `align` bytes.
pub(crate) fn row_stride(width: u32, bits_per_pixel: u32, align: usize) -> Option<usize> {
    let bits = u64::from(width).checked_mul(u64::from(bits_per_pixel))?;
    let bytes = usize::try_from(bits.div_ceil(8)).ok()?;
    bytes.checked_next_multiple_of(align)
}

/// Decode every stored pixel in storage order, writing the ones that land
/// inside `viewport`.
///
/// `pixel` reads exactly one pixel from the reader and resolves it to
/// RGBA. Each stored row starts at `row * stride` in `data`, which skips
/// row padding. Pixels outside the viewport are still decoded so that
/// range errors surface no matter how the image is clipped.
pub(crate) fn walk_rows<F>(
    data: &[u8],
    layout: RowLayout,
    sink: &mut PixelSink<'_>,
    viewport: Viewport,
    stop: &dyn Stop,
    mut pixel: F,
) -> Result<(), DecodeError>
where
    F: FnMut(&mut BitReader<'_>) -> Result<[u8; 4], DecodeError>,
{
    let mut reader = BitReader::new(data, layout.bits);
    for row in 0..layout.height {
        if row % 16 == 0 {
            stop.check()?;
        }
        let y = match layout.order {
            RowOrder::BottomUp => layout.height - 1 - row,
            RowOrder::TopDown => row,
        };
        if layout.stride != 0 {
            reader.seek_byte(row as usize * layout.stride);
        }
        for x in 0..layout.width {
            let rgba = pixel(&mut reader)?;
            if viewport.contains(x, y) {
                sink.put(x, y, rgba);
            }
        }
    }
    Ok(())
}
