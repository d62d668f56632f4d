//! RGBA output buffer shared by every decoder.

use crate::error::DecodeError;

/// Bytes per sink cell (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// The visible rectangle a `render` call writes, anchored at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Shrink to at most `width` x `height`.
    pub fn clamp_to(self, width: u32, height: u32) -> Self {
        Self {
            width: self.width.min(width),
            height: self.height.min(height),
        }
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

/// Write-only grid of 4-byte RGBA cells.
///
/// Cell `(x, y)` lives at byte offset `(y * stride_width + x) * 4`.
/// The sink is borrowed for one `render` call and never retained.
#[derive(Debug)]
pub struct PixelSink<'a> {
    buf: &'a mut [u8],
    stride_width: u32,
}

impl<'a> PixelSink<'a> {
    /// Wrap `buf`, whose rows are `stride_width` cells apart.
    pub fn new(buf: &'a mut [u8], stride_width: u32) -> Self {
        Self { buf, stride_width }
    }

    pub fn stride_width(&self) -> u32 {
        self.stride_width
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf
    }

    /// Verify the sink can hold `viewport`: the width fits in one stride and
    /// `stride_width * height * 4` bytes are present.
    pub fn check_viewport(&self, viewport: Viewport) -> Result<(), DecodeError> {
        if viewport.width > self.stride_width {
            return Err(DecodeError::InvalidViewport {
                width: viewport.width,
                stride: self.stride_width,
            });
        }
        let needed = (self.stride_width as usize)
            .checked_mul(viewport.height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(DecodeError::BufferTooSmall {
                needed: usize::MAX,
                actual: self.buf.len(),
            })?;
        if self.buf.len() < needed {
            return Err(DecodeError::BufferTooSmall {
                needed,
                actual: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Store one pixel. Cells outside the buffer are ignored; callers clip
    /// to a checked viewport first, so that only happens on misuse.
    #[inline]
    pub fn put(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let offset = (y as usize * self.stride_width as usize + x as usize) * BYTES_PER_PIXEL;
        if let Some(cell) = self.buf.get_mut(offset..offset + BYTES_PER_PIXEL) {
            cell.copy_from_slice(&rgba);
        }
    }

    /// Paint every cell of `viewport` with `rgba`.
    pub fn fill(&mut self, viewport: Viewport, rgba: [u8; 4]) {
        for y in 0..viewport.height {
            for x in 0..viewport.width {
                self.put(x, y, rgba);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_uses_stride_addressing() {
        let mut buf = vec![0u8; 3 * 2 * 4];
        let mut sink = PixelSink::new(&mut buf, 3);
        sink.put(1, 1, [1, 2, 3, 4]);
        let off = (3 + 1) * 4;
        assert_eq!(&buf[off..off + 4], &[1, 2, 3, 4]);
    }

    #[test]
    fn viewport_validation() {
        let mut buf = vec![0u8; 4 * 2 * 4];
        let sink = PixelSink::new(&mut buf, 4);
        assert!(sink.check_viewport(Viewport::new(4, 2)).is_ok());
        assert!(sink.check_viewport(Viewport::new(2, 2)).is_ok());
        assert!(matches!(
            sink.check_viewport(Viewport::new(5, 1)),
            Err(DecodeError::InvalidViewport {
                width: 5,
                stride: 4
            })
        ));
        assert!(matches!(
            sink.check_viewport(Viewport::new(4, 3)),
            Err(DecodeError::BufferTooSmall {
                needed: 48,
                actual: 32
            })
        ));
    }

    #[test]
    fn out_of_buffer_put_is_ignored() {
        let mut buf = vec![0u8; 4];
        let mut sink = PixelSink::new(&mut buf, 1);
        sink.put(0, 5, [9; 4]);
        assert_eq!(buf, [0; 4]);
    }

    #[test]
    fn clamp() {
        assert_eq!(
            Viewport::new(100, 5).clamp_to(10, 10),
            Viewport::new(10, 5)
        );
    }
}
