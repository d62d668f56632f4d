use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::bmp::BmpSizeCheck;
use crate::error::DecodeError;
use crate::format::ImageFormat;
use crate::image::{FileImage, Image};
use crate::limits::Limits;
use crate::sink::{BYTES_PER_PIXEL, PixelSink, Viewport};
use crate::source::ByteSource;

/// Settings applied when a file is opened.
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    pub limits: Limits,
    pub bmp_size_check: BmpSizeCheck,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_bmp_size_check(mut self, policy: BmpSizeCheck) -> Self {
        self.bmp_size_check = policy;
        self
    }
}

/// One-shot decode of an in-memory file into an owned RGBA8 buffer.
///
/// ```
/// use limg::{DecodeRequest, Unstoppable};
///
/// let ppm = b"P6\n1 1\n255\n\xff\x80\x00";
/// let out = DecodeRequest::new(ppm).decode(Unstoppable)?;
/// assert_eq!(out.pixels(), &[255, 128, 0, 255]);
/// # Ok::<(), limg::DecodeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    format: Option<ImageFormat>,
    options: DecodeOptions,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            format: None,
            options: DecodeOptions::default(),
        }
    }

    /// Skip magic-byte sniffing and decode as `format`.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, DecodeError> {
        let image = match self.format {
            Some(format) => {
                Image::from_source(format, ByteSource::from(self.data), &self.options)?
            }
            None => Image::from_bytes(self.data, &self.options)?,
        };
        decode_image(&image, &self.options.limits, &stop)
    }
}

/// Render all of `image` into a fresh buffer whose stride is the image width.
pub fn decode_image(
    image: &dyn FileImage,
    limits: &Limits,
    stop: &dyn Stop,
) -> Result<DecodeOutput, DecodeError> {
    let (width, height) = (image.width(), image.height());
    let bytes = u64::from(width) * u64::from(height) * BYTES_PER_PIXEL as u64;
    limits.check_memory(bytes)?;
    let len = usize::try_from(bytes).map_err(|_| DecodeError::DimensionsTooLarge { width, height })?;

    stop.check()?;
    let mut pixels = vec![0u8; len];
    let mut sink = PixelSink::new(&mut pixels, width);
    image.render(&mut sink, Viewport::new(width, height), stop)?;

    Ok(DecodeOutput {
        pixels,
        width,
        height,
        format: image.format(),
    })
}

/// Decoded RGBA8 image, rows top to bottom with no padding.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl DecodeOutput {
    /// RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// RGBA value at `(x, y)`, if inside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let mut px = [0u8; 4];
        px.copy_from_slice(self.pixels.get(off..off + BYTES_PER_PIXEL)?);
        Some(px)
    }

    /// Reinterpret pixel data as typed RGBA pixels.
    #[cfg(feature = "rgb")]
    pub fn as_pixels(&self) -> &[rgb::RGBA8] {
        self.pixels.as_pixels()
    }

    /// Zero-copy view as an [`imgref::ImgRef`].
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> imgref::ImgRef<'_, rgb::RGBA8> {
        imgref::ImgRef::new(self.as_pixels(), self.width as usize, self.height as usize)
    }

    /// Convert to an [`imgref::ImgVec`].
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::RGBA8> {
        imgref::ImgVec::new(
            self.as_pixels().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}
