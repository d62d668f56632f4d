//! Decoder contract and the format dispatcher.

use enough::Stop;

use crate::bmp::BmpDecoder;
use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::format::ImageFormat;
use crate::gif::GifDecoder;
use crate::pnm::PnmDecoder;
use crate::sink::{PixelSink, Viewport};
use crate::source::ByteSource;

/// A validated image file that can be rendered any number of times.
///
/// Decoders only exist once their headers have parsed successfully, so
/// there is no separate "ready" state to check.
pub trait FileImage {
    fn format(&self) -> ImageFormat;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Write the pixels with `x < viewport.width` and `y < viewport.height`
    /// into `sink` as RGBA.
    ///
    /// The whole pixel stream is decoded even when the viewport is smaller
    /// than the image. On error the sink may be partially written.
    fn render(
        &self,
        sink: &mut PixelSink<'_>,
        viewport: Viewport,
        stop: &dyn Stop,
    ) -> Result<(), DecodeError>;
}

/// Any supported decoder.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Image {
    Bmp(BmpDecoder),
    Gif(GifDecoder),
    Pnm(PnmDecoder),
}

impl Image {
    /// Validate `source` as `format`.
    pub fn from_source(
        format: ImageFormat,
        source: ByteSource,
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        Ok(match format {
            ImageFormat::Bmp => Image::Bmp(BmpDecoder::new(source, options)?),
            ImageFormat::Gif => Image::Gif(GifDecoder::new(source, options)?),
            ImageFormat::Pnm => Image::Pnm(PnmDecoder::new(source, options)?),
        })
    }

    /// Sniff the format from magic bytes, then validate.
    pub fn from_bytes(data: &[u8], options: &DecodeOptions) -> Result<Self, DecodeError> {
        let format = ImageFormat::detect(data)
            .ok_or_else(|| DecodeError::InvalidFormat("unrecognized magic bytes".into()))?;
        Self::from_source(format, ByteSource::from(data), options)
    }

    fn inner(&self) -> &dyn FileImage {
        match self {
            Image::Bmp(d) => d,
            Image::Gif(d) => d,
            Image::Pnm(d) => d,
        }
    }
}

impl FileImage for Image {
    fn format(&self) -> ImageFormat {
        self.inner().format()
    }

    fn width(&self) -> u32 {
        self.inner().width()
    }

    fn height(&self) -> u32 {
        self.inner().height()
    }

    fn render(
        &self,
        sink: &mut PixelSink<'_>,
        viewport: Viewport,
        stop: &dyn Stop,
    ) -> Result<(), DecodeError> {
        self.inner().render(sink, viewport, stop)
    }
}

/// Open `path`, choosing the decoder from its extension.
#[cfg(feature = "std")]
pub fn open(path: impl AsRef<std::path::Path>) -> Result<Image, DecodeError> {
    open_with_options(path, &DecodeOptions::default())
}

/// [`open`] with explicit options.
#[cfg(feature = "std")]
pub fn open_with_options(
    path: impl AsRef<std::path::Path>,
    options: &DecodeOptions,
) -> Result<Image, DecodeError> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        DecodeError::Unsupported(alloc::format!(
            "no decoder for extension of {}",
            path.display()
        ))
    })?;
    log::debug!("opening {} as {}", path.display(), format.name());
    Image::from_source(format, ByteSource::load(path)?, options)
}
