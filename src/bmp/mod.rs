//! BMP decoder: file header, eight DIB header generations, uncompressed
//! pixel planes.

mod decode;
mod header;
mod utils;

use alloc::vec::Vec;

use enough::Stop;

pub use header::{BitMasks, BmpHeader, BmpSizeCheck, Compression, DibHeader, DibVersion};

use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::format::ImageFormat;
use crate::image::FileImage;
use crate::sink::{PixelSink, Viewport};
use crate::source::ByteSource;

/// An opened, validated BMP file.
#[derive(Debug, Clone)]
pub struct BmpDecoder {
    source: ByteSource,
    header: BmpHeader,
    palette: Vec<[u8; 4]>,
}

impl BmpDecoder {
    /// Read and validate the BMP at `path` with default options.
    #[cfg(feature = "std")]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, DecodeError> {
        Self::new(ByteSource::load(path)?, &DecodeOptions::default())
    }

    /// Validate the headers of an already loaded file.
    pub fn new(mut source: ByteSource, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let header = header::parse(&mut source, options.bmp_size_check)?;
        options.limits.check(header.width(), header.height())?;
        let palette = header::read_palette(&header, &source)?;
        Ok(Self {
            source,
            header,
            palette,
        })
    }

    pub fn header(&self) -> &BmpHeader {
        &self.header
    }

    /// Palette as RGBA, empty for direct-colour images.
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }
}

impl FileImage for BmpDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn width(&self) -> u32 {
        self.header.width()
    }

    fn height(&self) -> u32 {
        self.header.height()
    }

    fn render(
        &self,
        sink: &mut PixelSink<'_>,
        viewport: Viewport,
        stop: &dyn Stop,
    ) -> Result<(), DecodeError> {
        sink.check_viewport(viewport)?;
        let pixels = self.source.tail(self.header.bitmap_offset as usize)?;
        decode::render(&self.header, &self.palette, pixels, sink, viewport, stop)
    }
}
