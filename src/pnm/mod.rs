//! PNM decoder for the ASCII (P1, P2, P3) and binary (P4, P5, P6) bitmap,
//! graymap and pixmap variants, 8 and 16 bits per sample.

mod decode;
mod header;

use enough::Stop;

pub use header::{MAX_SAMPLE_VALUE, PnmHeader, PnmKind};

use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::format::ImageFormat;
use crate::image::FileImage;
use crate::sink::{PixelSink, Viewport};
use crate::source::ByteSource;

/// An opened, validated PNM file.
#[derive(Debug, Clone)]
pub struct PnmDecoder {
    source: ByteSource,
    header: PnmHeader,
}

impl PnmDecoder {
    /// Read and validate the PNM at `path` with default options.
    #[cfg(feature = "std")]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, DecodeError> {
        Self::new(ByteSource::load(path)?, &DecodeOptions::default())
    }

    pub fn new(source: ByteSource, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let header = header::parse(&source)?;
        options.limits.check(header.width, header.height)?;
        Ok(Self { source, header })
    }

    pub fn header(&self) -> &PnmHeader {
        &self.header
    }
}

impl FileImage for PnmDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Pnm
    }

    fn width(&self) -> u32 {
        self.header.width
    }

    fn height(&self) -> u32 {
        self.header.height
    }

    fn render(
        &self,
        sink: &mut PixelSink<'_>,
        viewport: Viewport,
        stop: &dyn Stop,
    ) -> Result<(), DecodeError> {
        sink.check_viewport(viewport)?;
        let pixels = self.source.tail(self.header.data_offset)?;
        decode::render(&self.header, pixels, sink, viewport, stop)
    }
}
