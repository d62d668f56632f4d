//! GIF decoder. The container is fully scanned at open; only the first
//! frame is decompressed and rendered.

mod header;

use alloc::vec::Vec;

use enough::Stop;

pub use header::{GifFrame, GifVersion, LogicalScreen};

use crate::bits::BitOrder;
use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::format::ImageFormat;
use crate::image::FileImage;
use crate::lzw::LzwDecoder;
use crate::sink::{PixelSink, Viewport};
use crate::source::ByteSource;

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// An opened, validated GIF file.
#[derive(Debug, Clone)]
pub struct GifDecoder {
    source: ByteSource,
    version: GifVersion,
    screen: LogicalScreen,
    frames: Vec<GifFrame>,
    /// RGBA colour table of the first frame, transparency applied.
    palette: Vec<[u8; 4]>,
    lzw: LzwDecoder,
}

impl GifDecoder {
    /// Read and validate the GIF at `path` with default options.
    #[cfg(feature = "std")]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, DecodeError> {
        Self::new(ByteSource::load(path)?, &DecodeOptions::default())
    }

    pub fn new(source: ByteSource, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let header::GifStructure {
            version,
            screen,
            frames,
        } = header::parse(&source)?;
        options
            .limits
            .check(u32::from(screen.width), u32::from(screen.height))?;

        let first = frames
            .first()
            .ok_or_else(|| DecodeError::InvalidFormat("GIF has no image".into()))?;
        if first.interlaced {
            return Err(DecodeError::Unsupported("interlaced GIF frame".into()));
        }
        let table = first
            .local_color_table
            .as_ref()
            .or(screen.global_color_table.as_ref())
            .ok_or_else(|| DecodeError::InvalidFormat("first frame has no colour table".into()))?;
        let palette = table
            .iter()
            .enumerate()
            .map(|(i, &[r, g, b])| {
                if first.transparent_index == Some(i as u8) {
                    TRANSPARENT
                } else {
                    [r, g, b, 255]
                }
            })
            .collect();
        let lzw = LzwDecoder::new(first.min_code_size, BitOrder::Lsb)?
            .with_max_output(usize::from(first.width) * usize::from(first.height));
        if frames.len() > 1 {
            log::debug!("GIF has {} frames, rendering the first", frames.len());
        }

        Ok(Self {
            source,
            version,
            screen,
            frames,
            palette,
            lzw,
        })
    }

    pub fn version(&self) -> GifVersion {
        self.version
    }

    pub fn logical_screen(&self) -> &LogicalScreen {
        &self.screen
    }

    /// Every image descriptor found while scanning.
    pub fn frames(&self) -> &[GifFrame] {
        &self.frames
    }
}

impl FileImage for GifDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn width(&self) -> u32 {
        u32::from(self.screen.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.screen.height)
    }

    fn render(
        &self,
        sink: &mut PixelSink<'_>,
        viewport: Viewport,
        stop: &dyn Stop,
    ) -> Result<(), DecodeError> {
        sink.check_viewport(viewport)?;
        let Some(frame) = self.frames.first() else {
            return Ok(());
        };
        let canvas = viewport.clamp_to(self.width(), self.height());
        sink.fill(canvas, TRANSPARENT);

        let indices = self.lzw.decode(&frame.lzw_data(&self.source))?;
        stop.check()?;
        let frame_width = usize::from(frame.width);
        if frame_width == 0 {
            return Ok(());
        }

        for (row, chunk) in indices.chunks(frame_width).enumerate() {
            if row % 16 == 0 {
                stop.check()?;
            }
            let y = u32::from(frame.top) + row as u32;
            for (col, &index) in chunk.iter().enumerate() {
                let rgba = self.palette.get(usize::from(index)).copied().ok_or_else(|| {
                    DecodeError::OutOfRange(alloc::format!(
                        "colour index {index} >= {} table entries",
                        self.palette.len()
                    ))
                })?;
                let x = u32::from(frame.left) + col as u32;
                if canvas.contains(x, y) {
                    sink.put(x, y, rgba);
                }
            }
        }
        Ok(())
    }
}
