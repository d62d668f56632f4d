//! GIF container parsing: signature, logical screen, image descriptors,
//! extensions and sub-block chains.

use alloc::vec::Vec;
use core::ops::Range;

use log::{debug, trace};

use crate::error::DecodeError;
use crate::source::ByteSource;

const IMAGE_SEPARATOR: u8 = b',';
const EXTENSION_INTRODUCER: u8 = b'!';
const TRAILER: u8 = b';';
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const LOGICAL_SCREEN_END: usize = 13;

/// Version string after the `GIF` signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GifVersion {
    V87a,
    V89a,
    /// Any other digit-digit-letter version, accepted as-is.
    Unknown([u8; 3]),
}

impl GifVersion {
    fn parse(v: [u8; 3]) -> Option<Self> {
        match &v {
            b"87a" => Some(Self::V87a),
            b"89a" => Some(Self::V89a),
            [a, b, c] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_alphabetic() => {
                Some(Self::Unknown(v))
            }
            _ => None,
        }
    }
}

/// The canvas every frame is placed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalScreen {
    pub width: u16,
    pub height: u16,
    pub background_index: u8,
    /// Raw aspect byte; 0 means no ratio given.
    pub aspect_byte: u8,
    /// Bits per primary colour in the source image, 1..=8.
    pub color_resolution: u8,
    /// RGB triples, present when the screen flags say so.
    pub global_color_table: Option<Vec<[u8; 3]>>,
}

impl LogicalScreen {
    /// Pixel width / height, `(aspect + 15) / 64`, if given.
    pub fn pixel_aspect_ratio(&self) -> Option<f32> {
        (self.aspect_byte != 0).then(|| (f32::from(self.aspect_byte) + 15.0) / 64.0)
    }
}

/// One image descriptor and where its compressed data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifFrame {
    pub left: u16,
    pub top: u16,
    pub width: u16,
    pub height: u16,
    pub interlaced: bool,
    pub local_color_table: Option<Vec<[u8; 3]>>,
    /// From a preceding graphic control extension.
    pub transparent_index: Option<u8>,
    pub min_code_size: u8,
    /// Payload ranges of the data sub-blocks, in order.
    blocks: Vec<Range<usize>>,
}

impl GifFrame {
    /// Concatenated LZW sub-block payloads.
    pub(crate) fn lzw_data(&self, source: &ByteSource) -> Vec<u8> {
        let data = source.as_slice();
        let total = self.blocks.iter().map(|r| r.len()).sum();
        let mut out = Vec::with_capacity(total);
        for r in &self.blocks {
            out.extend_from_slice(&data[r.clone()]);
        }
        out
    }

    pub fn data_blocks(&self) -> usize {
        self.blocks.len()
    }
}

/// Everything the container tells us, before any decompression.
#[derive(Debug, Clone)]
pub(crate) struct GifStructure {
    pub version: GifVersion,
    pub screen: LogicalScreen,
    pub frames: Vec<GifFrame>,
}

fn truncated(what: &str, at: usize) -> DecodeError {
    DecodeError::Truncated(alloc::format!("{what} at offset {at} runs past end of file"))
}

fn read_color_table(
    source: &ByteSource,
    at: usize,
    colors: usize,
    what: &str,
) -> Result<Vec<[u8; 3]>, DecodeError> {
    let bytes = source
        .slice(at, colors * 3)
        .map_err(|_| truncated(what, at))?;
    Ok(bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
}

/// Table size in colours from the low three flag bits.
fn table_size(flags: u8) -> usize {
    1 << ((flags & 0x07) + 1)
}

/// Walk a sub-block chain starting at `at`. Returns the payload ranges and
/// the offset just past the zero-length terminator.
fn sub_blocks(source: &ByteSource, mut at: usize) -> Result<(Vec<Range<usize>>, usize), DecodeError> {
    let mut blocks = Vec::new();
    loop {
        let len = source
            .u8_at(at)
            .map_err(|_| truncated("sub-block chain", at))? as usize;
        at += 1;
        if len == 0 {
            return Ok((blocks, at));
        }
        if at + len > source.len() {
            return Err(truncated("sub-block", at - 1));
        }
        trace!("sub-block of {len} bytes at {at}");
        blocks.push(at..at + len);
        at += len;
    }
}

pub(crate) fn parse(source: &ByteSource) -> Result<GifStructure, DecodeError> {
    if source.slice(0, 3).ok() != Some(b"GIF".as_slice()) {
        return Err(DecodeError::InvalidFormat("missing GIF signature".into()));
    }
    let raw_version = source
        .slice(3, 3)
        .map_err(|_| DecodeError::InvalidFormat("missing GIF version".into()))?;
    let raw_version = [raw_version[0], raw_version[1], raw_version[2]];
    let version = GifVersion::parse(raw_version).ok_or_else(|| {
        DecodeError::InvalidFormat(alloc::format!("bad GIF version {raw_version:?}"))
    })?;

    if source.as_slice().last() != Some(&TRAILER) {
        return Err(DecodeError::InvalidFormat(
            "GIF trailer ';' is not the last byte".into(),
        ));
    }

    let width = source.u16_le_at(6)?;
    let height = source.u16_le_at(8)?;
    let flags = source.u8_at(10)?;
    let background = source.u8_at(11)?;
    let aspect_byte = source.u8_at(12)?;
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat(alloc::format!(
            "zero logical screen {width}x{height}"
        )));
    }
    let has_global = flags & 0x80 != 0;
    let color_resolution = ((flags >> 4) & 0x07) + 1;
    debug!(
        "GIF {version:?}: screen {width}x{height}, global table {has_global}, resolution {color_resolution}"
    );

    let mut at = LOGICAL_SCREEN_END;
    let global_color_table = if has_global {
        let colors = table_size(flags);
        let table = read_color_table(source, at, colors, "global colour table")?;
        at += colors * 3;
        Some(table)
    } else {
        None
    };
    let screen = LogicalScreen {
        width,
        height,
        background_index: if has_global { background } else { 0 },
        aspect_byte,
        color_resolution,
        global_color_table,
    };

    let mut frames = Vec::new();
    let mut transparent_index = None;
    loop {
        let separator = source
            .u8_at(at)
            .map_err(|_| truncated("block separator", at))?;
        match separator {
            IMAGE_SEPARATOR => {
                let (frame, next) = parse_frame(source, at, transparent_index.take())?;
                frames.push(frame);
                at = next;
            }
            EXTENSION_INTRODUCER => {
                let label = source
                    .u8_at(at + 1)
                    .map_err(|_| truncated("extension label", at))?;
                let (blocks, next) = sub_blocks(source, at + 2)?;
                if label == GRAPHIC_CONTROL_LABEL
                    && let Some(first) = blocks.first()
                    && first.len() >= 4
                {
                    let packed = source.u8_at(first.start)?;
                    let index = source.u8_at(first.start + 3)?;
                    transparent_index = (packed & 0x01 != 0).then_some(index);
                    trace!("graphic control: transparent {transparent_index:?}");
                } else {
                    trace!("skipping extension 0x{label:02X}");
                }
                at = next;
            }
            TRAILER => break,
            other => {
                return Err(DecodeError::InvalidFormat(alloc::format!(
                    "unexpected block separator 0x{other:02X} at offset {at}"
                )));
            }
        }
    }

    if frames.is_empty() {
        return Err(DecodeError::InvalidFormat("GIF has no image".into()));
    }
    Ok(GifStructure {
        version,
        screen,
        frames,
    })
}

/// Parse the descriptor starting at the `,` at `at`.
fn parse_frame(
    source: &ByteSource,
    at: usize,
    transparent_index: Option<u8>,
) -> Result<(GifFrame, usize), DecodeError> {
    let fields = source
        .slice(at + 1, 9)
        .map_err(|_| truncated("image descriptor", at))?;
    let le = |i: usize| u16::from_le_bytes([fields[i], fields[i + 1]]);
    let (left, top, width, height) = (le(0), le(2), le(4), le(6));
    let flags = fields[8];
    let interlaced = flags & 0x40 != 0;

    let mut next = at + 10;
    let local_color_table = if flags & 0x80 != 0 {
        let colors = table_size(flags);
        let table = read_color_table(source, next, colors, "local colour table")?;
        next += colors * 3;
        Some(table)
    } else {
        None
    };
    let min_code_size = source
        .u8_at(next)
        .map_err(|_| truncated("LZW code size", next))?;
    let (blocks, next) = sub_blocks(source, next + 1)?;

    debug!(
        "frame at {at}: {width}x{height}+{left}+{top}, interlaced {interlaced}, local table {}, code size {min_code_size}, {} blocks",
        local_color_table.is_some(),
        blocks.len()
    );

    Ok((
        GifFrame {
            left,
            top,
            width,
            height,
            interlaced,
            local_color_table,
            transparent_index,
            min_code_size,
            blocks,
        },
        next,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gif(body: &[u8]) -> ByteSource {
        let mut d = b"GIF89a".to_vec();
        d.extend_from_slice(&[2, 0, 1, 0, 0x80, 0, 0]);
        d.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        d.extend_from_slice(body);
        d.push(b';');
        ByteSource::from_vec(d)
    }

    const FRAME: [u8; 14] = [b',', 0, 0, 0, 0, 2, 0, 1, 0, 0, 2, 2, 0x44, 0x01];

    #[test]
    fn versions() {
        assert_eq!(GifVersion::parse(*b"87a"), Some(GifVersion::V87a));
        assert_eq!(GifVersion::parse(*b"89a"), Some(GifVersion::V89a));
        assert_eq!(GifVersion::parse(*b"90b"), Some(GifVersion::Unknown(*b"90b")));
        assert_eq!(GifVersion::parse(*b"8a9"), None);
    }

    #[test]
    fn parses_screen_and_frame() {
        let mut body = FRAME.to_vec();
        body.push(0);
        let s = parse(&gif(&body)).unwrap();
        assert_eq!(s.version, GifVersion::V89a);
        assert_eq!((s.screen.width, s.screen.height), (2, 1));
        assert_eq!(s.screen.global_color_table.as_ref().map(Vec::len), Some(2));
        assert_eq!(s.frames.len(), 1);
        let f = &s.frames[0];
        assert_eq!((f.width, f.height, f.min_code_size), (2, 1, 2));
        assert_eq!(f.data_blocks(), 1);
    }

    #[test]
    fn graphic_control_sets_transparency() {
        let mut body = vec![b'!', 0xF9, 4, 0x01, 0, 0, 1, 0];
        body.extend_from_slice(&FRAME);
        body.push(0);
        let s = parse(&gif(&body)).unwrap();
        assert_eq!(s.frames[0].transparent_index, Some(1));
    }

    #[test]
    fn other_extensions_are_skipped() {
        let mut body = vec![b'!', 0xFE, 3, b'h', b'i', b'!', 0];
        body.extend_from_slice(&FRAME);
        body.push(0);
        let s = parse(&gif(&body)).unwrap();
        assert_eq!(s.frames.len(), 1);
        assert_eq!(s.frames[0].transparent_index, None);
    }

    #[test]
    fn unknown_separator_is_format_error() {
        let err = parse(&gif(&[0x00])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat(_)));
    }

    #[test]
    fn missing_trailer() {
        let mut d = b"GIF89a".to_vec();
        d.extend_from_slice(&[1, 0, 1, 0, 0, 0, 0]);
        let err = parse(&ByteSource::from_vec(d)).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat(_)));
    }

    #[test]
    fn no_frames() {
        let err = parse(&gif(&[])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFormat(_)));
    }

    #[test]
    fn runaway_sub_block() {
        let mut body = FRAME.to_vec();
        body[11] = 40;
        let err = parse(&gif(&body)).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated(_)));
    }
}
