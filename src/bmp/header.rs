//! BMP file header and DIB header parsing.

use alloc::vec::Vec;

use log::{debug, warn};

use crate::error::DecodeError;
use crate::raster::row_stride;
use crate::source::ByteSource;

pub(crate) const FILE_HEADER_SIZE: u32 = 14;
/// Smallest file that can hold a file header plus a core DIB header.
const MIN_FILE_SIZE: u32 = FILE_HEADER_SIZE + 12;
/// File offset of the RGB masks embedded in V2+ info headers.
const EMBEDDED_MASK_OFFSET: usize = 54;
/// Palette entries are BGRx for every header generation.
const PALETTE_ENTRY_SIZE: u32 = 4;

// ── Size-check policy ───────────────────────────────────────────────

/// How the declared file size at offset 2 is reconciled with the bytes
/// actually read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BmpSizeCheck {
    /// Trust the header. The declared size must be at least a minimal BMP
    /// and no larger than the data; bytes past it are ignored.
    #[default]
    Declared,
    /// Trust the data. The header field is logged and otherwise ignored.
    Actual,
}

// ── DIB header variants ─────────────────────────────────────────────

/// DIB header generation, selected by the header's size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DibVersion {
    /// BITMAPCOREHEADER (12 bytes).
    Core,
    /// Truncated OS/2 2.x header (16 bytes).
    Os2Short,
    /// OS/2 2.x BITMAPINFOHEADER2 (64 bytes).
    Os2,
    /// BITMAPINFOHEADER (40 bytes).
    Info,
    /// BITMAPV2INFOHEADER (52 bytes, RGB masks).
    V2,
    /// BITMAPV3INFOHEADER (56 bytes, RGBA masks).
    V3,
    /// BITMAPV4HEADER (108 bytes).
    V4,
    /// BITMAPV5HEADER (124 bytes).
    V5,
}

impl DibVersion {
    pub fn from_size(size: u32) -> Option<Self> {
        Some(match size {
            12 => Self::Core,
            16 => Self::Os2Short,
            64 => Self::Os2,
            40 => Self::Info,
            52 => Self::V2,
            56 => Self::V3,
            108 => Self::V4,
            124 => Self::V5,
            _ => return None,
        })
    }

    pub fn size(self) -> u32 {
        match self {
            Self::Core => 12,
            Self::Os2Short => 16,
            Self::Os2 => 64,
            Self::Info => 40,
            Self::V2 => 52,
            Self::V3 => 56,
            Self::V4 => 108,
            Self::V5 => 124,
        }
    }

    /// Headers parsed with the core rules: depth {1,4,8,24}, no compression.
    pub fn is_core_family(self) -> bool {
        matches!(self, Self::Core | Self::Os2Short | Self::Os2)
    }

    /// Whether a fourth (alpha) bit mask accompanies BITFIELDS data.
    pub fn has_alpha_mask(self) -> bool {
        self.size() >= 56 && !self.is_core_family()
    }

    /// Info headers large enough to hold the mask slot at offset 54.
    fn embeds_masks(self) -> bool {
        self.size() >= 52 && !self.is_core_family()
    }
}

// ── Compression ─────────────────────────────────────────────────────

/// Compression method field of an info header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// BI_RGB: direct or palettized samples.
    None,
    Rle8,
    Rle4,
    /// BI_BITFIELDS (3).
    BitFields,
    Jpeg,
    Png,
    /// BI_CMYK (11), decoded like `None`.
    Cmyk,
    CmykRle8,
    CmykRle4,
}

impl Compression {
    pub fn from_u32(v: u32) -> Option<Self> {
        Some(match v {
            0 => Self::None,
            1 => Self::Rle8,
            2 => Self::Rle4,
            3 => Self::BitFields,
            4 => Self::Jpeg,
            5 => Self::Png,
            11 => Self::Cmyk,
            12 => Self::CmykRle8,
            13 => Self::CmykRle4,
            _ => return None,
        })
    }

    /// Uncompressed sample layout (direct, palettized, or masked).
    pub fn is_uncompressed(self) -> bool {
        matches!(self, Self::None | Self::Cmyk | Self::BitFields)
    }
}

// ── Bit masks ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitMasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
    /// `None` when the header generation carries no alpha mask.
    pub alpha: Option<u32>,
}

impl BitMasks {
    /// Any colour mask zero: 32-bit data is then read as plain BGRA.
    pub fn any_rgb_zero(&self) -> bool {
        self.red == 0 || self.green == 0 || self.blue == 0
    }
}

// ── Parsed header ───────────────────────────────────────────────────

/// Per-variant DIB header contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DibHeader {
    /// Core and OS/2 headers: geometry and depth only.
    Core {
        version: DibVersion,
        width: u32,
        height: u32,
        bits_per_pixel: u16,
    },
    /// BITMAPINFOHEADER and its V2..V5 extensions.
    Info {
        version: DibVersion,
        width: u32,
        /// Absolute value of the stored height.
        height: u32,
        /// The stored height was negative. Rows are still decoded bottom-up.
        top_down: bool,
        bits_per_pixel: u16,
        compression: Compression,
        image_size: u32,
        x_pixels_per_meter: i32,
        y_pixels_per_meter: i32,
        colors_used: u32,
        masks: Option<BitMasks>,
    },
}

/// Validated BMP headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    /// File size the decoder works with, after the size-check policy.
    pub file_size: u32,
    pub bitmap_offset: u32,
    pub dib: DibHeader,
    /// Number of usable palette entries (0 for direct-colour images).
    pub palette_len: u32,
}

impl BmpHeader {
    pub fn version(&self) -> DibVersion {
        match self.dib {
            DibHeader::Core { version, .. } | DibHeader::Info { version, .. } => version,
        }
    }

    pub fn width(&self) -> u32 {
        match self.dib {
            DibHeader::Core { width, .. } | DibHeader::Info { width, .. } => width,
        }
    }

    pub fn height(&self) -> u32 {
        match self.dib {
            DibHeader::Core { height, .. } | DibHeader::Info { height, .. } => height,
        }
    }

    pub fn bits_per_pixel(&self) -> u16 {
        match self.dib {
            DibHeader::Core { bits_per_pixel, .. } | DibHeader::Info { bits_per_pixel, .. } => {
                bits_per_pixel
            }
        }
    }

    pub fn compression(&self) -> Compression {
        match self.dib {
            DibHeader::Core { .. } => Compression::None,
            DibHeader::Info { compression, .. } => compression,
        }
    }

    pub fn masks(&self) -> Option<BitMasks> {
        match self.dib {
            DibHeader::Core { .. } => None,
            DibHeader::Info { masks, .. } => masks,
        }
    }

    /// File offset of the first palette entry.
    pub fn palette_offset(&self) -> u32 {
        FILE_HEADER_SIZE + self.version().size()
    }

    /// Bytes per stored row, padding included.
    pub fn row_stride(&self) -> usize {
        // Width and depth are validated, so this cannot overflow on 64-bit.
        row_stride(self.width(), u32::from(self.bits_per_pixel()), 4).unwrap_or(usize::MAX)
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

fn format_err(msg: impl Into<alloc::string::String>) -> DecodeError {
    DecodeError::InvalidFormat(msg.into())
}

/// Parse and validate the headers, applying `size_check` to `source`.
pub(crate) fn parse(
    source: &mut ByteSource,
    size_check: BmpSizeCheck,
) -> Result<BmpHeader, DecodeError> {
    if source.slice(0, 2).ok() != Some(b"BM".as_slice()) {
        return Err(format_err("missing BM signature"));
    }

    let declared_size = source.u32_le_at(2)?;
    let file_size = match size_check {
        BmpSizeCheck::Declared => {
            if declared_size < MIN_FILE_SIZE {
                return Err(format_err(alloc::format!(
                    "declared file size {declared_size} is smaller than a minimal BMP"
                )));
            }
            if declared_size as usize > source.len() {
                return Err(DecodeError::Truncated(alloc::format!(
                    "declared file size {declared_size} exceeds {} bytes read",
                    source.len()
                )));
            }
            if (declared_size as usize) < source.len() {
                warn!(
                    "ignoring {} bytes past declared BMP size {declared_size}",
                    source.len() - declared_size as usize
                );
                source.truncate(declared_size as usize);
            }
            declared_size
        }
        BmpSizeCheck::Actual => {
            debug!("BMP declared size {declared_size}, using {} bytes", source.len());
            u32::try_from(source.len())
                .map_err(|_| format_err("BMP data larger than 4 GiB"))?
        }
    };

    let bitmap_offset = source.u32_le_at(10)?;
    let dib_size = source.u32_le_at(14)?;
    let version = DibVersion::from_size(dib_size)
        .ok_or_else(|| format_err(alloc::format!("unknown DIB header size {dib_size}")))?;

    let headers_end = FILE_HEADER_SIZE + dib_size;
    if bitmap_offset < headers_end {
        return Err(format_err(alloc::format!(
            "bitmap offset {bitmap_offset} lies inside the {headers_end}-byte headers"
        )));
    }
    if bitmap_offset >= file_size {
        return Err(DecodeError::Truncated(alloc::format!(
            "bitmap offset {bitmap_offset} at or past end of {file_size}-byte file"
        )));
    }
    // The whole DIB header must be present.
    source.slice(FILE_HEADER_SIZE as usize, dib_size as usize)?;

    debug!("BMP size {file_size}, offset {bitmap_offset}, DIB header {version:?}");

    let dib = if version.is_core_family() {
        parse_core(source, version)?
    } else {
        parse_info(source, version, bitmap_offset)?
    };

    let mut header = BmpHeader {
        file_size,
        bitmap_offset,
        dib,
        palette_len: 0,
    };
    header.palette_len = palette_len(&header)?;
    check_geometry(&header)?;
    Ok(header)
}

fn check_dimensions(width: u32, height: u32) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(format_err(alloc::format!(
            "zero image dimension {width}x{height}"
        )));
    }
    if width.checked_mul(height).is_none() {
        return Err(DecodeError::DimensionsTooLarge { width, height });
    }
    Ok(())
}

fn check_planes(source: &ByteSource, offset: usize) -> Result<(), DecodeError> {
    let planes = source.u16_le_at(offset)?;
    if planes != 1 {
        return Err(format_err(alloc::format!(
            "colour plane count is {planes}, expected 1"
        )));
    }
    Ok(())
}

fn parse_core(source: &ByteSource, version: DibVersion) -> Result<DibHeader, DecodeError> {
    // The 64-byte OS/2 header shares the core field layout; only the
    // 16-byte variant widens width and height to 32 bits.
    let (width, height, planes_at, bpp_at) = if version != DibVersion::Os2Short {
        (
            u32::from(source.u16_le_at(18)?),
            u32::from(source.u16_le_at(20)?),
            22,
            24,
        )
    } else {
        (source.u32_le_at(18)?, source.u32_le_at(22)?, 26, 28)
    };
    check_planes(source, planes_at)?;
    let bits_per_pixel = source.u16_le_at(bpp_at)?;
    debug!("core header: {width}x{height}, {bits_per_pixel} bpp");

    if !matches!(bits_per_pixel, 1 | 4 | 8 | 24) {
        return Err(format_err(alloc::format!(
            "{bits_per_pixel} bits per pixel not valid for a {version:?} header"
        )));
    }
    check_dimensions(width, height)?;

    Ok(DibHeader::Core {
        version,
        width,
        height,
        bits_per_pixel,
    })
}

fn parse_info(
    source: &ByteSource,
    version: DibVersion,
    bitmap_offset: u32,
) -> Result<DibHeader, DecodeError> {
    let raw_width = source.i32_le_at(18)?;
    let raw_height = source.i32_le_at(22)?;
    check_planes(source, 26)?;
    let bits_per_pixel = source.u16_le_at(28)?;
    let raw_compression = source.u32_le_at(30)?;
    let image_size = source.u32_le_at(34)?;
    let x_pixels_per_meter = source.i32_le_at(38)?;
    let y_pixels_per_meter = source.i32_le_at(42)?;
    let colors_used = source.u32_le_at(46)?;

    debug!(
        "info header: {raw_width}x{raw_height}, {bits_per_pixel} bpp, compression {raw_compression}, image size {image_size}, {colors_used} colours"
    );

    if raw_width < 0 {
        return Err(format_err(alloc::format!("negative width {raw_width}")));
    }
    let width = raw_width as u32;
    let height = raw_height.unsigned_abs();
    let top_down = raw_height < 0;
    if top_down {
        debug!("top-down BMP, decoding bottom-up regardless");
    }

    if !matches!(bits_per_pixel, 1 | 4 | 8 | 16 | 24 | 32) {
        return Err(format_err(alloc::format!(
            "{bits_per_pixel} bits per pixel not supported"
        )));
    }
    let compression = Compression::from_u32(raw_compression).ok_or_else(|| {
        format_err(alloc::format!("unknown compression method {raw_compression}"))
    })?;

    check_dimensions(width, height)?;

    match compression {
        Compression::BitFields if !matches!(bits_per_pixel, 16 | 32) => {
            return Err(format_err(alloc::format!(
                "BITFIELDS requires 16 or 32 bpp, found {bits_per_pixel}"
            )));
        }
        Compression::Rle4 | Compression::CmykRle4 if bits_per_pixel != 4 => {
            return Err(format_err(alloc::format!(
                "RLE4 requires 4 bpp, found {bits_per_pixel}"
            )));
        }
        Compression::Rle8 | Compression::CmykRle8 if bits_per_pixel != 8 => {
            return Err(format_err(alloc::format!(
                "RLE8 requires 8 bpp, found {bits_per_pixel}"
            )));
        }
        _ => {}
    }
    if image_size == 0 && compression != Compression::None {
        return Err(format_err(alloc::format!(
            "zero image size with {compression:?} compression"
        )));
    }

    let max_colors: u32 = match bits_per_pixel {
        1 => 2,
        4 => 16,
        8 => 256,
        16 => 65536,
        _ => u32::MAX,
    };
    if colors_used > max_colors {
        return Err(format_err(alloc::format!(
            "{colors_used} palette colours for a {bits_per_pixel}-bit image"
        )));
    }
    if bits_per_pixel == 16 && compression == Compression::None && colors_used != 0 {
        return Err(format_err(alloc::format!(
            "{colors_used} palette colours declared for a direct 16-bit image"
        )));
    }

    if !compression.is_uncompressed() {
        return Err(DecodeError::Unsupported(alloc::format!(
            "{compression:?} compressed BMP"
        )));
    }

    let masks = if compression == Compression::BitFields {
        Some(read_masks(source, version, bitmap_offset)?)
    } else {
        None
    };

    Ok(DibHeader::Info {
        version,
        width,
        height,
        top_down,
        bits_per_pixel,
        compression,
        image_size,
        x_pixels_per_meter,
        y_pixels_per_meter,
        colors_used,
        masks,
    })
}

/// Read the R, G, B (and A, for V3+ headers) masks.
///
/// They sit immediately before the pixel data. When that would put them
/// inside the DIB header, V2+ headers fall back to the embedded slot right
/// after the 40-byte info fields; a plain info header has nowhere else to
/// keep them.
fn read_masks(
    source: &ByteSource,
    version: DibVersion,
    bitmap_offset: u32,
) -> Result<BitMasks, DecodeError> {
    let count: u32 = if version.has_alpha_mask() { 4 } else { 3 };
    let headers_end = FILE_HEADER_SIZE + version.size();
    let start = match bitmap_offset.checked_sub(count * 4) {
        Some(start) if start >= headers_end => start as usize,
        _ if version.embeds_masks() => EMBEDDED_MASK_OFFSET,
        _ => {
            return Err(format_err(alloc::format!(
                "no room for bit masks between the {headers_end}-byte headers and offset {bitmap_offset}"
            )));
        }
    };
    let masks = BitMasks {
        red: source.u32_le_at(start)?,
        green: source.u32_le_at(start + 4)?,
        blue: source.u32_le_at(start + 8)?,
        alpha: if count == 4 {
            Some(source.u32_le_at(start + 12)?)
        } else {
            None
        },
    };
    debug!("bit masks at {start}: {masks:x?}");
    Ok(masks)
}

/// Effective palette size: the declared count when nonzero, otherwise as
/// many entries as the depth allows and the gap before the pixel data holds.
fn palette_len(header: &BmpHeader) -> Result<u32, DecodeError> {
    let bpp = header.bits_per_pixel();
    if !matches!(bpp, 1 | 4 | 8) {
        return Ok(0);
    }
    let entry = PALETTE_ENTRY_SIZE;
    let start = header.palette_offset();
    // Core headers have no count field and size the palette from the gap.
    let declared = match header.dib {
        DibHeader::Info { colors_used, .. } => colors_used,
        DibHeader::Core { .. } => 0,
    };
    if bpp == 1 && declared == 0 && matches!(header.dib, DibHeader::Info { .. }) {
        return Err(format_err("1-bit image declares no palette colours"));
    }
    let len = if declared != 0 {
        declared
    } else {
        let room = (header.bitmap_offset - start) / entry;
        room.min(1 << bpp)
    };
    if len == 0 {
        return Err(format_err(alloc::format!(
            "{bpp}-bit image without palette entries"
        )));
    }
    let end = u64::from(start) + u64::from(len) * u64::from(entry);
    if end > u64::from(header.file_size) {
        return Err(DecodeError::Truncated(alloc::format!(
            "palette of {len} entries ends at {end}, past end of file"
        )));
    }
    debug!("palette: {len} entries of {entry} bytes at {start}");
    Ok(len)
}

/// The pixel region, as declared and as computed, must fit in the file.
fn check_geometry(header: &BmpHeader) -> Result<(), DecodeError> {
    let computed = (header.row_stride() as u64).saturating_mul(u64::from(header.height()));
    let declared = match header.dib {
        DibHeader::Info { image_size, .. } => u64::from(image_size),
        DibHeader::Core { .. } => 0,
    };
    let needed = u64::from(header.bitmap_offset) + computed.max(declared);
    if needed > u64::from(header.file_size) {
        return Err(DecodeError::Truncated(alloc::format!(
            "pixel data needs {needed} bytes, file has {}",
            header.file_size
        )));
    }
    Ok(())
}

/// Read the palette as RGBA.
pub(crate) fn read_palette(
    header: &BmpHeader,
    source: &ByteSource,
) -> Result<Vec<[u8; 4]>, DecodeError> {
    let entry = PALETTE_ENTRY_SIZE as usize;
    let start = header.palette_offset() as usize;
    let bytes = source.slice(start, header.palette_len as usize * entry)?;
    Ok(bytes
        .chunks_exact(entry)
        .map(|bgr| [bgr[2], bgr[1], bgr[0], 255])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_bmp(width: i32, height: i32, bpp: u16, compression: u32, offset: u32) -> Vec<u8> {
        let mut d = vec![0u8; 54];
        d[0] = b'B';
        d[1] = b'M';
        d[10..14].copy_from_slice(&offset.to_le_bytes());
        d[14..18].copy_from_slice(&40u32.to_le_bytes());
        d[18..22].copy_from_slice(&width.to_le_bytes());
        d[22..26].copy_from_slice(&height.to_le_bytes());
        d[26..28].copy_from_slice(&1u16.to_le_bytes());
        d[28..30].copy_from_slice(&bpp.to_le_bytes());
        d[30..34].copy_from_slice(&compression.to_le_bytes());
        d
    }

    fn finish(mut d: Vec<u8>, total: usize) -> ByteSource {
        d.resize(total, 0);
        let len = d.len() as u32;
        d[2..6].copy_from_slice(&len.to_le_bytes());
        ByteSource::from_vec(d)
    }

    #[test]
    fn dib_sizes() {
        for size in [12, 16, 40, 52, 56, 64, 108, 124] {
            assert_eq!(DibVersion::from_size(size).unwrap().size(), size);
        }
        assert_eq!(DibVersion::from_size(20), None);
        assert!(DibVersion::V3.has_alpha_mask());
        assert!(!DibVersion::V2.has_alpha_mask());
        assert!(!DibVersion::Os2.has_alpha_mask());
        assert!(DibVersion::V2.embeds_masks());
        assert!(!DibVersion::Info.embeds_masks());
        assert!(!DibVersion::Os2.embeds_masks());
    }

    #[test]
    fn alpha_bitfields_code_is_unknown() {
        assert_eq!(Compression::from_u32(3), Some(Compression::BitFields));
        assert_eq!(Compression::from_u32(6), None);
        let mut d = info_bmp(1, 1, 32, 6, 54);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        let mut src = finish(d, 58);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn zero_image_size_rejected_for_cmyk() {
        let mut src = finish(info_bmp(1, 1, 24, 11, 54), 58);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));

        let mut d = info_bmp(1, 1, 24, 11, 54);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        let mut src = finish(d, 58);
        let h = parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!(h.compression(), Compression::Cmyk);
    }

    #[test]
    fn info_header_masks_need_a_gap() {
        // 40-byte header, pixels straight after it: no slot for masks
        let mut d = info_bmp(1, 1, 16, 3, 54);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        let mut src = finish(d, 58);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn os2_64_uses_core_field_layout() {
        let mut d = vec![0u8; 14 + 64];
        d[0] = b'B';
        d[1] = b'M';
        d[10..14].copy_from_slice(&78u32.to_le_bytes());
        d[14..18].copy_from_slice(&64u32.to_le_bytes());
        d[18..20].copy_from_slice(&3u16.to_le_bytes());
        d[20..22].copy_from_slice(&2u16.to_le_bytes());
        d[22..24].copy_from_slice(&1u16.to_le_bytes());
        d[24..26].copy_from_slice(&24u16.to_le_bytes());
        let mut src = finish(d, 78 + 24);
        let h = parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!(h.version(), DibVersion::Os2);
        assert_eq!((h.width(), h.height(), h.bits_per_pixel()), (3, 2, 24));
    }

    #[test]
    fn parses_24bit_info_header() {
        let mut src = finish(info_bmp(2, 2, 24, 0, 54), 54 + 16);
        let h = parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!((h.width(), h.height()), (2, 2));
        assert_eq!(h.row_stride(), 8);
        assert_eq!(h.compression(), Compression::None);
        assert_eq!(h.palette_len, 0);
    }

    #[test]
    fn negative_height_is_absolute() {
        let mut src = finish(info_bmp(1, -3, 24, 0, 54), 54 + 12);
        let h = parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!(h.height(), 3);
        assert!(matches!(h.dib, DibHeader::Info { top_down: true, .. }));
    }

    #[test]
    fn negative_width_rejected() {
        let mut src = finish(info_bmp(-1, 1, 24, 0, 54), 58);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn bitfields_needs_16_or_32() {
        let mut d = info_bmp(1, 1, 24, 3, 66);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        let mut src = finish(d, 70);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rle_depth_mismatch_is_format_error_but_match_is_unsupported() {
        let mut d = info_bmp(1, 1, 8, 2, 54 + 1024);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        let mut src = finish(d, 54 + 1024 + 4);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));

        let mut d = info_bmp(1, 1, 8, 1, 54 + 1024);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        let mut src = finish(d, 54 + 1024 + 4);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::Unsupported(_))
        ));
    }

    #[test]
    fn declared_size_policy() {
        // declared larger than data
        let mut d = info_bmp(1, 1, 24, 0, 54);
        d.resize(58, 0);
        d[2..6].copy_from_slice(&100u32.to_le_bytes());
        let mut src = ByteSource::from_vec(d.clone());
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::Truncated(_))
        ));
        // same file, actual-size policy
        let mut src = ByteSource::from_vec(d);
        let h = parse(&mut src, BmpSizeCheck::Actual).unwrap();
        assert_eq!(h.file_size, 58);

        // trailing garbage is dropped
        let mut d = info_bmp(1, 1, 24, 0, 54);
        d.resize(70, 0xAA);
        d[2..6].copy_from_slice(&58u32.to_le_bytes());
        let mut src = ByteSource::from_vec(d);
        parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!(src.len(), 58);
    }

    #[test]
    fn masks_read_before_pixel_data() {
        let mut d = info_bmp(1, 1, 16, 3, 66);
        d[34..38].copy_from_slice(&4u32.to_le_bytes());
        d.extend_from_slice(&0xF800u32.to_le_bytes());
        d.extend_from_slice(&0x07E0u32.to_le_bytes());
        d.extend_from_slice(&0x001Fu32.to_le_bytes());
        let mut src = finish(d, 70);
        let h = parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!(
            h.masks(),
            Some(BitMasks {
                red: 0xF800,
                green: 0x07E0,
                blue: 0x001F,
                alpha: None
            })
        );
    }

    #[test]
    fn palette_defaults_to_room_before_pixels() {
        // 8-bit, no declared count, room for 3 entries
        let mut src = finish(info_bmp(1, 1, 8, 0, 54 + 12), 54 + 12 + 4);
        let h = parse(&mut src, BmpSizeCheck::Declared).unwrap();
        assert_eq!(h.palette_len, 3);

        // 1-bit with no room for any entry
        let mut src = finish(info_bmp(1, 1, 1, 0, 54), 58);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn one_bit_info_header_needs_a_declared_count() {
        // room for two entries, but the count field says zero
        let mut src = finish(info_bmp(8, 1, 1, 0, 62), 66);
        assert!(matches!(
            parse(&mut src, BmpSizeCheck::Declared),
            Err(DecodeError::InvalidFormat(_))
        ));

        let mut d = info_bmp(8, 1, 1, 0, 62);
        d[46..50].copy_from_slice(&2u32.to_le_bytes());
        let mut src = finish(d, 66);
        assert_eq!(parse(&mut src, BmpSizeCheck::Declared).unwrap().palette_len, 2);
    }
}
