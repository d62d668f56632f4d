/// Container formats this crate decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ImageFormat {
    Bmp,
    Gif,
    /// Any of P1..P6.
    Pnm,
}

const EXTENSIONS: [(&str, ImageFormat); 6] = [
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
    ("pnm", ImageFormat::Pnm),
    ("pbm", ImageFormat::Pnm),
    ("pgm", ImageFormat::Pnm),
    ("ppm", ImageFormat::Pnm),
];

impl ImageFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        EXTENSIONS
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|&(_, f)| f)
    }

    /// Format implied by the extension of `path`.
    #[cfg(feature = "std")]
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Sniff the format from leading magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [b'B', b'M', ..] => Some(Self::Bmp),
            [b'G', b'I', b'F', ..] => Some(Self::Gif),
            [b'P', b'1'..=b'6', ..] => Some(Self::Pnm),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Pnm => "PNM",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("BMP"), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::from_extension("Gif"), Some(ImageFormat::Gif));
        for ext in ["pnm", "PBM", "pgm", "pPm"] {
            assert_eq!(ImageFormat::from_extension(ext), Some(ImageFormat::Pnm));
        }
        assert_eq!(ImageFormat::from_extension("svg"), None);
        assert_eq!(ImageFormat::from_extension(""), None);
    }

    #[test]
    fn magic_detection() {
        assert_eq!(ImageFormat::detect(b"BM\0\0"), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::detect(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"P4\n"), Some(ImageFormat::Pnm));
        assert_eq!(ImageFormat::detect(b"P7\n"), None);
        assert_eq!(ImageFormat::detect(b"B"), None);
    }
}
