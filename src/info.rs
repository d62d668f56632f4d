use crate::decode::DecodeOptions;
use crate::error::DecodeError;
use crate::format::ImageFormat;
use crate::image::{FileImage, Image};

/// Image metadata obtained by validating headers without decoding pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl ImageInfo {
    /// Probe `data`, detecting the format from its magic bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        Self::from_bytes_with_options(data, &DecodeOptions::default())
    }

    pub fn from_bytes_with_options(
        data: &[u8],
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        Ok(Self::of(&Image::from_bytes(data, options)?))
    }

    /// Metadata of an already opened image.
    pub fn of(image: &dyn FileImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            format: image.format(),
        }
    }
}
