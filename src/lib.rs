//! # limg
//!
//! Decoders for BMP, GIF and PNM raster images that render into a caller
//! supplied RGBA pixel sink.
//!
//! Every decoder follows the same two-step contract: constructing it
//! (`open`/`new`) loads the whole file and validates its headers, and
//! [`FileImage::render`] then walks the pixel data and writes the cells
//! inside a viewport. A decoder value only exists once its headers are
//! valid.
//!
//! ## Supported Formats
//!
//! ### BMP
//! - File header plus core (12), OS/2 (16, 64) and info (40, 52, 56, 108,
//!   124 byte) DIB headers
//! - 1, 4 and 8-bit palettized, 16-bit RGB555 or bit-field, 24-bit BGR,
//!   32-bit BGRA or bit-field pixels
//!
//! ### GIF
//! - GIF87a and GIF89a containers, global and local colour tables
//! - LZW decompression of the first frame; graphic control transparency
//!
//! ### PNM
//! - P1..P6: ASCII and binary bitmaps, graymaps and pixmaps, 8 and 16-bit
//!   samples
//!
//! ## Non-Goals
//!
//! - Encoding of any format
//! - RLE/JPEG/PNG compressed BMP, interlaced GIF, animation
//! - Colour management
//!
//! ## Usage
//!
//! ```no_run
//! use limg::{FileImage, PixelSink, Unstoppable, Viewport};
//!
//! let image = limg::open("photo.bmp")?;
//! let (w, h) = (image.width(), image.height());
//! let mut buf = vec![0u8; w as usize * h as usize * 4];
//! let mut sink = PixelSink::new(&mut buf, w);
//! image.render(&mut sink, Viewport::new(w, h), &Unstoppable)?;
//! # Ok::<(), limg::DecodeError>(())
//! ```
//!
//! Or decode an in-memory file in one call:
//!
//! ```
//! use limg::{DecodeRequest, ImageInfo, Unstoppable};
//!
//! let data: &[u8] = b"P2 2 1 3\n0 3\n";
//! let info = ImageInfo::from_bytes(data)?;
//! assert_eq!((info.width, info.height), (2, 1));
//!
//! let decoded = DecodeRequest::new(data).decode(Unstoppable)?;
//! assert_eq!(decoded.pixels(), &[0, 0, 0, 255, 255, 255, 255, 255]);
//! # Ok::<(), limg::DecodeError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bits;
mod decode;
mod error;
mod format;
mod image;
mod info;
mod limits;
mod raster;
mod sink;
mod source;

pub mod bmp;
pub mod gif;
pub mod lzw;
pub mod pnm;

// Re-exports
pub use bits::{BitOrder, BitReader};
pub use decode::{DecodeOptions, DecodeOutput, DecodeRequest, decode_image};
pub use enough::{Stop, Unstoppable};
pub use error::{DecodeError, ErrorKind};
pub use format::ImageFormat;
#[cfg(feature = "std")]
pub use image::{open, open_with_options};
pub use image::{FileImage, Image};
pub use info::ImageInfo;
pub use limits::Limits;
pub use sink::{BYTES_PER_PIXEL, PixelSink, Viewport};
pub use source::ByteSource;
