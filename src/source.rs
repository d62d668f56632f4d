//! Whole-file byte buffer with bounds-checked random access.

use alloc::vec::Vec;

use crate::error::DecodeError;

/// An immutable, fully loaded file.
///
/// Every read is bounds checked and reports [`DecodeError::UnexpectedEof`]
/// instead of panicking, so header parsers can use input-derived offsets
/// directly.
#[derive(Clone, Debug)]
pub struct ByteSource {
    data: Vec<u8>,
}

impl ByteSource {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read the entire file at `path`.
    #[cfg(feature = "std")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, DecodeError> {
        let data = std::fs::read(path.as_ref())?;
        log::debug!("loaded {} bytes from {}", data.len(), path.as_ref().display());
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Drop everything past `len` bytes. No-op if already shorter.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Borrow `len` bytes starting at `offset`.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&[u8], DecodeError> {
        let end = offset.checked_add(len).ok_or(DecodeError::UnexpectedEof)?;
        self.data.get(offset..end).ok_or(DecodeError::UnexpectedEof)
    }

    /// Borrow everything from `offset` to the end.
    pub fn tail(&self, offset: usize) -> Result<&[u8], DecodeError> {
        self.data.get(offset..).ok_or(DecodeError::UnexpectedEof)
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.slice(offset, N)?);
        Ok(buf)
    }

    pub fn u8_at(&self, offset: usize) -> Result<u8, DecodeError> {
        self.data.get(offset).copied().ok_or(DecodeError::UnexpectedEof)
    }

    pub fn u16_le_at(&self, offset: usize) -> Result<u16, DecodeError> {
        self.array(offset).map(u16::from_le_bytes)
    }

    pub fn u32_le_at(&self, offset: usize) -> Result<u32, DecodeError> {
        self.array(offset).map(u32::from_le_bytes)
    }

    pub fn i32_le_at(&self, offset: usize) -> Result<i32, DecodeError> {
        self.array(offset).map(i32::from_le_bytes)
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(data: Vec<u8>) -> Self {
        Self::from_vec(data)
    }
}

impl From<&[u8]> for ByteSource {
    fn from(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }
}
