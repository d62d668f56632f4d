//! Variable-width LZW decompressor (GIF flavour).
//!
//! Codes `0..clear` are literals, `clear = 1 << min_code_size` resets the
//! dictionary, `clear + 1` ends the stream, and new entries start at
//! `clear + 2`. The code width starts at `min_code_size + 1` and grows by
//! one bit each time the dictionary reaches `1 << width` entries; there is
//! no 12-bit cap. Running out of input ends decoding without an error.

use alloc::vec::Vec;

use crate::bits::{BitOrder, BitReader};
use crate::error::DecodeError;

/// Smallest supported minimum code size. With 1, the seeded table already
/// fills the initial width and the first new code would be unreadable.
pub const MIN_MIN_CODE_SIZE: u8 = 2;
/// Largest supported minimum code size (literals must fit in a byte).
pub const MAX_MIN_CODE_SIZE: u8 = 8;

#[derive(Debug, Clone, Copy)]
struct Entry {
    /// Code of the string this one extends, `None` for literals.
    prefix: Option<u32>,
    suffix: u8,
    first: u8,
    len: usize,
}

/// Code -> string table stored as prefix links.
#[derive(Debug)]
struct Dictionary {
    entries: Vec<Entry>,
}

impl Dictionary {
    /// Literal entries for `0..clear`, plus placeholders for the two
    /// control codes so that `len()` is the next assignable code.
    fn seeded(min_code_size: u8) -> Self {
        let clear = 1usize << min_code_size;
        let mut entries = Vec::with_capacity(clear * 2);
        entries.extend((0..clear).map(|i| Entry {
            prefix: None,
            suffix: i as u8,
            first: i as u8,
            len: 1,
        }));
        let control = Entry {
            prefix: None,
            suffix: 0,
            first: 0,
            len: 0,
        };
        entries.push(control);
        entries.push(control);
        Self { entries }
    }

    fn next_code(&self) -> u32 {
        self.entries.len() as u32
    }

    fn first_byte(&self, code: u32) -> u8 {
        self.entries[code as usize].first
    }

    /// Append the string for `code` to `out`.
    fn emit(&self, code: u32, out: &mut Vec<u8>) {
        let len = self.entries[code as usize].len;
        let start = out.len();
        out.resize(start + len, 0);
        let mut at = start + len;
        let mut cur = code;
        loop {
            let entry = self.entries[cur as usize];
            at -= 1;
            out[at] = entry.suffix;
            match entry.prefix {
                Some(p) if at > start => cur = p,
                _ => break,
            }
        }
    }

    fn push(&mut self, prefix: u32, suffix: u8) {
        let base = self.entries[prefix as usize];
        self.entries.push(Entry {
            prefix: Some(prefix),
            suffix,
            first: base.first,
            len: base.len + 1,
        });
    }
}

/// LZW decoder configuration.
#[derive(Debug, Clone)]
pub struct LzwDecoder {
    min_code_size: u8,
    order: BitOrder,
    max_output: Option<usize>,
}

impl LzwDecoder {
    /// `min_code_size` must be in `2..=8`.
    pub fn new(min_code_size: u8, order: BitOrder) -> Result<Self, DecodeError> {
        if !(MIN_MIN_CODE_SIZE..=MAX_MIN_CODE_SIZE).contains(&min_code_size) {
            return Err(DecodeError::InvalidFormat(alloc::format!(
                "LZW minimum code size {min_code_size} not in {MIN_MIN_CODE_SIZE}..={MAX_MIN_CODE_SIZE}"
            )));
        }
        Ok(Self {
            min_code_size,
            order,
            max_output: None,
        })
    }

    /// Stop once `n` bytes have been produced; extra output is discarded.
    pub fn with_max_output(mut self, n: usize) -> Self {
        self.max_output = Some(n);
        self
    }

    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }

    /// Decompress a byte-aligned code stream.
    ///
    /// Fails with [`DecodeError::OutOfRange`] when a code is neither in the
    /// dictionary nor the next code to be assigned, or when the first code
    /// after a reset is not a literal.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let clear = 1u32 << self.min_code_size;
        let eoi = clear + 1;
        let initial_width = u32::from(self.min_code_size) + 1;
        let limit = self.max_output.unwrap_or(usize::MAX);

        let mut reader = BitReader::new(data, self.order);
        let mut dict = Dictionary::seeded(self.min_code_size);
        let mut width = initial_width;
        let mut prev: Option<u32> = None;
        let mut out = Vec::new();

        while out.len() < limit {
            let Some(code) = reader.read_bits(width) else {
                log::trace!("LZW input exhausted after {} bytes out", out.len());
                break;
            };
            if code == clear {
                log::trace!("LZW clear code at width {width}");
                dict = Dictionary::seeded(self.min_code_size);
                width = initial_width;
                prev = None;
                continue;
            }
            if code == eoi {
                log::trace!("LZW end-of-information code");
                break;
            }

            let Some(p) = prev else {
                if code >= clear {
                    return Err(DecodeError::OutOfRange(alloc::format!(
                        "LZW code {code} where a literal below {clear} was expected"
                    )));
                }
                dict.emit(code, &mut out);
                prev = Some(code);
                continue;
            };

            let next = dict.next_code();
            let first = if code < next {
                dict.emit(code, &mut out);
                dict.first_byte(code)
            } else if code == next {
                let first = dict.first_byte(p);
                dict.emit(p, &mut out);
                out.push(first);
                first
            } else {
                return Err(DecodeError::OutOfRange(alloc::format!(
                    "LZW code {code} beyond next dictionary slot {next}"
                )));
            };
            dict.push(p, first);
            if u64::from(dict.next_code()) == 1u64 << width {
                width += 1;
            }
            prev = Some(code);
        }

        out.truncate(limit);
        Ok(out)
    }
}
