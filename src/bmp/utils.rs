//! BMP channel expansion helpers.

/// Expand a 5-bit channel to 8 bits: shift up and fill the low bits.
#[inline]
pub(crate) fn expand_5bit(v: u16) -> u8 {
    (((v & 0x1F) << 3) | 0x07) as u8
}

/// Split an RGB555 word into RGBA.
#[inline]
pub(crate) fn rgb555(word: u16) -> [u8; 4] {
    [
        expand_5bit(word >> 10),
        expand_5bit(word >> 5),
        expand_5bit(word),
        255,
    ]
}

/// `(value & mask) * 255 / mask`, or `None` for an absent (zero) mask.
///
/// This ratio ignores where the mask sits; it is only a true 8-bit
/// normalization for masks aligned at bit 0.
#[inline]
pub(crate) fn scale_masked(value: u32, mask: u32) -> Option<u8> {
    if mask == 0 {
        return None;
    }
    Some((u64::from(value & mask) * 255 / u64::from(mask)) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_bit_expansion() {
        assert_eq!(expand_5bit(0), 7);
        assert_eq!(expand_5bit(31), 255);
        assert_eq!(expand_5bit(16), 135);
    }

    #[test]
    fn rgb555_channels() {
        // r=31 g=0 b=1
        assert_eq!(rgb555(0b0_11111_00000_00001), [255, 7, 15, 255]);
    }

    #[test]
    fn right_aligned_masks() {
        assert_eq!(scale_masked(0x1F, 0x1F), Some(255));
        assert_eq!(scale_masked(0, 0x1F), Some(0));
        assert_eq!(scale_masked(0xFF, 0xFF), Some(255));
        assert_eq!(scale_masked(0x80, 0xFF), Some(128));
        assert_eq!(scale_masked(123, 0), None);
    }

    #[test]
    fn full_mask_ratio_stays_in_range() {
        // High-aligned masks only ever reach 255 when every mask bit is set.
        assert_eq!(scale_masked(0xFF00_0000, 0xFF00_0000), Some(255));
        assert_eq!(scale_masked(u32::MAX, u32::MAX), Some(255));
    }
}
