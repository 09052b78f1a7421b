// src/engine/channels.rs
//
// Per-channel bitwise masking.

use crate::engine::buffer::PixelBuffer;

/// `out = mask & in` per channel. Keeps only the bits set in both operands.
pub fn mask_channels(source: &PixelBuffer, red: u8, green: u8, blue: u8) -> PixelBuffer {
    source.map_pixels(|[r, g, b]| [red & r, green & g, blue & b])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_not_scale() {
        let src = PixelBuffer::from_pixel(1, 1, [0b1010_1010, 0xFF, 100]);
        let out = mask_channels(&src, 0b0000_1111, 0x80, 50);
        // 100 = 0b0110_0100, 50 = 0b0011_0010 -> 0b0010_0000
        assert_eq!(out.get(0, 0).unwrap(), [0b0000_1010, 0x80, 32]);
    }

    #[test]
    fn full_mask_is_identity_and_zero_mask_is_black() {
        let src = PixelBuffer::from_fn(4, 2, |x, y| [x as u8 * 50, y as u8 * 70, 33]);
        assert_eq!(mask_channels(&src, 255, 255, 255), src);
        assert!(mask_channels(&src, 0, 0, 0).pixels().all(|p| p == [0, 0, 0]));
    }

    #[test]
    fn masking_is_idempotent() {
        let src = PixelBuffer::from_fn(4, 4, |x, y| [(x * 61) as u8, (y * 17) as u8, 250]);
        let once = mask_channels(&src, 99, 12, 200);
        assert_eq!(mask_channels(&once, 99, 12, 200), once);
    }
}
