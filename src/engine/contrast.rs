// src/engine/contrast.rs
//
// High contrast and inverse: tone-1 grayscale followed by a binary threshold.

use crate::engine::buffer::{PixelBuffer, Rgb};
use crate::engine::tone::grayscale;
use crate::ops::GrayTone;

const WHITE: Rgb = [255, 255, 255];
const BLACK: Rgb = [0, 0, 0];

/// Channels strictly above this are "bright".
pub const THRESHOLD: u8 = 127;

#[inline]
fn is_bright([r, g, b]: Rgb) -> bool {
    r > THRESHOLD && g > THRESHOLD && b > THRESHOLD
}

/// Bright pixels become white, everything else black.
pub fn high_contrast(source: &PixelBuffer) -> PixelBuffer {
    grayscale(source, GrayTone::Average).map_pixels(|px| if is_bright(px) { WHITE } else { BLACK })
}

/// Bright pixels become black, everything else white.
pub fn inverse(source: &PixelBuffer) -> PixelBuffer {
    grayscale(source, GrayTone::Average).map_pixels(|px| if is_bright(px) { BLACK } else { WHITE })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> PixelBuffer {
        PixelBuffer::from_fn(16, 16, |x, y| [(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
    }

    #[test]
    fn outputs_are_exact_complements() {
        let src = gradient();
        let hi = high_contrast(&src);
        let inv = inverse(&src);
        for (a, b) in hi.pixels().zip(inv.pixels()) {
            assert!(a == WHITE || a == BLACK);
            assert_eq!(b, if a == WHITE { BLACK } else { WHITE });
        }
    }

    #[test]
    fn threshold_uses_tone_one_average() {
        // (128 + 128 + 127) / 3 = 127 -> not bright
        let src = PixelBuffer::from_pixel(1, 1, [128, 128, 127]);
        assert_eq!(high_contrast(&src).get(0, 0).unwrap(), BLACK);
        // (128 + 128 + 128) / 3 = 128 -> bright
        let src = PixelBuffer::from_pixel(1, 1, [128, 128, 128]);
        assert_eq!(high_contrast(&src).get(0, 0).unwrap(), WHITE);
        assert_eq!(inverse(&src).get(0, 0).unwrap(), BLACK);
    }
}
