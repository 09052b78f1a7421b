// src/engine/tone.rs
//
// Grayscale conversion. Each tone collapses (r, g, b) to a single value v
// and writes (v, v, v).

use crate::engine::buffer::{PixelBuffer, Rgb};
use crate::ops::GrayTone;

/// Luma value for one pixel. Weighted formulas truncate, never round:
/// white maps to 254 under `Luminosity`, exactly like the legacy engine.
#[inline]
pub fn luma(tone: GrayTone, [r, g, b]: Rgb) -> u8 {
    match tone {
        GrayTone::Average => ((r as u16 + g as u16 + b as u16) / 3) as u8,
        GrayTone::Weighted => {
            (r as f64 * 0.30 + g as f64 * 0.59 + b as f64 * 0.11) as u8
        }
        GrayTone::Luminosity => {
            (r as f64 * 0.2126 + g as f64 * 0.7152 + b as f64 * 0.0722) as u8
        }
        GrayTone::Lightness => {
            let max = r.max(g).max(b) as u16;
            let min = r.min(g).min(b) as u16;
            ((max + min) / 2) as u8
        }
        GrayTone::Max => r.max(g).max(b),
        GrayTone::Min => r.min(g).min(b),
        GrayTone::Red => r,
        GrayTone::Green => g,
        GrayTone::Blue => b,
    }
}

/// Grayscale copy of `source`.
pub fn grayscale(source: &PixelBuffer, tone: GrayTone) -> PixelBuffer {
    source.map_pixels(|px| {
        let v = luma(tone, px);
        [v, v, v]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_floors() {
        assert_eq!(luma(GrayTone::Average, [30, 60, 90]), 60);
        assert_eq!(luma(GrayTone::Average, [1, 1, 0]), 0);
        assert_eq!(luma(GrayTone::Average, [255, 255, 255]), 255);
    }

    #[test]
    fn weighted_formulas_truncate() {
        assert_eq!(luma(GrayTone::Weighted, [30, 60, 90]), 54);
        assert_eq!(luma(GrayTone::Weighted, [200, 100, 50]), 124);
        assert_eq!(luma(GrayTone::Luminosity, [30, 60, 90]), 55);
        assert_eq!(luma(GrayTone::Luminosity, [200, 100, 50]), 117);
        // 255 * (0.2126 + 0.7152 + 0.0722) lands just below 255.
        assert_eq!(luma(GrayTone::Luminosity, [255, 255, 255]), 254);
        assert_eq!(luma(GrayTone::Weighted, [255, 255, 255]), 255);
    }

    #[test]
    fn extrema_and_projections() {
        let px = [200, 100, 50];
        assert_eq!(luma(GrayTone::Lightness, px), 125);
        assert_eq!(luma(GrayTone::Max, px), 200);
        assert_eq!(luma(GrayTone::Min, px), 50);
        assert_eq!(luma(GrayTone::Red, px), 200);
        assert_eq!(luma(GrayTone::Green, px), 100);
        assert_eq!(luma(GrayTone::Blue, px), 50);
    }

    #[test]
    fn grayscale_writes_equal_channels() {
        let src = PixelBuffer::from_fn(4, 4, |x, y| [(x * 60) as u8, (y * 60) as u8, 7]);
        for tone in GrayTone::ALL {
            let out = grayscale(&src, tone);
            assert_eq!(out.dimensions(), src.dimensions());
            for [r, g, b] in out.pixels() {
                assert!(r == g && g == b, "{tone:?} produced ({r},{g},{b})");
            }
        }
    }

    #[test]
    fn channel_projections_are_idempotent() {
        let src = PixelBuffer::from_fn(6, 3, |x, y| [(x * 40) as u8, (y * 90) as u8, 200]);
        for tone in [GrayTone::Red, GrayTone::Green, GrayTone::Blue] {
            let once = grayscale(&src, tone);
            let twice = grayscale(&once, tone);
            assert_eq!(once, twice);
        }
    }
}
