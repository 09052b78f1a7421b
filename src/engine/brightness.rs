// src/engine/brightness.rs
//
// Additive brightness with saturation.

use crate::engine::buffer::PixelBuffer;

#[inline]
fn shift(channel: u8, delta: i32) -> u8 {
    (channel as i32).saturating_add(delta).clamp(0, 255) as u8
}

/// Add `delta` to every channel, saturating at 0 and 255. Any delta is legal.
pub fn brighten(source: &PixelBuffer, delta: i32) -> PixelBuffer {
    source.map_pixels(|[r, g, b]| [shift(r, delta), shift(g, delta), shift(b, delta)])
}
