// src/engine/buffer.rs
//
// PixelBuffer: the three-channel byte grid every filter reads and writes.

use crate::engine::pool::get_pool;
use crate::error::{Result, TrentError};
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;

/// One pixel as `[r, g, b]`.
pub type Rgb = [u8; 3];

/// Bytes per pixel in the interleaved layout.
pub(crate) const CHANNELS: usize = 3;

/// Row-major RGB8 grid.
///
/// Pixels are stored interleaved (`r, g, b, r, g, b, ...`) so the buffer
/// is built from `image::RgbImage` without copying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Black buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_pixel(width, height, [0, 0, 0])
    }

    pub fn from_pixel(width: u32, height: u32, pixel: Rgb) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an interleaved RGB8 vector. The length must be `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(TrentError::invalid_parameter(
                "data",
                format!("{} bytes", data.len()),
                format!("expected {expected} bytes for {width}x{height} RGB"),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Flatten any decoded image to RGB8. Alpha is dropped, luma is replicated.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let rgb = match img {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
        Self::from(rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(TrentError::index_out_of_bounds(
                x,
                y,
                self.width,
                self.height,
            ));
        }
        Ok((y as usize * self.width as usize + x as usize) * CHANNELS)
    }

    pub fn get(&self, x: u32, y: u32) -> Result<Rgb> {
        let i = self.offset(x, y)?;
        Ok([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    pub fn set(&mut self, x: u32, y: u32, pixel: Rgb) -> Result<()> {
        let i = self.offset(x, y)?;
        self.data[i..i + CHANNELS].copy_from_slice(&pixel);
        Ok(())
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|p| [p[0], p[1], p[2]])
    }

    pub(crate) fn row_stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Buffer with this one's dimensions over `data`, which a pass filled
    /// row by row from `self`.
    pub(crate) fn with_same_dimensions(&self, data: Vec<u8>) -> PixelBuffer {
        debug_assert_eq!(data.len(), self.data.len());
        PixelBuffer {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// New buffer where every pixel is `f(source pixel)`. Rows are processed in
    /// parallel; `self` is never written.
    pub(crate) fn map_pixels<F>(&self, f: F) -> PixelBuffer
    where
        F: Fn(Rgb) -> Rgb + Sync,
    {
        let mut out = vec![0u8; self.data.len()];
        let stride = self.row_stride();
        if stride > 0 {
            get_pool().install(|| {
                out.par_chunks_mut(stride)
                    .zip(self.data.par_chunks(stride))
                    .for_each(|(row_out, row_in)| {
                        for (dst, src) in row_out
                            .chunks_exact_mut(CHANNELS)
                            .zip(row_in.chunks_exact(CHANNELS))
                        {
                            dst.copy_from_slice(&f([src[0], src[1], src[2]]));
                        }
                    });
            });
        }
        self.with_same_dimensions(out)
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(rgb: RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        Self {
            width,
            height,
            data: rgb.into_raw(),
        }
    }
}
