// src/engine/mosaic.rs
//
// Block-average pixelation.
//
// The grid starts at (0, 0); blocks on the right and bottom edges are clipped
// to the image. Each band of block rows is handled by one worker: block means
// are read from the untouched source, so no block is written before its mean
// exists.

use crate::engine::buffer::{PixelBuffer, Rgb, CHANNELS};
use crate::engine::pool::get_pool;
use crate::error::{Result, TrentError};
use rayon::prelude::*;

/// Half-open pixel rectangle `[col_start, col_end) x [row_start, row_end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MosaicBlock {
    pub col_start: u32,
    pub row_start: u32,
    pub col_end: u32,
    pub row_end: u32,
}

impl MosaicBlock {
    pub fn pixel_count(&self) -> u64 {
        (self.col_end - self.col_start) as u64 * (self.row_end - self.row_start) as u64
    }
}

/// Reject non-positive block sizes before any work is done.
pub fn validate_block_size(block_width: i32, block_height: i32) -> Result<(u32, u32)> {
    if block_width <= 0 {
        return Err(TrentError::invalid_parameter(
            "block_width",
            block_width.to_string(),
            "mosaic block width must be positive",
        ));
    }
    if block_height <= 0 {
        return Err(TrentError::invalid_parameter(
            "block_height",
            block_height.to_string(),
            "mosaic block height must be positive",
        ));
    }
    Ok((block_width as u32, block_height as u32))
}

/// Blocks of one band (block row) starting at `row_start`, left to right.
fn band_blocks(
    width: u32,
    height: u32,
    row_start: u32,
    block_width: u32,
    block_height: u32,
) -> impl Iterator<Item = MosaicBlock> {
    let row_end = row_start.saturating_add(block_height).min(height);
    (0..width)
        .step_by(block_width as usize)
        .map(move |col_start| MosaicBlock {
            col_start,
            row_start,
            col_end: col_start.saturating_add(block_width).min(width),
            row_end,
        })
}

/// Every block of the grid in row-major order.
pub fn blocks(
    width: u32,
    height: u32,
    block_width: u32,
    block_height: u32,
) -> impl Iterator<Item = MosaicBlock> {
    (0..height)
        .step_by(block_height.max(1) as usize)
        .flat_map(move |row_start| {
            band_blocks(width, height, row_start, block_width.max(1), block_height)
        })
}

/// Per-channel floor mean over `block`.
pub fn block_mean(source: &PixelBuffer, block: &MosaicBlock) -> Rgb {
    let stride = source.row_stride();
    let data = source.as_raw();
    let mut totals = [0u64; CHANNELS];
    for y in block.row_start..block.row_end {
        let row = &data[y as usize * stride..(y as usize + 1) * stride];
        let span = &row[block.col_start as usize * CHANNELS..block.col_end as usize * CHANNELS];
        for px in span.chunks_exact(CHANNELS) {
            totals[0] += px[0] as u64;
            totals[1] += px[1] as u64;
            totals[2] += px[2] as u64;
        }
    }
    let count = block.pixel_count().max(1);
    [
        (totals[0] / count) as u8,
        (totals[1] / count) as u8,
        (totals[2] / count) as u8,
    ]
}

/// Replace every block of `source` by its mean color.
pub fn mosaic(source: &PixelBuffer, block_width: i32, block_height: i32) -> Result<PixelBuffer> {
    let (block_width, block_height) = validate_block_size(block_width, block_height)?;
    let (width, height) = source.dimensions();
    let stride = source.row_stride();
    let mut out = vec![0u8; source.as_raw().len()];

    if stride > 0 {
        let band_len = stride * block_height.min(height.max(1)) as usize;
        get_pool().install(|| {
            out.par_chunks_mut(band_len)
                .enumerate()
                .for_each(|(band, band_out)| {
                    let row_start = (band * block_height as usize) as u32;
                    for block in band_blocks(width, height, row_start, block_width, block_height)
                    {
                        let mean = block_mean(source, &block);
                        for y in block.row_start..block.row_end {
                            let local = (y - row_start) as usize * stride;
                            let span = &mut band_out[local + block.col_start as usize * CHANNELS
                                ..local + block.col_end as usize * CHANNELS];
                            for px in span.chunks_exact_mut(CHANNELS) {
                                px.copy_from_slice(&mean);
                            }
                        }
                    }
                });
        });
    }

    PixelBuffer::from_raw(width, height, out)
}
