// src/engine/convolution.rs
//
// Kernel convolution with toroidal borders.
//
// The source buffer is only read; every output row is produced into a fresh
// buffer, so workers never observe a partially convolved neighborhood.
// Samples outside the image wrap to the opposite edge.

use crate::engine::buffer::{PixelBuffer, CHANNELS};
use crate::engine::pool::get_pool;
use crate::error::{Result, TrentError};
use crate::ops::ConvolutionPreset;
use rayon::prelude::*;

/// Weight grid plus the post-sum `factor` and `bias`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvolutionKernel {
    width: usize,
    height: usize,
    /// Row-major, `width * height` entries.
    weights: Vec<f64>,
    factor: f64,
    bias: f64,
}

impl ConvolutionKernel {
    pub fn new(
        width: usize,
        height: usize,
        weights: Vec<f64>,
        factor: f64,
        bias: f64,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(TrentError::invalid_parameter(
                "kernel",
                format!("{width}x{height}"),
                "kernel must have at least one cell",
            ));
        }
        if weights.len() != width * height {
            return Err(TrentError::invalid_parameter(
                "kernel",
                format!("{} weights", weights.len()),
                format!("expected {} weights for a {width}x{height} kernel", width * height),
            ));
        }
        if !factor.is_finite() || !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(TrentError::invalid_parameter(
                "kernel",
                "non-finite value",
                "weights, factor and bias must be finite",
            ));
        }
        Ok(Self {
            width,
            height,
            weights,
            factor,
            bias,
        })
    }

    /// Build from rows of equal length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R], factor: f64, bias: f64) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.iter().any(|r| r.as_ref().len() != width) {
            return Err(TrentError::invalid_parameter(
                "kernel",
                "ragged rows",
                "all kernel rows must have the same length",
            ));
        }
        let weights = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::new(width, height, weights, factor, bias)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn weight(&self, fx: usize, fy: usize) -> f64 {
        self.weights[fy * self.width + fx]
    }

    /// `width x height` grid with `diagonal` on the main diagonal.
    fn diagonal(size: usize, diagonal: &[f64], factor: f64, bias: f64) -> Self {
        let mut weights = vec![0.0; size * size];
        for (i, w) in diagonal.iter().enumerate().take(size) {
            weights[i * size + i] = *w;
        }
        Self {
            width: size,
            height: size,
            weights,
            factor,
            bias,
        }
    }

    fn fixed(size: usize, weights: &[f64], factor: f64, bias: f64) -> Self {
        Self {
            width: size,
            height: size,
            weights: weights.to_vec(),
            factor,
            bias,
        }
    }
}

#[rustfmt::skip]
const SOFT_BLUR: [f64; 9] = [
    0.0, 0.2, 0.0,
    0.2, 0.2, 0.2,
    0.0, 0.2, 0.0,
];

#[rustfmt::skip]
const SHARPEN: [f64; 9] = [
    -1.0, -1.0, -1.0,
    -1.0,  9.0, -1.0,
    -1.0, -1.0, -1.0,
];

#[rustfmt::skip]
const EMBOSS: [f64; 25] = [
    -1.0, -1.0, -1.0, -1.0, 0.0,
    -1.0, -1.0, -1.0,  0.0, 1.0,
    -1.0, -1.0,  0.0,  1.0, 1.0,
    -1.0,  0.0,  1.0,  1.0, 1.0,
     0.0,  1.0,  1.0,  1.0, 1.0,
];

impl ConvolutionPreset {
    /// Fixed kernel for this preset.
    pub fn kernel(self) -> ConvolutionKernel {
        match self {
            ConvolutionPreset::SoftBlur => ConvolutionKernel::fixed(3, &SOFT_BLUR, 1.0, 0.0),
            ConvolutionPreset::StrongBlur => {
                // Diamond of ones: |row - 2| + |col - 2| <= 2.
                let weights: Vec<f64> = (0..25i32)
                    .map(|i| {
                        let (row, col) = (i / 5, i % 5);
                        if (row - 2).abs() + (col - 2).abs() <= 2 {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect();
                ConvolutionKernel::fixed(5, &weights, 1.0 / 13.0, 0.0)
            }
            ConvolutionPreset::MotionBlur => {
                ConvolutionKernel::diagonal(9, &[1.0; 9], 1.0 / 9.0, 0.0)
            }
            ConvolutionPreset::FindEdges => {
                ConvolutionKernel::diagonal(5, &[-1.0, -2.0, 6.0, -2.0, -1.0], 1.0, 0.0)
            }
            ConvolutionPreset::Sharpen => ConvolutionKernel::fixed(3, &SHARPEN, 1.0, 0.0),
            ConvolutionPreset::Emboss => ConvolutionKernel::fixed(5, &EMBOSS, 1.0, 128.0),
        }
    }
}

#[inline]
fn wrap(coord: i64, offset: i64, len: i64) -> usize {
    (coord + offset).rem_euclid(len) as usize
}

#[inline]
fn finish(sum: f64, kernel: &ConvolutionKernel) -> u8 {
    (kernel.factor * sum + kernel.bias).floor().clamp(0.0, 255.0) as u8
}

/// Convolve `source` with `kernel` into a new buffer of the same size.
pub fn convolve(source: &PixelBuffer, kernel: &ConvolutionKernel) -> PixelBuffer {
    let (width, height) = source.dimensions();
    let stride = source.row_stride();
    if stride == 0 || height == 0 {
        return source.clone();
    }
    let mut out = vec![0u8; source.as_raw().len()];

    let (w, h) = (width as i64, height as i64);
    let (half_w, half_h) = ((kernel.width / 2) as i64, (kernel.height / 2) as i64);
    let data = source.as_raw();

    // Wrapped source column of every (x, fx) pair; shared by all rows.
    let columns: Vec<usize> = (0..w)
        .flat_map(|x| (0..kernel.width as i64).map(move |fx| wrap(x - half_w, fx, w)))
        .collect();

    get_pool().install(|| {
        out.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row_out)| {
                let rows: Vec<&[u8]> = (0..kernel.height as i64)
                    .map(|fy| {
                        let sy = wrap(y as i64 - half_h, fy, h);
                        &data[sy * stride..(sy + 1) * stride]
                    })
                    .collect();
                for (x, dst) in row_out.chunks_exact_mut(CHANNELS).enumerate() {
                    let cols = &columns[x * kernel.width..(x + 1) * kernel.width];
                    let mut sum = [0.0f64; CHANNELS];
                    for (fy, row) in rows.iter().enumerate() {
                        let weights = &kernel.weights[fy * kernel.width..(fy + 1) * kernel.width];
                        for (&sx, &weight) in cols.iter().zip(weights) {
                            let px = &row[sx * CHANNELS..sx * CHANNELS + CHANNELS];
                            sum[0] += px[0] as f64 * weight;
                            sum[1] += px[1] as f64 * weight;
                            sum[2] += px[2] as f64 * weight;
                        }
                    }
                    dst[0] = finish(sum[0], kernel);
                    dst[1] = finish(sum[1], kernel);
                    dst[2] = finish(sum[2], kernel);
                }
            });
    });

    source.with_same_dimensions(out)
}
