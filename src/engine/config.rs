// src/engine/config.rs
//
// Engine configuration: preview viewport, save codecs, decode limits and
// worker count.

use crate::engine::{MAX_DIMENSION, MAX_PIXELS};
use crate::error::{Result, TrentError};
use tracing::warn;

const PREVIEW_MAX_WIDTH: u32 = 720;
const PREVIEW_MAX_HEIGHT: u32 = 450;
const PREVIEW_TARGET: (u32, u32) = (700, 700);
const PREVIEW_STEP: u32 = 100;
const DEFAULT_PNG_OPTIMIZATION: u8 = 2;
const DEFAULT_JPEG_QUALITY: u8 = 90;

pub const ENV_THREADS: &str = "TRENT_THREADS";
pub const ENV_JPEG_QUALITY: &str = "TRENT_JPEG_QUALITY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Viewport cap; the preview is downscaled until it fits.
    pub preview_max_width: u32,
    pub preview_max_height: u32,
    /// Initial `(width, height)` bounds of the downscale loop.
    pub preview_target: (u32, u32),
    /// Amount both bounds shrink per iteration.
    pub preview_step: u32,
    /// oxipng preset for saved PNGs. `None` writes the encoder output as is.
    pub png_optimization: Option<u8>,
    pub jpeg_quality: u8,
    pub max_dimension: u32,
    pub max_pixels: u64,
    /// Worker count for the global pool; `None` uses available parallelism.
    pub threads: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_max_width: PREVIEW_MAX_WIDTH,
            preview_max_height: PREVIEW_MAX_HEIGHT,
            preview_target: PREVIEW_TARGET,
            preview_step: PREVIEW_STEP,
            png_optimization: Some(DEFAULT_PNG_OPTIMIZATION),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_dimension: MAX_DIMENSION,
            max_pixels: MAX_PIXELS,
            threads: None,
        }
    }
}

impl EngineConfig {
    /// Skip oxipng on save. Useful in tests and batch tools.
    pub fn fast() -> Self {
        Self {
            png_optimization: None,
            ..Self::default()
        }
    }

    /// Tighter decode limits for untrusted input.
    pub fn strict() -> Self {
        Self {
            max_dimension: 8192,
            max_pixels: 40_000_000,
            ..Self::default()
        }
    }

    /// Defaults overridden by `TRENT_THREADS` and `TRENT_JPEG_QUALITY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_THREADS) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.threads = Some(n),
                _ => warn!(target: "trent::config", var = ENV_THREADS, value = %raw, "ignoring invalid value"),
            }
        }

        if let Some(raw) = lookup(ENV_JPEG_QUALITY) {
            match raw.trim().parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => config.jpeg_quality = q,
                _ => warn!(target: "trent::config", var = ENV_JPEG_QUALITY, value = %raw, "ignoring invalid value"),
            }
        }

        config
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn with_png_optimization(mut self, level: Option<u8>) -> Self {
        self.png_optimization = level;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.preview_max_width == 0 || self.preview_max_height == 0 {
            return Err(TrentError::invalid_parameter(
                "preview_max",
                format!("{}x{}", self.preview_max_width, self.preview_max_height),
                "preview viewport must be non-empty",
            ));
        }
        if self.preview_target.0 == 0 || self.preview_target.1 == 0 {
            return Err(TrentError::invalid_parameter(
                "preview_target",
                format!("{}x{}", self.preview_target.0, self.preview_target.1),
                "preview target must be non-empty",
            ));
        }
        if self.preview_step == 0 {
            return Err(TrentError::invalid_parameter(
                "preview_step",
                "0",
                "step must be positive or the downscale loop never ends",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(TrentError::invalid_parameter(
                "jpeg_quality",
                self.jpeg_quality.to_string(),
                "quality must be between 1 and 100",
            ));
        }
        if let Some(level) = self.png_optimization {
            if level > 6 {
                return Err(TrentError::invalid_parameter(
                    "png_optimization",
                    level.to_string(),
                    "oxipng presets range from 0 to 6",
                ));
            }
        }
        if self.max_dimension == 0 || self.max_pixels == 0 {
            return Err(TrentError::invalid_parameter(
                "limits",
                format!("{} / {}", self.max_dimension, self.max_pixels),
                "decode limits must be positive",
            ));
        }
        if self.threads == Some(0) {
            return Err(TrentError::invalid_parameter(
                "threads",
                "0",
                "use None for the default worker count",
            ));
        }
        Ok(())
    }
}
