// src/engine/session.rs
//
// Editing session: an immutable original buffer, a working buffer the
// filters rewrite, and the format the image was decoded from.
//
// Every filter is all-or-nothing. The new buffer is computed first and only
// then swapped into `working`; on error the session is left as it was.
// Filters whose contract has RESETS_WORKING read from `original`, the others
// (channel mask, convolution) read from the current `working` buffer.

use crate::engine::brightness::brighten;
use crate::engine::buffer::PixelBuffer;
use crate::engine::channels::mask_channels;
use crate::engine::config::EngineConfig;
use crate::engine::contrast::{high_contrast, inverse};
use crate::engine::convolution::{convolve, ConvolutionKernel};
use crate::engine::decoder::{decode_to_buffer, DecodeLimits};
use crate::engine::encoder::encode;
use crate::engine::io::{write_atomic, Source};
use crate::engine::mosaic::mosaic;
use crate::engine::pipeline::preview_png;
use crate::engine::pool::configure_pool;
use crate::engine::tone::grayscale;
use crate::error::{Result, TrentError};
use crate::ops::{
    BufferKind, ConvolutionPreset, Filter, GrayTone, OperationContract, OperationEffect,
    OutputFormat,
};
use image::ImageFormat;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct Session {
    original: PixelBuffer,
    working: PixelBuffer,
    source_format: Option<ImageFormat>,
    config: EngineConfig,
}

fn format_label(format: Option<ImageFormat>) -> String {
    match format {
        Some(f) => f
            .extensions_str()
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| format!("{f:?}").to_lowercase()),
        None => "unknown".to_string(),
    }
}

impl Session {
    /// Open and decode an image file with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, EngineConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        config.validate()?;
        let source = Source::map_file(path)?;
        let session = Self::decode(&source, config)?;
        info!(
            target: "trent::io",
            path = %path.display(),
            format = %format_label(session.source_format),
            width = session.original.width(),
            height = session.original.height(),
            "image loaded"
        );
        Ok(session)
    }

    /// Decode an in-memory encoded image.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        Self::from_bytes_with_config(bytes, EngineConfig::default())
    }

    pub fn from_bytes_with_config(bytes: impl Into<Vec<u8>>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let source = Source::Memory(Arc::new(bytes.into()));
        Self::decode(&source, config)
    }

    /// Start from raw pixels. The session has no source format, so any path
    /// with a supported extension can be saved to.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        let config = EngineConfig::default();
        configure_pool(config.threads);
        Self {
            working: buffer.clone(),
            original: buffer,
            source_format: None,
            config,
        }
    }

    /// Replace the configuration (e.g. save codecs) of an existing session.
    pub fn with_config(mut self, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        configure_pool(config.threads);
        self.config = config;
        Ok(self)
    }

    fn decode(source: &Source, config: EngineConfig) -> Result<Self> {
        configure_pool(config.threads);
        let (buffer, source_format) = decode_to_buffer(source.bytes(), DecodeLimits::from(&config))?;
        Ok(Self {
            working: buffer.clone(),
            original: buffer,
            source_format,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `(width, height)` of the image. Filters never change it.
    pub fn dimensions(&self) -> (u32, u32) {
        self.original.dimensions()
    }

    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    pub fn working(&self) -> &PixelBuffer {
        &self.working
    }

    pub fn buffer(&self, kind: BufferKind) -> &PixelBuffer {
        match kind {
            BufferKind::Original => &self.original,
            BufferKind::Modified => &self.working,
        }
    }

    /// Format detected when the image was decoded; `None` for raw buffers.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    /// Discard every edit: working becomes a copy of the original.
    pub fn revert(&mut self) {
        self.working = self.original.clone();
        debug!(target: "trent::filter", op = "revert", "working buffer reset");
    }

    pub fn gray(&mut self, tone: GrayTone) -> Result<()> {
        self.apply(&Filter::Gray { tone })
    }

    /// Grayscale by legacy tone id (1..=9).
    pub fn gray_by_id(&mut self, tone: u8) -> Result<()> {
        self.gray(GrayTone::from_id(tone)?)
    }

    pub fn brightness(&mut self, delta: i32) -> Result<()> {
        self.apply(&Filter::Brightness { delta })
    }

    pub fn channel_mask(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.apply(&Filter::ChannelMask { red, green, blue })
    }

    pub fn mosaic(&mut self, block_width: i32, block_height: i32) -> Result<()> {
        self.apply(&Filter::Mosaic {
            block_width,
            block_height,
        })
    }

    pub fn apply_preset(&mut self, preset: ConvolutionPreset) -> Result<()> {
        self.apply(&Filter::Convolution { preset })
    }

    /// Convolution by preset name (canonical or legacy label).
    pub fn apply_preset_by_name(&mut self, name: &str) -> Result<()> {
        self.apply_preset(ConvolutionPreset::from_name(name)?)
    }

    /// Convolve the working buffer with an arbitrary kernel.
    pub fn convolve(&mut self, kernel: &ConvolutionKernel) {
        let next = convolve(&self.working, kernel);
        self.commit(
            OperationContract::new("convolve", OperationEffect::NEIGHBORHOOD),
            next,
        );
    }

    pub fn high_contrast(&mut self) -> Result<()> {
        self.apply(&Filter::HighContrast)
    }

    pub fn inverse(&mut self) -> Result<()> {
        self.apply(&Filter::Inverse)
    }

    /// Run one filter against the buffer its contract names.
    pub fn apply(&mut self, filter: &Filter) -> Result<()> {
        let contract = filter.contract();
        let source = if contract.resets_before_running() {
            &self.original
        } else {
            &self.working
        };

        let next = match *filter {
            Filter::Gray { tone } => grayscale(source, tone),
            Filter::Brightness { delta } => brighten(source, delta),
            Filter::ChannelMask { red, green, blue } => mask_channels(source, red, green, blue),
            Filter::Mosaic {
                block_width,
                block_height,
            } => mosaic(source, block_width, block_height)?,
            Filter::Convolution { preset } => convolve(source, &preset.kernel()),
            Filter::HighContrast => high_contrast(source),
            Filter::Inverse => inverse(source),
        };

        self.commit(contract, next);
        Ok(())
    }

    /// Apply filters in order, stopping at the first error. Filters that ran
    /// before the failing one keep their effect.
    pub fn apply_all(&mut self, filters: &[Filter]) -> Result<()> {
        filters.iter().try_for_each(|filter| self.apply(filter))
    }

    fn commit(&mut self, contract: OperationContract, next: PixelBuffer) {
        debug_assert_eq!(next.dimensions(), self.original.dimensions());
        debug_assert!(
            !contract.effects.contains(OperationEffect::GRAYSCALE_OUTPUT)
                || next.pixels().all(|[r, g, b]| r == g && g == b),
            "{} produced colour pixels",
            contract.name
        );
        debug_assert!(
            !contract.effects.contains(OperationEffect::BINARY_OUTPUT)
                || next.pixels().all(|p| p == [0, 0, 0] || p == [255, 255, 255]),
            "{} produced non-binary pixels",
            contract.name
        );
        debug!(
            target: "trent::filter",
            op = contract.name,
            width = next.width(),
            height = next.height(),
            reset = contract.resets_before_running(),
            effects = ?contract.effects,
            "filter applied"
        );
        self.working = next;
    }

    /// PNG preview of either buffer, downscaled to the configured viewport.
    pub fn preview(&self, kind: BufferKind) -> Result<Vec<u8>> {
        preview_png(self.buffer(kind), &self.config)
    }

    /// Output format a save to `path` would use, or the reason it is refused.
    ///
    /// PNG sources only save to `.png`, JPEG sources only to `.jpg`/`.jpeg`,
    /// raw-buffer sessions to any supported extension. Any other decoded
    /// format refuses every path.
    ///
    /// Extensions are compared case-insensitively, so a PNG source also
    /// accepts `photo.PNG` and a JPEG source accepts `photo.JPG`.
    pub fn output_format_for(&self, path: &Path) -> Result<OutputFormat> {
        let requested = OutputFormat::from_path(path, self.config.jpeg_quality);
        let mismatch = || {
            TrentError::format_mismatch(format_label(self.source_format), path.display().to_string())
        };
        match self.source_format {
            None => requested,
            Some(ImageFormat::Png) => match requested {
                Ok(OutputFormat::Png) => Ok(OutputFormat::Png),
                _ => Err(mismatch()),
            },
            Some(ImageFormat::Jpeg) => match requested {
                Ok(format @ OutputFormat::Jpeg { .. }) => Ok(format),
                _ => Err(mismatch()),
            },
            Some(_) => Err(mismatch()),
        }
    }

    /// Save the working buffer. Returns the number of bytes written.
    ///
    /// On `FormatMismatch` nothing is written, not even a temp file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let format = match self.output_format_for(path) {
            Ok(format) => format,
            Err(err) => {
                warn!(
                    target: "trent::io",
                    path = %path.display(),
                    source_format = %format_label(self.source_format),
                    error = %err,
                    "save refused"
                );
                return Err(err);
            }
        };

        let bytes = encode(&self.working, format, self.config.png_optimization)?;
        let written = write_atomic(path, &bytes)?;
        info!(
            target: "trent::io",
            path = %path.display(),
            format = format.name(),
            width = self.working.width(),
            height = self.working.height(),
            bytes = written,
            "image saved"
        );
        Ok(written)
    }
}
