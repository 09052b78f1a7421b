// lib.rs
//
// trent: a raster image editing engine
//
// - Nine grayscale tones, brightness, channel masks
// - Block mosaic and kernel convolution with toroidal borders
// - High-contrast / inverse thresholds
// - Viewport-fitted PNG previews and format-guarded saves
//
// Everything runs against an in-memory `Session`; there is no UI here.

pub mod engine;
pub mod error;
pub mod ops;

pub use engine::{ConvolutionKernel, EngineConfig, PixelBuffer, Rgb, Session};
pub use error::{ErrorCategory, Result, TrentError};
pub use ops::{
    has_supported_extension, BufferKind, ConvolutionPreset, Filter, GrayTone, OperationContract,
    OperationEffect, OutputFormat, SUPPORTED_EXTENSIONS,
};

/// Crate version, for callers that log it next to saved files.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
