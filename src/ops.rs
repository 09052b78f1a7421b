// src/ops.rs
//
// Filter descriptions.
// These are cheap to create and store - the pixel work happens in the engine.

use crate::error::{Result, TrentError};
use bitflags::bitflags;
use std::path::Path;

/// Grayscale formulas, selected by the legacy tone ids 1..=9.
///
/// All weighted formulas truncate toward zero; they never round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrayTone {
    /// 1: `(r + g + b) / 3`
    Average,
    /// 2: `r*0.30 + g*0.59 + b*0.11`
    Weighted,
    /// 3: ITU-R BT.709 `r*0.2126 + g*0.7152 + b*0.0722`
    Luminosity,
    /// 4: `(max + min) / 2`
    Lightness,
    /// 5: `max(r, g, b)`
    Max,
    /// 6: `min(r, g, b)`
    Min,
    /// 7: red channel
    Red,
    /// 8: green channel
    Green,
    /// 9: blue channel
    Blue,
}

impl GrayTone {
    pub const ALL: [GrayTone; 9] = [
        GrayTone::Average,
        GrayTone::Weighted,
        GrayTone::Luminosity,
        GrayTone::Lightness,
        GrayTone::Max,
        GrayTone::Min,
        GrayTone::Red,
        GrayTone::Green,
        GrayTone::Blue,
    ];

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1..=9 => Ok(Self::ALL[(id - 1) as usize]),
            other => Err(TrentError::invalid_parameter(
                "tone",
                other.to_string(),
                "gray tone must be between 1 and 9",
            )),
        }
    }

    /// Accepts a bare id ("3") or the menu label ("Tono 3").
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        let digits = trimmed
            .strip_prefix("Tono")
            .or_else(|| trimmed.strip_prefix("tono"))
            .unwrap_or(trimmed)
            .trim();
        let id = digits.parse::<u8>().map_err(|_| {
            TrentError::invalid_parameter(
                "tone",
                label.to_string(),
                "expected a gray tone id between 1 and 9",
            )
        })?;
        Self::from_id(id)
    }

    pub fn id(self) -> u8 {
        match self {
            GrayTone::Average => 1,
            GrayTone::Weighted => 2,
            GrayTone::Luminosity => 3,
            GrayTone::Lightness => 4,
            GrayTone::Max => 5,
            GrayTone::Min => 6,
            GrayTone::Red => 7,
            GrayTone::Green => 8,
            GrayTone::Blue => 9,
        }
    }
}

/// Named convolution kernels. Weights live in `engine::convolution`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConvolutionPreset {
    SoftBlur,
    StrongBlur,
    MotionBlur,
    FindEdges,
    Sharpen,
    Emboss,
}

impl ConvolutionPreset {
    pub const ALL: [ConvolutionPreset; 6] = [
        ConvolutionPreset::SoftBlur,
        ConvolutionPreset::StrongBlur,
        ConvolutionPreset::MotionBlur,
        ConvolutionPreset::FindEdges,
        ConvolutionPreset::Sharpen,
        ConvolutionPreset::Emboss,
    ];

    /// Get the preset by canonical name or legacy menu label (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "soft-blur" | "suave" => Ok(Self::SoftBlur),
            "strong-blur" | "fuerte" => Ok(Self::StrongBlur),
            "motion-blur" | "motion blur" => Ok(Self::MotionBlur),
            "find-edges" | "encontrar bordes" => Ok(Self::FindEdges),
            "sharpen" => Ok(Self::Sharpen),
            "emboss" => Ok(Self::Emboss),
            _ => Err(TrentError::invalid_parameter(
                "preset",
                name.to_string(),
                "available: soft-blur, strong-blur, motion-blur, find-edges, sharpen, emboss",
            )),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConvolutionPreset::SoftBlur => "soft-blur",
            ConvolutionPreset::StrongBlur => "strong-blur",
            ConvolutionPreset::MotionBlur => "motion-blur",
            ConvolutionPreset::FindEdges => "find-edges",
            ConvolutionPreset::Sharpen => "sharpen",
            ConvolutionPreset::Emboss => "emboss",
        }
    }
}

bitflags! {
    /// What a filter does to the session state besides writing pixels.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OperationEffect: u8 {
        /// Working buffer is replaced by a copy of the original before the pass.
        const RESETS_WORKING = 1 << 0;
        /// Output pixels always have r == g == b.
        const GRAYSCALE_OUTPUT = 1 << 1;
        /// Output pixels are pure black or pure white.
        const BINARY_OUTPUT = 1 << 2;
        /// Output pixel depends on neighbouring input pixels.
        const NEIGHBORHOOD = 1 << 3;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationContract {
    pub name: &'static str,
    pub effects: OperationEffect,
}

impl OperationContract {
    pub const fn new(name: &'static str, effects: OperationEffect) -> Self {
        Self { name, effects }
    }

    /// Filters without this flag compose with whatever is in the working buffer.
    pub fn resets_before_running(&self) -> bool {
        self.effects.contains(OperationEffect::RESETS_WORKING)
    }
}

/// Image filters that can be applied to a session.
///
/// Each filter is self-contained: it carries every parameter it needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// Grayscale conversion with one of the nine tone formulas
    Gray { tone: GrayTone },

    /// Additive brightness, saturating at 0 and 255
    Brightness { delta: i32 },

    /// Per-channel bitwise AND mask
    ChannelMask { red: u8, green: u8, blue: u8 },

    /// Block-average pixelation; sizes are validated at apply time
    Mosaic { block_width: i32, block_height: i32 },

    /// Preset kernel convolution with toroidal borders
    Convolution { preset: ConvolutionPreset },

    /// Grayscale then threshold: bright pixels become white
    HighContrast,

    /// Grayscale then threshold: bright pixels become black
    Inverse,
}

impl Filter {
    pub fn contract(&self) -> OperationContract {
        match self {
            Filter::Gray { .. } => OperationContract::new(
                "gray",
                OperationEffect::RESETS_WORKING.union(OperationEffect::GRAYSCALE_OUTPUT),
            ),
            Filter::Brightness { .. } => {
                OperationContract::new("brightness", OperationEffect::RESETS_WORKING)
            }
            Filter::ChannelMask { .. } => {
                OperationContract::new("channel-mask", OperationEffect::empty())
            }
            Filter::Mosaic { .. } => OperationContract::new(
                "mosaic",
                OperationEffect::RESETS_WORKING.union(OperationEffect::NEIGHBORHOOD),
            ),
            Filter::Convolution { preset } => {
                OperationContract::new(preset.name(), OperationEffect::NEIGHBORHOOD)
            }
            Filter::HighContrast => OperationContract::new(
                "high-contrast",
                OperationEffect::RESETS_WORKING
                    .union(OperationEffect::GRAYSCALE_OUTPUT)
                    .union(OperationEffect::BINARY_OUTPUT),
            ),
            Filter::Inverse => OperationContract::new(
                "inverse",
                OperationEffect::RESETS_WORKING
                    .union(OperationEffect::GRAYSCALE_OUTPUT)
                    .union(OperationEffect::BINARY_OUTPUT),
            ),
        }
    }

    /// Build a filter from textual caller input, e.g. `("mosaic", ["8", "8"])`.
    ///
    /// Convolution presets are addressed directly by name (`"sharpen"`).
    pub fn parse(name: &str, args: &[&str]) -> Result<Self> {
        let key = name.trim().to_lowercase();
        match key.as_str() {
            "gray" | "grey" => {
                let [tone] = expect_args::<1>(&key, args)?;
                Ok(Filter::Gray {
                    tone: GrayTone::from_label(tone)?,
                })
            }
            "brightness" => {
                let [delta] = expect_args::<1>(&key, args)?;
                Ok(Filter::Brightness {
                    delta: parse_number("delta", delta)?,
                })
            }
            "channel-mask" | "rgb" => {
                let [red, green, blue] = expect_args::<3>(&key, args)?;
                Ok(Filter::ChannelMask {
                    red: parse_number("red", red)?,
                    green: parse_number("green", green)?,
                    blue: parse_number("blue", blue)?,
                })
            }
            "mosaic" => {
                let [width, height] = expect_args::<2>(&key, args)?;
                Ok(Filter::Mosaic {
                    block_width: parse_number("block_width", width)?,
                    block_height: parse_number("block_height", height)?,
                })
            }
            "high-contrast" => {
                expect_args::<0>(&key, args)?;
                Ok(Filter::HighContrast)
            }
            "inverse" => {
                expect_args::<0>(&key, args)?;
                Ok(Filter::Inverse)
            }
            _ => {
                let preset = ConvolutionPreset::from_name(&key).map_err(|_| {
                    TrentError::invalid_parameter(
                        "filter",
                        name.to_string(),
                        "unknown filter name",
                    )
                })?;
                expect_args::<0>(&key, args)?;
                Ok(Filter::Convolution { preset })
            }
        }
    }
}

fn expect_args<'a, const N: usize>(filter: &str, args: &[&'a str]) -> Result<[&'a str; N]> {
    <[&str; N]>::try_from(args).map_err(|_| {
        TrentError::invalid_parameter(
            "arguments",
            args.join(" "),
            format!("{filter} takes {N} argument(s)"),
        )
    })
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse::<T>().map_err(|_| {
        TrentError::invalid_parameter(name, raw.to_string(), "not a valid integer in range")
    })
}

/// Which of the two session buffers to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Original,
    Modified,
}

/// Output format for persisted files
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
}

impl OutputFormat {
    /// Infer the format from the path extension (png, jpg, jpeg).
    pub fn from_path(path: &Path, jpeg_quality: u8) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg {
                quality: jpeg_quality,
            }),
            other => Err(TrentError::unsupported_format(if other.is_empty() {
                "<no extension>".to_string()
            } else {
                other.to_string()
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg { .. } => "jpeg",
            OutputFormat::Png => "png",
        }
    }
}

/// Extensions a caller should accept when offering files to open.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Case-insensitive check against `SUPPORTED_EXTENSIONS`.
pub fn has_supported_extension(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| e.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
