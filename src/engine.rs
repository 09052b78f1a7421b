// src/engine.rs
//
// The core of trent. An editing session owns two RGB buffers:
// 1. `original`, fixed at load time
// 2. `working`, rewritten by every filter
//
// Filters run row-parallel on a shared rayon pool and always produce a new
// buffer; nothing is edited in place.
//
// This file is a facade over the decomposed modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Larger images are rejected before decoding to prevent decompression bombs.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 300MB per RGB buffer, and a session holds two.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod brightness;
mod buffer;
mod channels;
mod common;
mod config;
mod contrast;
mod convolution;
mod decoder;
mod encoder;
mod io;
mod mosaic;
mod pipeline;
mod pool;
mod session;
mod tone;

pub use brightness::brighten;
pub use buffer::{PixelBuffer, Rgb};
pub use channels::mask_channels;
pub use common::{run_with_panic_policy, EngineResult};
pub use config::{EngineConfig, ENV_JPEG_QUALITY, ENV_THREADS};
pub use contrast::{high_contrast, inverse, THRESHOLD};
pub use convolution::{convolve, ConvolutionKernel};
pub use decoder::{
    check_dimensions, decode_image, decode_to_buffer, detect_format, ensure_dimensions_safe,
    DecodeLimits,
};
pub use encoder::{encode, encode_jpeg, encode_png};
pub use io::{write_atomic, Source};
pub use mosaic::{block_mean, blocks, mosaic, validate_block_size, MosaicBlock};
pub use pipeline::{downscale_plan, fast_resize, preview_png, resize_and_encode, resize_to_fit};
pub use pool::{configure_pool, get_pool};
pub use session::Session;
pub use tone::{grayscale, luma};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrentError;
    use crate::ops::{BufferKind, ConvolutionPreset, GrayTone};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        create_test_image(width, height)
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn sessions_remember_their_source_format() {
        let png = Session::from_bytes(encoded(4, 3, ImageFormat::Png)).unwrap();
        assert_eq!(png.source_format(), Some(ImageFormat::Png));
        assert_eq!(png.dimensions(), (4, 3));

        let jpeg = Session::from_bytes(encoded(4, 3, ImageFormat::Jpeg)).unwrap();
        assert_eq!(jpeg.source_format(), Some(ImageFormat::Jpeg));

        let bmp = Session::from_bytes(encoded(4, 3, ImageFormat::Bmp)).unwrap();
        assert_eq!(bmp.source_format(), Some(ImageFormat::Bmp));
    }

    #[test]
    fn png_pixels_survive_decoding_exactly() {
        let session = Session::from_bytes(encoded(5, 2, ImageFormat::Png)).unwrap();
        assert_eq!(session.original().get(4, 1).unwrap(), [4, 1, 128]);
        assert_eq!(session.working(), session.original());
    }

    #[test]
    fn save_guard_follows_source_format() {
        let png = Session::from_bytes(encoded(2, 2, ImageFormat::Png)).unwrap();
        assert!(png.output_format_for("a.png".as_ref()).is_ok());
        assert!(png.output_format_for("a.PNG".as_ref()).is_ok());
        assert!(matches!(
            png.output_format_for("a.jpg".as_ref()),
            Err(TrentError::FormatMismatch { .. })
        ));

        let jpeg = Session::from_bytes(encoded(2, 2, ImageFormat::Jpeg)).unwrap();
        assert!(jpeg.output_format_for("a.jpeg".as_ref()).is_ok());
        assert!(jpeg.output_format_for("a.JPG".as_ref()).is_ok());
        assert!(matches!(
            jpeg.output_format_for("a.png".as_ref()),
            Err(TrentError::FormatMismatch { .. })
        ));

        let bmp = Session::from_bytes(encoded(2, 2, ImageFormat::Bmp)).unwrap();
        for path in ["a.png", "a.jpg", "a.bmp"] {
            assert!(matches!(
                bmp.output_format_for(path.as_ref()),
                Err(TrentError::FormatMismatch { .. })
            ));
        }
    }

    #[test]
    fn preview_of_both_buffers() {
        let mut session = Session::from_bytes(encoded(900, 300, ImageFormat::Png)).unwrap();
        session.gray(GrayTone::Luminosity).unwrap();
        session.apply_preset(ConvolutionPreset::Emboss).unwrap();
        for kind in [BufferKind::Original, BufferKind::Modified] {
            let png = session.preview(kind).unwrap();
            let (preview, format) = decode_to_buffer(&png, DecodeLimits::default()).unwrap();
            assert_eq!(format, Some(ImageFormat::Png));
            // 900x300 -> scale min(700/300, 700/900) -> 700x233
            assert_eq!(preview.dimensions(), (700, 233));
        }
    }

    #[test]
    fn garbage_bytes_fail_without_a_session() {
        assert!(matches!(
            Session::from_bytes(b"not an image".to_vec()),
            Err(TrentError::DecodeFailed { .. })
        ));
    }

    #[test]
    fn config_limits_apply_at_load() {
        let config = EngineConfig {
            max_dimension: 8,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Session::from_bytes_with_config(encoded(9, 2, ImageFormat::Png), config),
            Err(TrentError::DimensionExceedsLimit { .. })
        ));
    }
}
