// src/engine/encoder.rs
//
// Encoder operations: PNG (image + optional oxipng pass) and JPEG (mozjpeg).

use crate::engine::buffer::PixelBuffer;
use crate::engine::common::{run_with_panic_policy, EngineResult};
use crate::error::TrentError;
use crate::ops::OutputFormat;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use mozjpeg::{ColorSpace, Compress, ScanMode};

fn ensure_encodable(buffer: &PixelBuffer, format: &'static str) -> EngineResult<()> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(TrentError::encode_failed(
            format,
            "width or height is zero",
        ));
    }
    Ok(())
}

/// Encode to PNG. `optimization` is an oxipng preset (0..=6); `None` skips
/// the recompression pass.
pub fn encode_png(buffer: &PixelBuffer, optimization: Option<u8>) -> EngineResult<Vec<u8>> {
    ensure_encodable(buffer, "png")?;
    run_with_panic_policy("encode:png", || {
        let (w, h) = buffer.dimensions();
        let mut buf = Vec::with_capacity(buffer.as_raw().len() / 2 + 1024);
        PngEncoder::new(&mut buf)
            .write_image(buffer.as_raw(), w, h, ExtendedColorType::Rgb8)
            .map_err(|e| TrentError::encode_failed("png", format!("PNG encode failed: {e}")))?;

        let Some(level) = optimization else {
            return Ok(buf);
        };

        // Lossless recompression; ancillary chunks are left alone.
        let mut options = oxipng::Options::from_preset(level.min(6));
        options.strip = oxipng::StripChunks::None;
        oxipng::optimize_from_memory(&buf, &options).map_err(|e| {
            TrentError::encode_failed("png", format!("oxipng optimization failed: {e}"))
        })
    })
}

/// Encode to baseline-compatible progressive JPEG using mozjpeg.
pub fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> EngineResult<Vec<u8>> {
    ensure_encodable(buffer, "jpeg")?;
    run_with_panic_policy("encode:jpeg", || {
        let quality = quality.clamp(1, 100);
        let (w, h) = buffer.dimensions();

        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(w as usize, h as usize);
        comp.set_color_space(ColorSpace::JCS_YCbCr);
        comp.set_quality(quality as f32);
        comp.set_chroma_sampling_pixel_sizes((2, 2), (2, 2));
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);
        comp.set_optimize_scans(true);
        comp.set_scan_optimization_mode(ScanMode::AllComponentsTogether);

        let mut output = Vec::with_capacity((w as usize * h as usize * 3 / 10).max(4096));
        {
            let mut writer = comp.start_compress(&mut output).map_err(|e| {
                TrentError::encode_failed("jpeg", format!("mozjpeg: failed to start compress: {e:?}"))
            })?;

            for row in buffer.as_raw().chunks(buffer.row_stride()) {
                writer.write_scanlines(row).map_err(|e| {
                    TrentError::encode_failed(
                        "jpeg",
                        format!("mozjpeg: failed to write scanlines: {e:?}"),
                    )
                })?;
            }

            writer.finish().map_err(|e| {
                TrentError::encode_failed("jpeg", format!("mozjpeg: failed to finish: {e:?}"))
            })?;
        }
        Ok(output)
    })
}

/// Encode for persistence.
pub fn encode(
    buffer: &PixelBuffer,
    format: OutputFormat,
    png_optimization: Option<u8>,
) -> EngineResult<Vec<u8>> {
    match format {
        OutputFormat::Png => encode_png(buffer, png_optimization),
        OutputFormat::Jpeg { quality } => encode_jpeg(buffer, quality),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::decoder::{decode_to_buffer, DecodeLimits};

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            [(x * 255 / width) as u8, (y * 255 / height) as u8, 128]
        })
    }

    #[test]
    fn png_is_lossless_with_and_without_oxipng() {
        let src = gradient(31, 17);
        for level in [None, Some(0), Some(2)] {
            let bytes = encode_png(&src, level).unwrap();
            assert_eq!(&bytes[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
            let (decoded, _) = decode_to_buffer(&bytes, DecodeLimits::default()).unwrap();
            assert_eq!(decoded, src);
        }
    }

    #[test]
    fn jpeg_has_markers_and_dimensions() {
        let src = gradient(40, 24);
        let bytes = encode_jpeg(&src, 85).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
        let (decoded, _) = decode_to_buffer(&bytes, DecodeLimits::default()).unwrap();
        assert_eq!(decoded.dimensions(), (40, 24));
    }

    #[test]
    fn jpeg_quality_affects_size() {
        let src = gradient(96, 96);
        let low = encode_jpeg(&src, 10).unwrap();
        let high = encode_jpeg(&src, 95).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn empty_buffers_are_rejected() {
        let empty = PixelBuffer::new(0, 4);
        assert!(matches!(
            encode_png(&empty, None),
            Err(TrentError::EncodeFailed { .. })
        ));
        assert!(encode_jpeg(&empty, 90).is_err());
    }

    #[test]
    fn encode_dispatches_on_format() {
        let src = gradient(8, 8);
        let png = encode(&src, OutputFormat::Png, None).unwrap();
        let jpeg = encode(&src, OutputFormat::Jpeg { quality: 80 }, None).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }
}
