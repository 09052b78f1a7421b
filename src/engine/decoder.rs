// src/engine/decoder.rs
//
// Decoder operations: JPEG (mozjpeg), PNG (zune-png), everything else through
// the image crate. Declared dimensions are checked before pixels are
// materialised.

use crate::engine::buffer::PixelBuffer;
use crate::engine::common::{run_with_panic_policy, EngineResult};
use crate::engine::config::EngineConfig;
use crate::error::TrentError;
use image::{
    DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, ImageReader, RgbImage, RgbaImage,
};
use mozjpeg::Decompress;
use std::io::Cursor;
use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

/// Size limits applied before and after decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_dimension: u32,
    pub max_pixels: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_dimension: crate::engine::MAX_DIMENSION,
            max_pixels: crate::engine::MAX_PIXELS,
        }
    }
}

impl From<&EngineConfig> for DecodeLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            max_dimension: config.max_dimension,
            max_pixels: config.max_pixels,
        }
    }
}

/// Decode JPEG using mozjpeg (libjpeg-turbo).
pub fn decode_jpeg_mozjpeg(data: &[u8], limits: DecodeLimits) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(TrentError::decode_failed("mozjpeg: missing JPEG EOI marker"));
        }

        let decompress = Decompress::new_mem(data).map_err(|e| {
            TrentError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
        })?;

        let mut decompress = decompress.rgb().map_err(|e| {
            TrentError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
        })?;

        let width = u32::try_from(decompress.width())
            .map_err(|_| TrentError::decode_failed("mozjpeg: width overflows u32"))?;
        let height = u32::try_from(decompress.height())
            .map_err(|_| TrentError::decode_failed("mozjpeg: height overflows u32"))?;
        check_dimensions(width, height, limits)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            TrentError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat: Vec<u8> = pixels.into_iter().flatten().collect();

        let rgb = RgbImage::from_raw(width, height, flat).ok_or_else(|| {
            TrentError::decode_failed("mozjpeg: scanline data does not match dimensions")
        })?;
        Ok(DynamicImage::ImageRgb8(rgb))
    })
}

/// Decode PNG using zune-png. 16-bit input is stripped to 8 bits.
pub fn decode_png_zune(data: &[u8], limits: DecodeLimits) -> EngineResult<DynamicImage> {
    ensure_dimensions_safe(data, limits)?;
    run_with_panic_policy("decode:png", || {
        let options = DecoderOptions::default().png_set_strip_to_8bit(true);
        let mut decoder = PngDecoder::new_with_options(ZCursor::new(data), options);
        let pixels = decoder
            .decode()
            .map_err(|e| TrentError::decode_failed(format!("png: decode failed: {e}")))?;

        let (width, height) = decoder
            .dimensions()
            .ok_or_else(|| TrentError::decode_failed("png: missing header info"))?;
        let (width, height) = (width as u32, height as u32);
        check_dimensions(width, height, limits)?;

        let buf = match pixels {
            zune_core::result::DecodingResult::U8(v) => v,
            _ => return Err(TrentError::decode_failed("png: unexpected non-U8 pixel buffer")),
        };

        let colorspace = decoder
            .colorspace()
            .ok_or_else(|| TrentError::decode_failed("png: missing colorspace"))?;

        let img = match colorspace {
            ColorSpace::RGB => RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
            ColorSpace::RGBA => {
                RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8)
            }
            ColorSpace::Luma => GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8),
            ColorSpace::LumaA => {
                GrayAlphaImage::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8)
            }
            other => {
                return Err(TrentError::decode_failed(format!(
                    "png: unsupported colorspace {other:?}"
                )))
            }
        };
        img.ok_or_else(|| TrentError::decode_failed("png: pixel data does not match header"))
    })
}

/// Decode anything else the image crate understands (BMP, ...).
pub fn decode_with_image_crate(data: &[u8], limits: DecodeLimits) -> EngineResult<DynamicImage> {
    ensure_dimensions_safe(data, limits)?;
    run_with_panic_policy("decode:image", || {
        image::load_from_memory(data)
            .map_err(|e| TrentError::decode_failed(format!("decode failed: {e}")))
    })
}

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Detect once, route JPEG to mozjpeg and PNG to zune-png.
pub fn decode_image(
    bytes: &[u8],
    limits: DecodeLimits,
) -> EngineResult<(DynamicImage, Option<ImageFormat>)> {
    if bytes.is_empty() {
        return Err(TrentError::decode_failed("empty input"));
    }
    let detected = detect_format(bytes);
    let img = match detected {
        Some(ImageFormat::Jpeg) => decode_jpeg_mozjpeg(bytes, limits)?,
        Some(ImageFormat::Png) => decode_png_zune(bytes, limits)?,
        _ => decode_with_image_crate(bytes, limits)?,
    };
    Ok((img, detected))
}

/// Decode straight to an RGB pixel buffer.
pub fn decode_to_buffer(
    bytes: &[u8],
    limits: DecodeLimits,
) -> EngineResult<(PixelBuffer, Option<ImageFormat>)> {
    let (img, format) = decode_image(bytes, limits)?;
    let buffer = PixelBuffer::from_dynamic(img);
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(TrentError::decode_failed("decoded image is empty"));
    }
    Ok((buffer, format))
}

/// Reject decompression bombs before allocating pixels.
pub fn check_dimensions(width: u32, height: u32, limits: DecodeLimits) -> EngineResult<()> {
    if width > limits.max_dimension || height > limits.max_dimension {
        return Err(TrentError::dimension_exceeds_limit(
            width.max(height),
            limits.max_dimension,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > limits.max_pixels {
        return Err(TrentError::pixel_count_exceeds_limit(pixels, limits.max_pixels));
    }
    Ok(())
}

/// Read the header only and check the dimensions it declares.
pub fn ensure_dimensions_safe(bytes: &[u8], limits: DecodeLimits) -> EngineResult<()> {
    let cursor = Cursor::new(bytes);
    if let Ok(reader) = ImageReader::new(cursor).with_guessed_format() {
        if let Ok((width, height)) = reader.into_dimensions() {
            return check_dimensions(width, height, limits);
        }
    }
    Ok(())
}
