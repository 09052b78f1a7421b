// src/engine/pipeline.rs
//
// Preview pipeline: iterative downscale-to-fit followed by a PNG encode.
//
// The loop mirrors the viewer's behavior: while the image overflows the
// viewport, scale it to fit the current target bounds, then shrink those
// bounds by a fixed step. Shrinking the bounds is what guarantees the loop
// ends even when a scale factor is above 1.

use crate::engine::buffer::PixelBuffer;
use crate::engine::config::EngineConfig;
use crate::engine::encoder::encode_png;
use crate::engine::pool::get_pool;
use crate::error::{Result, TrentError};
use fast_image_resize::{self as fir, PixelType, ResizeOptions};
use image::imageops::FilterType;
use image::RgbImage;
use std::borrow::Cow;
use tracing::debug;

fn default_resize_options() -> ResizeOptions {
    ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Lanczos3))
}

/// Lanczos3 resize through fast_image_resize, falling back to
/// `image::imageops` when fir rejects the buffers.
pub fn fast_resize(src: &PixelBuffer, dst_width: u32, dst_height: u32) -> Result<PixelBuffer> {
    let (src_width, src_height) = src.dimensions();
    if (src_width, src_height) == (dst_width, dst_height) {
        return Ok(src.clone());
    }
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Err(TrentError::resize_failed(
            (src_width, src_height),
            (dst_width, dst_height),
            "cannot resize to or from an empty image",
        ));
    }

    let primary = get_pool().install(|| resize_with_fir(src, dst_width, dst_height));
    match primary {
        Ok(resized) => Ok(resized),
        Err(err) => {
            debug!(target: "trent::preview", error = %err, "fir resize failed, using image crate");
            resize_with_image_crate_fallback(src, dst_width, dst_height).map_err(|fallback_err| {
                TrentError::resize_failed(
                    (src_width, src_height),
                    (dst_width, dst_height),
                    format!("{err}; image crate fallback failed: {fallback_err}"),
                )
            })
        }
    }
}

fn resize_with_fir(
    src: &PixelBuffer,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<PixelBuffer, String> {
    let (src_width, src_height) = src.dimensions();
    let src_image = fir::images::Image::from_vec_u8(
        src_width,
        src_height,
        src.as_raw().to_vec(),
        PixelType::U8x3,
    )
    .map_err(|e| format!("fir source image error: {e:?}"))?;
    let mut dst_image = fir::images::Image::new(dst_width, dst_height, PixelType::U8x3);

    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &default_resize_options())
        .map_err(|e| format!("fir resize error: {e:?}"))?;

    PixelBuffer::from_raw(dst_width, dst_height, dst_image.into_vec())
        .map_err(|e| format!("fir output mismatch: {e}"))
}

fn resize_with_image_crate_fallback(
    src: &PixelBuffer,
    dst_width: u32,
    dst_height: u32,
) -> std::result::Result<PixelBuffer, String> {
    let (src_width, src_height) = src.dimensions();
    let rgb = RgbImage::from_raw(src_width, src_height, src.as_raw().to_vec())
        .ok_or_else(|| "failed to build rgb image for fallback resize".to_string())?;
    Ok(PixelBuffer::from(image::imageops::resize(
        &rgb,
        dst_width,
        dst_height,
        FilterType::Lanczos3,
    )))
}

/// Sizes the downscale loop will visit for a `width x height` input,
/// starting from `target` bounds. Empty when the input already fits.
pub fn downscale_plan(
    width: u32,
    height: u32,
    target: (u32, u32),
    config: &EngineConfig,
) -> Vec<(u32, u32)> {
    let (mut w, mut h) = (width, height);
    let (mut target_w, mut target_h) = target;
    let mut plan = Vec::new();
    if w == 0 || h == 0 {
        return plan;
    }
    while w > config.preview_max_width || h > config.preview_max_height {
        let scale = (target_h as f64 / h as f64).min(target_w as f64 / w as f64);
        w = ((w as f64 * scale) as u32).max(1);
        h = ((h as f64 * scale) as u32).max(1);
        plan.push((w, h));
        target_w = target_w.saturating_sub(config.preview_step);
        target_h = target_h.saturating_sub(config.preview_step);
    }
    plan
}

/// Downscale until the buffer fits the configured viewport.
pub fn resize_to_fit<'a>(
    buffer: &'a PixelBuffer,
    target_width: u32,
    target_height: u32,
    config: &EngineConfig,
) -> Result<Cow<'a, PixelBuffer>> {
    let (width, height) = buffer.dimensions();
    let plan = downscale_plan(width, height, (target_width, target_height), config);
    let mut current = Cow::Borrowed(buffer);
    for (iteration, (w, h)) in plan.into_iter().enumerate() {
        debug!(
            target: "trent::preview",
            iteration,
            from_width = current.width(),
            from_height = current.height(),
            to_width = w,
            to_height = h,
            "downscale step"
        );
        current = Cow::Owned(fast_resize(&current, w, h)?);
    }
    Ok(current)
}

/// Fit `buffer` into the viewport and encode it as PNG.
pub fn resize_and_encode(
    buffer: &PixelBuffer,
    target_width: u32,
    target_height: u32,
    config: &EngineConfig,
) -> Result<Vec<u8>> {
    config.validate()?;
    let fitted = resize_to_fit(buffer, target_width, target_height, config)?;
    encode_png(&fitted, None)
}

/// Preview with the configured initial bounds.
pub fn preview_png(buffer: &PixelBuffer, config: &EngineConfig) -> Result<Vec<u8>> {
    let (target_width, target_height) = config.preview_target;
    resize_and_encode(buffer, target_width, target_height, config)
}
