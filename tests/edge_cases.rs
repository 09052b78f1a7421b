// tests/edge_cases.rs
//
// Edge case tests for trent
// Tests boundary values, invalid inputs, and error handling

use trent::engine::{
    check_dimensions, convolve, downscale_plan, encode_jpeg, encode_png, mosaic, DecodeLimits,
};
use trent::{
    ConvolutionKernel, ConvolutionPreset, EngineConfig, ErrorCategory, Filter, GrayTone,
    PixelBuffer, Session, TrentError,
};

fn gradient(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, |x, y| {
        [(x % 256) as u8, (y % 256) as u8, 128]
    })
}

mod minimal_image_tests {
    use super::*;

    #[test]
    fn test_every_filter_on_one_pixel() {
        let mut session = Session::from_buffer(PixelBuffer::from_pixel(1, 1, [200, 100, 50]));
        for tone in GrayTone::ALL {
            session.gray(tone).unwrap();
        }
        session.brightness(-1000).unwrap();
        assert_eq!(session.working().get(0, 0).unwrap(), [0, 0, 0]);
        session.mosaic(3, 3).unwrap();
        assert_eq!(session.working().get(0, 0).unwrap(), [200, 100, 50]);
        for preset in ConvolutionPreset::ALL {
            session.apply_preset(preset).unwrap();
            assert_eq!(session.working().dimensions(), (1, 1));
        }
        session.high_contrast().unwrap();
        assert_eq!(session.working().get(0, 0).unwrap(), [0, 0, 0]);
    }

    #[test]
    fn test_one_pixel_encodes() {
        let px = PixelBuffer::from_pixel(1, 1, [1, 2, 3]);
        assert!(encode_png(&px, Some(2)).is_ok());
        assert!(encode_jpeg(&px, 90).is_ok());
    }

    #[test]
    fn test_single_row_and_column_convolution_wraps() {
        // Every kernel row samples the same image row; uniform input stays fixed.
        let row = PixelBuffer::from_pixel(5, 1, [40, 40, 40]);
        assert_eq!(convolve(&row, &ConvolutionPreset::Sharpen.kernel()), row);
        let col = PixelBuffer::from_pixel(1, 5, [40, 40, 40]);
        assert_eq!(convolve(&col, &ConvolutionPreset::SoftBlur.kernel()), col);
    }
}

mod mosaic_boundaries {
    use super::*;

    #[test]
    fn test_non_positive_block_sizes_leave_working_unchanged() {
        let mut session = Session::from_buffer(gradient(10, 10));
        session.brightness(7).unwrap();
        let before = session.working().clone();
        for (w, h) in [(0, 1), (1, 0), (-5, 5), (5, -5), (i32::MIN, i32::MIN)] {
            let err = session.mosaic(w, h).unwrap_err();
            assert!(matches!(err, TrentError::InvalidParameter { .. }));
            assert_eq!(err.category(), ErrorCategory::UserError);
            assert_eq!(session.working(), &before);
        }
    }

    #[test]
    fn test_huge_block_sizes_are_one_block() {
        let src = gradient(9, 7);
        let whole = mosaic(&src, 9, 7).unwrap();
        assert_eq!(mosaic(&src, i32::MAX, i32::MAX).unwrap(), whole);
        let first = whole.get(0, 0).unwrap();
        assert!(whole.pixels().all(|p| p == first));
    }

    #[test]
    fn test_blocks_not_dividing_the_image() {
        let src = gradient(10, 3);
        let out = mosaic(&src, 4, 2).unwrap();
        // Last column block covers x = 8..10, first row band y = 0..2.
        // red mean (8 + 9 + 8 + 9) / 4 = 8, green mean (0 + 0 + 1 + 1) / 4 = 0
        assert_eq!(out.get(9, 0).unwrap(), [8, 0, 128]);
        // Bottom band is a single row (y = 2).
        assert_eq!(out.get(0, 2).unwrap(), [1, 2, 128]);
    }
}

mod parameter_validation {
    use super::*;

    #[test]
    fn test_unknown_gray_tones() {
        for id in [0u8, 10, 99] {
            let mut session = Session::from_buffer(gradient(3, 3));
            assert!(matches!(
                session.gray_by_id(id),
                Err(TrentError::InvalidParameter { .. })
            ));
            assert_eq!(session.working(), session.original());
        }
    }

    #[test]
    fn test_unknown_preset_name() {
        let mut session = Session::from_buffer(gradient(3, 3));
        assert!(matches!(
            session.apply_preset_by_name("gaussian"),
            Err(TrentError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Filter::parse("unsharp", &[]),
            Err(TrentError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_extreme_brightness_deltas() {
        let mut session = Session::from_buffer(gradient(4, 4));
        session.brightness(i32::MAX).unwrap();
        assert!(session.working().pixels().all(|p| p == [255, 255, 255]));
        session.brightness(i32::MIN).unwrap();
        assert!(session.working().pixels().all(|p| p == [0, 0, 0]));
    }

    #[test]
    fn test_custom_kernels() {
        assert!(ConvolutionKernel::new(3, 3, vec![0.0; 8], 1.0, 0.0).is_err());
        assert!(ConvolutionKernel::new(1, 1, vec![1.0], f64::INFINITY, 0.0).is_err());

        // Even-sized kernels are accepted; the anchor is width / 2.
        let even = ConvolutionKernel::new(2, 2, vec![0.25; 4], 1.0, 0.0).unwrap();
        let mut session = Session::from_buffer(PixelBuffer::from_pixel(3, 3, [80, 80, 80]));
        session.convolve(&even);
        assert!(session.working().pixels().all(|p| p == [80, 80, 80]));
    }

    #[test]
    fn test_pixel_access_out_of_bounds() {
        let mut buffer = gradient(2, 2);
        let err = buffer.get(2, 0).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InternalBug);
        assert!(buffer.set(0, 5, [0, 0, 0]).is_err());
    }
}

mod limits {
    use super::*;

    #[test]
    fn test_check_dimensions_boundaries() {
        let limits = DecodeLimits::default();
        assert!(check_dimensions(32768, 1, limits).is_ok());
        assert!(matches!(
            check_dimensions(32769, 1, limits),
            Err(TrentError::DimensionExceedsLimit { .. })
        ));
        assert!(check_dimensions(10_000, 10_000, limits).is_ok());
        assert!(matches!(
            check_dimensions(10_000, 10_001, limits),
            Err(TrentError::PixelCountExceedsLimit { .. })
        ));
    }

    #[test]
    fn test_degenerate_decode_inputs() {
        for bytes in [vec![], vec![0u8; 3], b"GIF89a".to_vec()] {
            let err = Session::from_bytes(bytes).unwrap_err();
            assert!(!matches!(err, TrentError::InternalPanic { .. }), "{err:?}");
        }
    }

    #[test]
    fn test_invalid_config_is_rejected_at_load() {
        let config = EngineConfig {
            preview_step: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Session::from_bytes_with_config(vec![1, 2, 3], config),
            Err(TrentError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_preview_plan_for_extreme_aspect_ratios() {
        let config = EngineConfig::default();
        for (w, h) in [(32768, 2), (2, 32768), (721, 1), (1, 451)] {
            let plan = downscale_plan(w, h, config.preview_target, &config);
            let (pw, ph) = *plan.last().unwrap();
            assert!(pw >= 1 && ph >= 1);
            assert!(pw <= 720 && ph <= 450, "{w}x{h} -> {pw}x{ph}");
        }
    }
}
