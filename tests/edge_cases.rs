// tests/edge_cases.rs
//
// Edge case tests for webpre
// Tests boundary values, degenerate images, and error handling

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use std::path::{Path, PathBuf};
use webpre::engine::{
    check_dimensions, encode_webp, run_search, sniff_webp, OptimizeRequest, Optimizer,
    OutputKind, SearchConfig, StopReason, TrialResult,
};
use webpre::metrics::{similarity, to_grayscale, SsimReference};
use webpre::WebpreError;

// Helper function to create test images
fn create_test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

fn write_png(dir: &Path, name: &str, img: &DynamicImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, image::ImageFormat::Png).unwrap();
    path
}

mod minimal_image_tests {
    use super::*;

    #[test]
    fn test_1x1_has_no_statistics() {
        let gray = to_grayscale(&create_test_image(1, 1)).unwrap();
        assert!(matches!(
            SsimReference::new(&gray).unwrap_err(),
            WebpreError::TooFewSamples { width: 1, height: 1 }
        ));
        assert!(similarity(&gray, &gray).is_err());
    }

    #[test]
    fn test_two_pixels_is_enough() {
        let a = GrayImage::from_raw(1, 2, vec![0, 255]).unwrap();
        let b = GrayImage::from_raw(1, 2, vec![255, 0]).unwrap();
        assert!((similarity(&a, &a).unwrap() - 1.0).abs() < 1e-12);
        // With n - 1 = 1 both means come out as 255, so the swapped pair has
        // zero covariance rather than a negative one.
        let swapped = similarity(&a, &b).unwrap();
        assert!(swapped > 0.0 && swapped < 0.01, "{swapped}");
    }

    #[test]
    fn test_1x1_encode_webp() {
        let encoded = encode_webp(&create_test_image(1, 1), 80).unwrap();
        assert_eq!(&encoded[0..4], b"RIFF");
    }

    #[test]
    fn test_1x1_source_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "tiny.png", &create_test_image(1, 1));
        let dst = dir.path().join("tiny.webp");

        let err = Optimizer::new()
            .optimize(&OptimizeRequest::new(&src, &dst))
            .unwrap_err();
        assert!(matches!(err, WebpreError::TooFewSamples { .. }));
        let message = err.to_string();
        assert!(message.contains("1x1"), "{message}");
        assert!(message.contains("(width * height) - 1"), "{message}");
        assert!(!message.contains("empty"), "{message}");
        assert!(!dst.exists());
    }
}

mod mismatch_tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch() {
        let a = GrayImage::new(4, 4);
        let b = GrayImage::new(4, 5);
        let err = similarity(&a, &b).unwrap_err();
        assert!(matches!(err, WebpreError::DimensionMismatch { .. }));
        assert!(err.to_string().contains("same dimension"));
    }

    #[test]
    fn test_transposed_dimensions_mismatch() {
        let a = GrayImage::new(3, 7);
        let b = GrayImage::new(7, 3);
        assert!(similarity(&a, &b).is_err());
        let reference = SsimReference::new(&a).unwrap();
        assert!(reference.compare(&b).is_err());
    }
}

mod constant_image_tests {
    use super::*;

    #[test]
    fn test_identical_constant_images() {
        let a = GrayImage::from_pixel(8, 8, Luma([42]));
        assert!((similarity(&a, &a).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_different_constant_images() {
        // zero covariance and far-apart means
        let a = GrayImage::from_pixel(8, 8, Luma([0]));
        let b = GrayImage::from_pixel(8, 8, Luma([255]));
        let s = similarity(&a, &b).unwrap();
        assert!(s > 0.0 && s < 0.01, "{s}");
    }
}

mod large_image_tests {
    use super::*;

    #[test]
    fn test_max_dimension_boundary() {
        // 32768 * 32768 = 1,073,741,824 > 100,000,000 (MAX_PIXELS)
        let result = check_dimensions(32768, 32768);
        assert!(result.unwrap_err().to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_exceed_max_dimension_width() {
        let result = check_dimensions(32769, 1);
        assert!(matches!(
            result.unwrap_err(),
            WebpreError::DimensionExceedsLimit { dimension: 32769, .. }
        ));
    }

    #[test]
    fn test_exceed_max_dimension_height() {
        assert!(check_dimensions(1, 32769).is_err());
    }

    #[test]
    fn test_exactly_max_pixels() {
        assert!(check_dimensions(10_000, 10_000).is_ok());
        assert!(check_dimensions(10_000, 10_001).is_err());
    }
}

mod empty_state_tests {
    use super::*;

    #[test]
    fn test_min_equals_max_runs_no_trials_and_still_writes_webp() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "in.png", &create_test_image(24, 24));
        let dst = dir.path().join("out.webp");

        let request = OptimizeRequest::new(&src, &dst)
            .search(SearchConfig::default().with_bounds(70, 70));
        let report = Optimizer::new().optimize(&request).unwrap();

        assert_eq!(report.iterations(), 0);
        assert_eq!(report.stop_reason, StopReason::RangeExhausted);
        assert_eq!(report.kind, OutputKind::Fallback);
        assert_eq!(report.quality, Some(70));
        assert!(sniff_webp(&std::fs::read(&dst).unwrap()));
    }

    #[test]
    fn test_zero_trial_search_leaves_both_slots_empty() {
        let config = SearchConfig::default().with_bounds(0, 0).with_loops(1);
        // max 0 is rejected before anything runs
        assert!(run_search(&config, 100, |q| Ok(TrialResult::new(q, 1.0, vec![0]))).is_err());

        let config = SearchConfig::default().with_bounds(99, 99);
        let outcome =
            run_search(&config, 100, |q| Ok(TrialResult::new(q, 1.0, vec![0]))).unwrap();
        assert!(outcome.best.is_none());
        assert!(outcome.fallback.is_none());
    }
}

mod config_boundary_tests {
    use super::*;

    #[test]
    fn test_single_loop() {
        let config = SearchConfig::default().with_loops(1);
        let outcome =
            run_search(&config, 1000, |q| Ok(TrialResult::new(q, 0.5, vec![0; 10]))).unwrap();
        assert_eq!(outcome.iterations(), 1);
        assert_eq!(outcome.stop_reason, StopReason::LoopsExhausted);
        assert_eq!(outcome.history[0].quality, 67);
    }

    #[test]
    fn test_top_of_quality_range() {
        let config = SearchConfig::default().with_bounds(99, 100);
        let mut asked = Vec::new();
        run_search(&config, 1000, |q| {
            asked.push(q);
            Ok(TrialResult::new(q, 0.5, vec![0; 10]))
        })
        .unwrap();
        // below target at 99 -> min = 100 -> exhausted
        assert_eq!(asked, vec![99]);
    }

    #[test]
    fn test_invalid_requests_are_user_errors() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "in.png", &create_test_image(8, 8));
        let dst = dir.path().join("out.webp");

        for search in [
            SearchConfig::default().with_target(0.0),
            SearchConfig::default().with_target(1.5),
            SearchConfig::default().with_loops(0),
            SearchConfig::default().with_bounds(80, 60),
            SearchConfig::default().with_bounds(0, 101),
        ] {
            let err = Optimizer::new()
                .optimize(&OptimizeRequest::new(&src, &dst).search(search))
                .unwrap_err();
            assert!(err.is_recoverable(), "{err}");
            assert!(!dst.exists());
        }
    }

    #[test]
    fn test_truncated_png_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_png(dir.path(), "in.png", &create_test_image(32, 32));
        let bytes = std::fs::read(&src).unwrap();
        // signature plus half of IHDR
        std::fs::write(&src, &bytes[..20]).unwrap();

        let dst = dir.path().join("out.webp");
        assert!(Optimizer::new()
            .optimize(&OptimizeRequest::new(&src, &dst))
            .is_err());
        assert!(!dst.exists());
    }
}
