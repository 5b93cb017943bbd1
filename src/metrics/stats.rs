// src/metrics/stats.rs
//
// First and second order statistics over 8-bit luma samples.
//
// Every statistic divides by (width * height) - 1, the mean included. Scores
// are calibrated against that denominator; do not switch the mean to n.

use crate::error::{Result, WebpreError};
use image::GrayImage;

/// Mean and standard deviation of one image, computed once and reused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl ImageStats {
    pub fn of(img: &GrayImage) -> Result<Self> {
        let mean = mean(img)?;
        let std_dev = standard_deviation_with_mean(img, mean)?;
        Ok(Self { mean, std_dev })
    }

    pub fn variance(&self) -> f64 {
        self.std_dev * self.std_dev
    }
}

/// Fail with `DimensionMismatch` unless both images have the same size.
pub fn ensure_same_dimensions(a: &GrayImage, b: &GrayImage) -> Result<()> {
    if a.dimensions() != b.dimensions() {
        return Err(WebpreError::dimension_mismatch(
            a.dimensions(),
            b.dimensions(),
        ));
    }
    Ok(())
}

fn denominator(img: &GrayImage) -> Result<f64> {
    let (width, height) = img.dimensions();
    let samples = width as u64 * height as u64;
    if samples < 2 {
        return Err(WebpreError::too_few_samples(width, height));
    }
    Ok((samples - 1) as f64)
}

/// Sum of intensities over `(width * height) - 1`.
pub fn mean(img: &GrayImage) -> Result<f64> {
    let n = denominator(img)?;
    // Exact integer sum; 2^64 is far beyond 255 * MAX_PIXELS.
    let sum: u64 = img.as_raw().iter().map(|&p| p as u64).sum();
    Ok(sum as f64 / n)
}

pub fn standard_deviation(img: &GrayImage) -> Result<f64> {
    let avg = mean(img)?;
    standard_deviation_with_mean(img, avg)
}

pub(crate) fn standard_deviation_with_mean(img: &GrayImage, avg: f64) -> Result<f64> {
    let n = denominator(img)?;
    let sum: f64 = img
        .as_raw()
        .iter()
        .map(|&p| {
            let d = p as f64 - avg;
            d * d
        })
        .sum();
    Ok((sum / n).sqrt())
}

/// Covariance of two equally sized images.
pub fn covariance(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    ensure_same_dimensions(a, b)?;
    covariance_with_means(a, b, mean(a)?, mean(b)?)
}

pub(crate) fn covariance_with_means(
    a: &GrayImage,
    b: &GrayImage,
    mean_a: f64,
    mean_b: f64,
) -> Result<f64> {
    ensure_same_dimensions(a, b)?;
    let n = denominator(a)?;
    let sum: f64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&pa, &pb)| (pa as f64 - mean_a) * (pb as f64 - mean_b))
        .sum();
    Ok(sum / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn from_samples(width: u32, height: u32, samples: &[u8]) -> GrayImage {
        GrayImage::from_raw(width, height, samples.to_vec()).unwrap()
    }

    #[test]
    fn test_mean_uses_n_minus_one() {
        // 4 samples summing to 12 -> 12 / 3
        let img = from_samples(2, 2, &[0, 2, 4, 6]);
        assert!((mean(&img).unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_standard_deviation_of_constant_image_is_not_zero() {
        // The inflated mean makes every sample deviate by 10 / 3.
        let img = GrayImage::from_pixel(2, 2, Luma([10]));
        let avg = mean(&img).unwrap();
        assert!((avg - 40.0 / 3.0).abs() < 1e-12);
        let expected = ((4.0 * (10.0 / 3.0f64).powi(2)) / 3.0).sqrt();
        assert!((standard_deviation(&img).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_covariance_with_itself_is_variance() {
        let img = from_samples(3, 2, &[1, 50, 99, 200, 7, 13]);
        let var = standard_deviation(&img).unwrap().powi(2);
        assert!((covariance(&img, &img).unwrap() - var).abs() < 1e-9);
    }

    #[test]
    fn test_covariance_is_symmetric() {
        let a = from_samples(3, 1, &[0, 128, 255]);
        let b = from_samples(3, 1, &[255, 100, 3]);
        assert_eq!(covariance(&a, &b).unwrap(), covariance(&b, &a).unwrap());
        assert!(covariance(&a, &b).unwrap() < 0.0);
    }

    #[test]
    fn test_covariance_rejects_mismatched_dimensions() {
        let a = GrayImage::new(4, 4);
        let b = GrayImage::new(4, 5);
        let err = covariance(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            WebpreError::DimensionMismatch {
                left_width: 4,
                left_height: 4,
                right_width: 4,
                right_height: 5,
            }
        ));
    }

    #[test]
    fn test_transposed_dimensions_are_a_mismatch() {
        let a = GrayImage::new(2, 3);
        let b = GrayImage::new(3, 2);
        assert!(ensure_same_dimensions(&a, &b).is_err());
    }

    #[test]
    fn test_single_pixel_has_no_denominator() {
        let img = GrayImage::from_pixel(1, 1, Luma([5]));
        assert!(matches!(
            mean(&img).unwrap_err(),
            WebpreError::TooFewSamples { width: 1, height: 1 }
        ));
    }

    #[test]
    fn test_image_stats_matches_free_functions() {
        let img = from_samples(4, 1, &[3, 9, 27, 81]);
        let stats = ImageStats::of(&img).unwrap();
        assert_eq!(stats.mean, mean(&img).unwrap());
        assert_eq!(stats.std_dev, standard_deviation(&img).unwrap());
    }
}
