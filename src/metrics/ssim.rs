// src/metrics/ssim.rs
//
// Global SSIM: the whole image is treated as one window.

use super::stats::{covariance_with_means, ensure_same_dimensions, ImageStats};
use crate::error::Result;
use image::GrayImage;

const L: f64 = 255.0;
const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Luminance stabilizer, `(K1 * L)^2`.
pub const C1: f64 = (K1 * L) * (K1 * L);
/// Contrast stabilizer, `(K2 * L)^2`.
pub const C2: f64 = (K2 * L) * (K2 * L);

/// SSIM between two equally sized grayscale images.
///
/// 1.0 means identical. Fails with `DimensionMismatch` if the sizes differ.
pub fn similarity(a: &GrayImage, b: &GrayImage) -> Result<f64> {
    ensure_same_dimensions(a, b)?;
    SsimReference::new(a)?.compare(b)
}

/// Original image with its statistics precomputed.
///
/// The search compares one original against many candidates; the original's
/// mean and standard deviation only need to be computed once.
#[derive(Debug, Clone)]
pub struct SsimReference<'a> {
    image: &'a GrayImage,
    stats: ImageStats,
}

impl<'a> SsimReference<'a> {
    pub fn new(image: &'a GrayImage) -> Result<Self> {
        let stats = ImageStats::of(image)?;
        Ok(Self { image, stats })
    }

    pub fn image(&self) -> &GrayImage {
        self.image
    }

    pub fn stats(&self) -> ImageStats {
        self.stats
    }

    pub fn compare(&self, candidate: &GrayImage) -> Result<f64> {
        ensure_same_dimensions(self.image, candidate)?;
        let other = ImageStats::of(candidate)?;
        let cov = covariance_with_means(self.image, candidate, self.stats.mean, other.mean)?;
        Ok(combine(self.stats, other, cov))
    }
}

fn combine(x: ImageStats, y: ImageStats, cov: f64) -> f64 {
    let numerator = (2.0 * x.mean * y.mean + C1) * (2.0 * cov + C2);
    let denominator =
        (x.mean * x.mean + y.mean * y.mean + C1) * (x.variance() + y.variance() + C2);
    numerator / denominator
}
