// src/metrics.rs
//
// Whole-image structural similarity on grayscale intensities.
// 1. Convert both images to a single luma channel
// 2. Gather mean / standard deviation / covariance over every sample
// 3. Fold them into one SSIM score (the whole image is a single window)

mod gray;
mod ssim;
mod stats;

pub use gray::to_grayscale;
pub use ssim::{similarity, SsimReference, C1, C2};
pub use stats::{covariance, ensure_same_dimensions, mean, standard_deviation, ImageStats};
