// src/metrics/gray.rs
//
// Grayscale conversion for SSIM comparisons.

use crate::error::{Result, WebpreError};
use image::{DynamicImage, GenericImageView, GrayImage, Luma};

// BT.601 luma weights scaled to 16 bits (they sum to 65536).
const WEIGHT_R: u32 = 19595;
const WEIGHT_G: u32 = 38470;
const WEIGHT_B: u32 = 7471;

/// Convert any image to 8-bit luma.
///
/// Channels are widened to 16 bits and premultiplied by alpha before the
/// weighted sum, so a half-transparent white pixel reads as mid gray.
/// Returns `EmptyImage` for zero-area input.
pub fn to_grayscale(img: &DynamicImage) -> Result<GrayImage> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(WebpreError::empty_image(width, height));
    }

    // 8-bit luma already is the answer; the fixed-point path maps y -> y.
    if let DynamicImage::ImageLuma8(gray) = img {
        return Ok(gray.clone());
    }

    let rgba = img.to_rgba16();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Luma([luma_from_rgba16(r, g, b, a)])
    }))
}

fn premultiply(channel: u16, alpha: u16) -> u32 {
    channel as u32 * alpha as u32 / 0xffff
}

fn luma_from_rgba16(r: u16, g: u16, b: u16, a: u16) -> u8 {
    let (r, g, b) = (premultiply(r, a), premultiply(g, a), premultiply(b, a));
    // Max value is 65536 * 65535 + 2^15, which still fits in u32.
    ((WEIGHT_R * r + WEIGHT_G * g + WEIGHT_B * b + (1 << 15)) >> 24) as u8
}
