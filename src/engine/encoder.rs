// src/engine/encoder.rs
//
// Encoder operations: lossy WebP (libwebp) with quality-derived tuning

use crate::engine::common::{run_with_panic_policy, EngineResult};
use crate::error::WebpreError;
use image::{DynamicImage, GenericImageView};
use std::borrow::Cow;

/// Highest quality libwebp accepts.
pub const MAX_QUALITY: u8 = 100;

/// Derives libwebp tuning from a quality value (0-100).
///
/// Quality bands:
/// - High (>=85): keep texture, light filtering
/// - Balanced (70-84)
/// - Fast (<70): stronger spatial noise shaping and filtering
#[derive(Debug, Clone, Copy)]
pub struct WebpSettings {
    quality: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QualityBand {
    High,
    Balanced,
    Fast,
}

impl WebpSettings {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.min(MAX_QUALITY),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    fn band(&self) -> QualityBand {
        if self.quality >= 85 {
            QualityBand::High
        } else if self.quality >= 70 {
            QualityBand::Balanced
        } else {
            QualityBand::Fast
        }
    }

    // Every trial pays this cost.
    pub fn method(&self) -> i32 {
        4
    }

    pub fn pass(&self) -> i32 {
        1
    }

    pub fn sns_strength(&self) -> i32 {
        match self.band() {
            QualityBand::High => 50,
            QualityBand::Balanced => 70,
            QualityBand::Fast => 80,
        }
    }

    pub fn filter_strength(&self) -> i32 {
        if self.quality >= 80 {
            20
        } else if self.quality >= 60 {
            30
        } else {
            40
        }
    }

    pub fn filter_sharpness(&self) -> i32 {
        match self.band() {
            QualityBand::High => 2,
            QualityBand::Balanced | QualityBand::Fast => 0,
        }
    }
}

/// Encode to lossy WebP.
///
/// Alpha is dropped; scores only see premultiplied luma.
pub fn encode_webp(img: &DynamicImage, quality: u8) -> EngineResult<Vec<u8>> {
    run_with_panic_policy("encode:webp", || {
        let (w, h) = img.dimensions();
        if w == 0 || h == 0 {
            return Err(WebpreError::empty_image(w, h));
        }

        let rgb: Cow<'_, image::RgbImage> = match img {
            DynamicImage::ImageRgb8(rgb_img) => Cow::Borrowed(rgb_img),
            _ => Cow::Owned(img.to_rgb8()),
        };
        let encoder = webp::Encoder::from_rgb(&rgb, w, h);

        let mut config = webp::WebPConfig::new()
            .map_err(|_| WebpreError::internal_panic("failed to create WebPConfig"))?;

        let settings = WebpSettings::new(quality);
        config.quality = settings.quality() as f32;
        config.method = settings.method();
        config.pass = settings.pass();
        config.sns_strength = settings.sns_strength();
        config.autofilter = 1;
        config.filter_strength = settings.filter_strength();
        config.filter_sharpness = settings.filter_sharpness();

        let mem = encoder.encode_advanced(&config).map_err(|e| {
            WebpreError::encode_failed("webp", format!("WebP encode failed: {e:?}"))
        })?;

        Ok(mem.to_vec())
    })
}
