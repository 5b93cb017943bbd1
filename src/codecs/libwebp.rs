// src/codecs/libwebp.rs
//
// Lossy WebP through libwebp.

use super::LossyCodec;
use crate::engine::{decode_webp_libwebp, encode_webp, sniff_webp};
use crate::error::Result;
use image::DynamicImage;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebpCodec;

impl LossyCodec for WebpCodec {
    fn name(&self) -> &'static str {
        "webp"
    }

    fn encode(&self, img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        encode_webp(img, quality)
    }

    fn decode(&self, data: &[u8]) -> Result<DynamicImage> {
        decode_webp_libwebp(data)
    }

    fn is_native(&self, header: &[u8]) -> bool {
        sniff_webp(header)
    }
}
