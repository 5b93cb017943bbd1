// src/engine/decoder.rs
//
// Decoder operations: JPEG (mozjpeg), PNG (zune-png), WebP (libwebp), rest via image crate.

use crate::engine::common::{run_with_panic_policy, EngineResult};
use crate::error::WebpreError;
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use mozjpeg::Decompress;
use webp::{BitstreamFeatures, Decoder as WebPDecoder};
use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_png::PngDecoder;

use crate::engine::{MAX_DIMENSION, MAX_PIXELS};

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo)
pub fn decode_jpeg_mozjpeg(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(WebpreError::decode_failed("mozjpeg: missing JPEG EOI marker"));
        }

        let decompress = Decompress::new_mem(data).map_err(|e| {
            WebpreError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
        })?;

        let mut decompress = decompress.rgb().map_err(|e| {
            WebpreError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
        })?;

        let width = decompress.width();
        let height = decompress.height();
        if width > MAX_DIMENSION as usize || height > MAX_DIMENSION as usize {
            return Err(WebpreError::dimension_exceeds_limit(
                width.max(height) as u32,
                MAX_DIMENSION,
            ));
        }
        let (width, height) = (width as u32, height as u32);
        check_dimensions(width, height)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            WebpreError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat: Vec<u8> = pixels.into_iter().flatten().collect();

        RgbImage::from_raw(width, height, flat)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(WebpreError::corrupted_image)
    })
}

/// Decode PNG using zune-png. 16-bit input is stripped to 8-bit.
pub fn decode_png_zune(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:png", || {
        let options = DecoderOptions::default().png_set_strip_to_8bit(true);
        let mut decoder = PngDecoder::new_with_options(ZCursor::new(data), options);
        let pixels = decoder
            .decode()
            .map_err(|e| WebpreError::decode_failed(format!("png: decode failed: {e}")))?;

        let info = decoder
            .info()
            .ok_or_else(|| WebpreError::decode_failed("png: missing header info"))?;
        let width = info.width as u32;
        let height = info.height as u32;
        check_dimensions(width, height)?;

        let buf = match pixels {
            zune_core::result::DecodingResult::U8(v) => v,
            _ => {
                return Err(WebpreError::decode_failed(
                    "png: unexpected non-U8 pixel buffer",
                ))
            }
        };

        let colorspace = decoder
            .colorspace()
            .ok_or_else(|| WebpreError::decode_failed("png: missing colorspace"))?;

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
                return Err(WebpreError::unsupported_format(format!(
                    "png colorspace {other:?}"
                )))
            }
        };
        img.ok_or_else(WebpreError::corrupted_image)
    })
}

/// Decode WebP using libwebp. Animated WebP falls back to the image crate.
pub fn decode_webp_libwebp(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:webp", || {
        // Parse header first to avoid allocating huge buffers on malformed files
        let features = BitstreamFeatures::new(data)
            .ok_or_else(|| WebpreError::decode_failed("webp: failed to read bitstream features"))?;

        if features.has_animation() {
            return image::load_from_memory_with_format(data, ImageFormat::WebP).map_err(|e| {
                WebpreError::decode_failed(format!("webp (animated) decode failed: {e}"))
            });
        }

        check_dimensions(features.width(), features.height())?;

        let decoded = WebPDecoder::new(data)
            .decode()
            .ok_or_else(|| WebpreError::decode_failed("webp: decode failed"))?;
        check_dimensions(decoded.width(), decoded.height())?;

        Ok(decoded.to_image())
    })
}

/// Decode everything else through the image crate.
pub fn decode_with_image_crate(data: &[u8]) -> EngineResult<DynamicImage> {
    run_with_panic_policy("decode:image", || {
        image::load_from_memory(data)
            .map_err(|e| WebpreError::decode_failed(format!("decode failed: {e}")))
    })
}

/// Detect input format using magic bytes. Returns None if unknown.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Unified decode entrypoint:
/// - Detect format once (magic bytes)
/// - Route JPEG to mozjpeg, PNG to zune-png, WebP to libwebp, others to image crate
/// - Return decoded image and detected format
pub fn decode_image(bytes: &[u8]) -> EngineResult<(DynamicImage, Option<ImageFormat>)> {
    let detected = detect_format(bytes);
    let img = match detected {
        Some(ImageFormat::Jpeg) => decode_jpeg_mozjpeg(bytes)?,
        Some(ImageFormat::Png) => decode_png_zune(bytes)?,
        Some(ImageFormat::WebP) => decode_webp_libwebp(bytes)?,
        Some(_) => decode_with_image_crate(bytes)?,
        None => return Err(WebpreError::unsupported_format("unknown")),
    };
    Ok((img, detected))
}

/// Check if image dimensions are within safe limits.
/// Returns an error if the image is too large (potential decompression bomb).
pub fn check_dimensions(width: u32, height: u32) -> EngineResult<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(WebpreError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(WebpreError::pixel_count_exceeds_limit(pixels, MAX_PIXELS));
    }
    Ok(())
}
