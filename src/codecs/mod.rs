// src/codecs/mod.rs
//
// The lossy target codec seen by the search.
//
// The engine only needs encode / decode / "is this already the target format",
// so the search and the optimizer are generic over this trait and tests can
// drive them with a scripted codec.

use crate::engine::read_header;
use crate::error::Result;
use image::DynamicImage;
use std::path::Path;

mod libwebp;

pub use libwebp::WebpCodec;

pub trait LossyCodec {
    /// Short lowercase format name used in logs and errors.
    fn name(&self) -> &'static str;

    fn encode(&self, img: &DynamicImage, quality: u8) -> Result<Vec<u8>>;

    fn decode(&self, data: &[u8]) -> Result<DynamicImage>;

    /// True when `header` (the first bytes of a file) is already this format.
    fn is_native(&self, header: &[u8]) -> bool;

    /// Sniff a file on disk. Unreadable files are never native.
    fn is_native_file(&self, path: &Path) -> bool {
        read_header(path).is_some_and(|header| self.is_native(&header))
    }
}
