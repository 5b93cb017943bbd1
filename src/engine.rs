// src/engine.rs
//
// The core of webpre:
// 1. Decode the source once and build its grayscale SSIM reference
// 2. Search the quality range, one encode -> decode -> compare per trial
// 3. Pick the output (best, verbatim copy or fallback) and write it atomically
//
// This file is a facade over the modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Images larger than 32768x32768 are rejected to prevent decompression bombs.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 400MB uncompressed RGBA.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod api;
mod common;
mod config;
mod decoder;
mod encoder;
mod io;
mod search;
mod select;

pub use api::Optimizer;
pub use config::{
    OptimizeRequest, SearchConfig, TrialSource, DEFAULT_LOOPS, DEFAULT_MAX_QUALITY,
    DEFAULT_MIN_QUALITY, DEFAULT_TARGET,
};
pub use decoder::{check_dimensions, decode_image, decode_webp_libwebp, detect_format};
pub use encoder::{encode_webp, WebpSettings, MAX_QUALITY};
pub use io::{copy_file, file_size, read_file, read_header, sniff_webp, write_file_atomic, SNIFF_LEN};
pub use search::{
    next_bounds, run_search, run_trial, update_best, update_fallback, BoundsUpdate, QualityBounds,
    SearchOutcome, SearchState, StopReason, TrialResult, TrialSummary,
};
pub use select::{persist, select, Decision, OptimizeReport, OutputKind};
