// lib.rs
//
// webpre: re-encode an image as lossy WebP at the lowest quality whose
// output still meets a target SSIM against the original.
//
// Design goals:
// - Never write something bigger than the source when a smaller one exists
// - Never write something worse than the target when the source can be kept
// - One decode of the source, one encode per trial

// Memory allocator optimization - jemalloc for the encode/decode churn.
// Note: jemalloc is not supported on Windows/MSVC, so we exclude it on that platform
#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub mod codecs;
pub mod engine;
pub mod error;
pub mod metrics;

pub use codecs::{LossyCodec, WebpCodec};
pub use engine::{OptimizeReport, OptimizeRequest, Optimizer, SearchConfig, TrialSource};
pub use error::{ErrorCategory, Result, WebpreError};
