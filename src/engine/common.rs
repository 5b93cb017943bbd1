// src/engine/common.rs
//
// Common utilities shared across engine modules.

use crate::error::WebpreError;
use std::panic::{catch_unwind, AssertUnwindSafe};

pub(crate) type EngineResult<T> = std::result::Result<T, WebpreError>;

/// Run a codec call, converting a panic inside it into `InternalPanic`.
///
/// libwebp / mozjpeg bindings can panic on malformed input. A panic must not
/// unwind through the search loop, so it becomes an ordinary error tagged with
/// the stage that raised it.
pub(crate) fn run_with_panic_policy<T, F>(stage: &'static str, f: F) -> EngineResult<T>
where
    F: FnOnce() -> EngineResult<T>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            tracing::error!(target: "webpre::codec", %stage, %detail, "codec panicked");
            Err(WebpreError::internal_panic(format!("{stage}: {detail}")))
        }
    }
}
