// src/engine/select.rs
//
// Decide what gets written once the search is over, write it, and describe it.

use crate::engine::common::EngineResult;
use crate::engine::io::{copy_file, write_file_atomic};
use crate::engine::search::{StopReason, TrialResult, TrialSummary};
use crate::error::WebpreError;
use std::fmt;
use std::path::Path;

/// Final output choice.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// A trial beat the original size and met the target.
    UseBest(TrialResult),
    /// Nothing qualified and the source already is the target format.
    CopyOriginal,
    /// Nothing qualified; write the trial closest to the original size.
    UseFallback(TrialResult),
    /// Nothing qualified and no trial ever ran.
    NoCandidate,
}

/// Best first; then keep an already-encoded source untouched rather than
/// re-encoding it; then the closest fallback.
pub fn select(
    best: Option<TrialResult>,
    fallback: Option<TrialResult>,
    source_is_target_format: bool,
) -> Decision {
    match (best, fallback) {
        (Some(best), _) => Decision::UseBest(best),
        (None, _) if source_is_target_format => Decision::CopyOriginal,
        (None, Some(fallback)) => Decision::UseFallback(fallback),
        (None, None) => Decision::NoCandidate,
    }
}

/// Write the decision to `destination`. Returns the bytes written.
///
/// `NoCandidate` has nothing to write; the caller resolves it into a
/// `UseFallback` first.
pub fn persist(decision: &Decision, source: &Path, destination: &Path) -> EngineResult<u64> {
    match decision {
        Decision::UseBest(trial) | Decision::UseFallback(trial) => {
            write_file_atomic(destination, &trial.payload)
        }
        Decision::CopyOriginal => copy_file(source, destination),
        Decision::NoCandidate => Err(WebpreError::internal_panic(
            "no candidate to persist; resolve NoCandidate before persisting",
        )),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputKind {
    /// Smaller than the original and at or above the target.
    Optimized,
    /// Verbatim copy of the source.
    CopiedOriginal,
    /// Closest match, target not met.
    Fallback,
}

/// What was written and how it compares with the original.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizeReport {
    pub kind: OutputKind,
    pub original_size: u64,
    pub final_size: u64,
    /// None for a verbatim copy.
    pub quality: Option<u8>,
    pub similarity: Option<f64>,
    pub stop_reason: StopReason,
    pub trials: Vec<TrialSummary>,
}

impl OptimizeReport {
    /// Describe a persisted decision. `NoCandidate` wrote nothing and has no
    /// report.
    pub fn new(
        decision: &Decision,
        original_size: u64,
        stop_reason: StopReason,
        trials: Vec<TrialSummary>,
    ) -> EngineResult<Self> {
        let (kind, final_size, quality, similarity) = match decision {
            Decision::UseBest(t) => (OutputKind::Optimized, t.size, Some(t.quality), Some(t.similarity)),
            Decision::UseFallback(t) => {
                (OutputKind::Fallback, t.size, Some(t.quality), Some(t.similarity))
            }
            Decision::CopyOriginal => (OutputKind::CopiedOriginal, original_size, None, None),
            Decision::NoCandidate => {
                return Err(WebpreError::internal_panic(
                    "no candidate to report; resolve NoCandidate before reporting",
                ))
            }
        };
        Ok(Self {
            kind,
            original_size,
            final_size,
            quality,
            similarity,
            stop_reason,
            trials,
        })
    }

    pub fn iterations(&self) -> u32 {
        self.trials.len() as u32
    }

    /// Final size as a percentage of the original.
    pub fn percent_of_original(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.final_size as f64 / self.original_size as f64 * 100.0
    }

    /// Bytes saved; negative when the output is larger than the original.
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.final_size as i64
    }
}

fn kb(bytes: f64) -> f64 {
    bytes / 1024.0
}

impl fmt::Display for OptimizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OutputKind::Optimized => {}
            OutputKind::CopiedOriginal => {
                return writeln!(f, "* Can't find target SSIM, copying original image");
            }
            OutputKind::Fallback => {
                writeln!(f, "* Can't find target SSIM, falling back to closest match")?
            }
        }
        writeln!(f, "Final image:")?;
        writeln!(
            f,
            "Quality = {}, SSIM = {:.5}, Size = {:.2}KB",
            self.quality.unwrap_or_default(),
            self.similarity.unwrap_or_default(),
            kb(self.final_size as f64)
        )?;
        writeln!(
            f,
            "{:.1}% of original, saved {:.2}KB",
            self.percent_of_original(),
            kb(self.saved_bytes() as f64)
        )
    }
}
