// src/engine/search.rs
//
// Adaptive quality search.
//
// Each trial encodes at the midpoint of [min, max], measures SSIM and size,
// and narrows the interval from two independent signals:
//
//   size >= original, ssim <  target -> stop, compressing further cannot help
//   size >= original, ssim >= target -> max = q - 1
//   size <  original, ssim <  target -> min = q + 1
//   size <  original, ssim >  target -> max = q - 1
//   size <  original, ssim == target -> stop, exact hit
//
// Two result slots survive the loop: `best` (smallest payload that beats the
// original size and meets the target) and `fallback` (closest size to the
// original regardless of the target).

use crate::codecs::LossyCodec;
use crate::engine::common::EngineResult;
use crate::engine::config::SearchConfig;
use crate::metrics::{to_grayscale, SsimReference};
use image::DynamicImage;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One encode -> decode -> compare cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialResult {
    pub quality: u8,
    pub similarity: f64,
    /// Encoded size in bytes, always `payload.len()`.
    pub size: u64,
    pub payload: Arc<Vec<u8>>,
}

impl TrialResult {
    pub fn new(quality: u8, similarity: f64, payload: Vec<u8>) -> Self {
        Self {
            quality,
            similarity,
            size: payload.len() as u64,
            payload: Arc::new(payload),
        }
    }
}

/// Inclusive quality interval, `min <= max` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityBounds {
    min: u8,
    max: u8,
}

impl QualityBounds {
    /// Swaps the arguments if they come in reversed.
    pub fn new(min: u8, max: u8) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn width(&self) -> u8 {
        self.max - self.min
    }

    pub fn is_exhausted(&self) -> bool {
        self.min == self.max
    }

    pub fn midpoint(&self) -> u8 {
        self.min + (self.max - self.min) / 2
    }

    pub fn contains(&self, other: &QualityBounds) -> bool {
        self.min <= other.min && other.max <= self.max
    }

    fn raise_min(self, quality: u8) -> Self {
        Self {
            min: quality.saturating_add(1).min(self.max),
            max: self.max,
        }
    }

    fn lower_max(self, quality: u8) -> Self {
        Self {
            min: self.min,
            max: quality.saturating_sub(1).max(self.min),
        }
    }
}

impl fmt::Display for QualityBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Ran the configured number of trials.
    LoopsExhausted,
    /// min == max before a trial could run.
    RangeExhausted,
    /// A trial was no smaller than the original and still missed the target.
    TargetUnreachable,
    /// A smaller trial hit the target exactly.
    ExactMatch,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::LoopsExhausted => "loops exhausted",
            StopReason::RangeExhausted => "tried all qualities",
            StopReason::TargetUnreachable => "cannot achieve target SSIM by compressing further",
            StopReason::ExactMatch => "found perfect compression",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundsUpdate {
    Continue(QualityBounds),
    Stop(StopReason),
}

/// Interval update after a trial at `trial.quality`.
pub fn next_bounds(
    bounds: QualityBounds,
    trial: &TrialResult,
    original_size: u64,
    target: f64,
) -> BoundsUpdate {
    let q = trial.quality;
    if trial.size >= original_size {
        if trial.similarity < target {
            BoundsUpdate::Stop(StopReason::TargetUnreachable)
        } else {
            BoundsUpdate::Continue(bounds.lower_max(q))
        }
    } else if trial.similarity < target {
        BoundsUpdate::Continue(bounds.raise_min(q))
    } else if trial.similarity > target {
        BoundsUpdate::Continue(bounds.lower_max(q))
    } else {
        BoundsUpdate::Stop(StopReason::ExactMatch)
    }
}

/// Keep the smallest trial that beats the original size and meets the target.
/// Ties keep the earlier trial.
pub fn update_best(
    best: Option<TrialResult>,
    trial: &TrialResult,
    original_size: u64,
    target: f64,
) -> Option<TrialResult> {
    let ceiling = best.as_ref().map_or(original_size, |b| b.size);
    if trial.size < ceiling && trial.similarity >= target {
        Some(trial.clone())
    } else {
        best
    }
}

/// Keep the trial whose size is closest to the original.
///
/// The first trial seeds the slot. After that, a trial at or below the
/// original wins when it is larger than the current fallback, and a trial
/// above the original wins when it is smaller.
pub fn update_fallback(
    fallback: Option<TrialResult>,
    trial: &TrialResult,
    original_size: u64,
) -> Option<TrialResult> {
    let Some(current) = fallback else {
        return Some(trial.clone());
    };
    let closer = if trial.size <= original_size {
        trial.size > current.size
    } else {
        trial.size < current.size
    };
    if closer {
        Some(trial.clone())
    } else {
        Some(current)
    }
}

/// One line of search history.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialSummary {
    pub attempt: u32,
    pub quality: u8,
    pub similarity: f64,
    pub size: u64,
    pub bounds_before: QualityBounds,
    pub bounds_after: QualityBounds,
}

/// Mutable state of one search.
#[derive(Clone, Debug)]
pub struct SearchState {
    bounds: QualityBounds,
    best: Option<TrialResult>,
    fallback: Option<TrialResult>,
    history: Vec<TrialSummary>,
}

impl SearchState {
    pub fn new(bounds: QualityBounds) -> Self {
        Self {
            bounds,
            best: None,
            fallback: None,
            history: Vec::new(),
        }
    }

    pub fn bounds(&self) -> QualityBounds {
        self.bounds
    }

    pub fn best(&self) -> Option<&TrialResult> {
        self.best.as_ref()
    }

    pub fn fallback(&self) -> Option<&TrialResult> {
        self.fallback.as_ref()
    }

    /// Fold a trial into the state. Returns the stop reason if the loop must end.
    ///
    /// Best and fallback are updated even on the terminating trial.
    pub fn record(
        &mut self,
        trial: TrialResult,
        original_size: u64,
        target: f64,
    ) -> Option<StopReason> {
        let before = self.bounds;
        let update = next_bounds(before, &trial, original_size, target);
        let stop = match update {
            BoundsUpdate::Continue(bounds) => {
                self.bounds = bounds;
                None
            }
            BoundsUpdate::Stop(reason) => Some(reason),
        };

        self.history.push(TrialSummary {
            attempt: self.history.len() as u32 + 1,
            quality: trial.quality,
            similarity: trial.similarity,
            size: trial.size,
            bounds_before: before,
            bounds_after: self.bounds,
        });
        self.best = update_best(self.best.take(), &trial, original_size, target);
        self.fallback = update_fallback(self.fallback.take(), &trial, original_size);
        stop
    }

    fn finish(self, stop_reason: StopReason) -> SearchOutcome {
        SearchOutcome {
            best: self.best,
            fallback: self.fallback,
            stop_reason,
            final_bounds: self.bounds,
            history: self.history,
        }
    }
}

/// What the search leaves behind for the selector.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub best: Option<TrialResult>,
    pub fallback: Option<TrialResult>,
    pub stop_reason: StopReason,
    pub final_bounds: QualityBounds,
    pub history: Vec<TrialSummary>,
}

impl SearchOutcome {
    pub fn iterations(&self) -> u32 {
        self.history.len() as u32
    }
}

/// Drive the search with `trial` producing a result for each quality asked for.
///
/// Any error from `trial` aborts the search; a trial that failed cannot be
/// trusted, so it is never skipped.
pub fn run_search<F>(
    config: &SearchConfig,
    original_size: u64,
    mut trial: F,
) -> EngineResult<SearchOutcome>
where
    F: FnMut(u8) -> EngineResult<TrialResult>,
{
    config.validate()?;
    let mut state = SearchState::new(QualityBounds::new(config.min_quality, config.max_quality));

    for attempt in 1..=config.loops {
        if state.bounds.is_exhausted() {
            debug!(target: "webpre::search", attempt, bounds = %state.bounds, "tried all qualities");
            return Ok(state.finish(StopReason::RangeExhausted));
        }

        let quality = state.bounds.midpoint();
        let result = trial(quality)?;
        debug_assert_eq!(result.quality, quality);
        info!(
            target: "webpre::search",
            attempt,
            quality,
            ssim = format_args!("{:.5}", result.similarity),
            size_kb = format_args!("{:.2}", result.size as f64 / 1024.0),
            "trial"
        );

        if let Some(reason) = state.record(result, original_size, config.target) {
            info!(target: "webpre::search", attempt, %reason, "search stopped early");
            return Ok(state.finish(reason));
        }
    }

    Ok(state.finish(StopReason::LoopsExhausted))
}

/// Encode `input` at `quality`, decode it back and score it against `reference`.
pub fn run_trial<C: LossyCodec + ?Sized>(
    codec: &C,
    input: &DynamicImage,
    reference: &SsimReference<'_>,
    quality: u8,
) -> EngineResult<TrialResult> {
    let payload = codec.encode(input, quality)?;
    let decoded = codec.decode(&payload)?;
    let candidate = to_grayscale(&decoded)?;
    let similarity = reference.compare(&candidate)?;
    Ok(TrialResult::new(quality, similarity, payload))
}
