// src/engine/config.rs
//
// Search parameters and request validation.

use crate::engine::encoder::MAX_QUALITY;
use crate::error::WebpreError;
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_QUALITY: u8 = 40;
pub const DEFAULT_MAX_QUALITY: u8 = 95;
pub const DEFAULT_TARGET: f64 = 0.999;
pub const DEFAULT_LOOPS: u32 = 6;

/// Which image is handed to the encoder during a trial.
///
/// SSIM is always measured on grayscale forms; this only decides whether the
/// encoded payload (and therefore the persisted output) keeps chroma.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrialSource {
    /// Encode the grayscale original.
    #[default]
    Grayscale,
    /// Encode the decoded source as is.
    Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub min_quality: u8,
    pub max_quality: u8,
    /// Minimum acceptable SSIM, in (0, 1].
    pub target: f64,
    /// Maximum number of trials.
    pub loops: u32,
    pub trial_source: TrialSource,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_quality: DEFAULT_MIN_QUALITY,
            max_quality: DEFAULT_MAX_QUALITY,
            target: DEFAULT_TARGET,
            loops: DEFAULT_LOOPS,
            trial_source: TrialSource::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_bounds(mut self, min_quality: u8, max_quality: u8) -> Self {
        self.min_quality = min_quality;
        self.max_quality = max_quality;
        self
    }

    pub fn with_target(mut self, target: f64) -> Self {
        self.target = target;
        self
    }

    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = loops;
        self
    }

    pub fn with_trial_source(mut self, trial_source: TrialSource) -> Self {
        self.trial_source = trial_source;
        self
    }

    pub fn validate(&self) -> Result<(), WebpreError> {
        if self.max_quality < 1 || self.max_quality > MAX_QUALITY {
            return Err(WebpreError::invalid_argument(
                "max",
                self.max_quality.to_string(),
                "Maximum quality has to be between 1 and 100.",
            ));
        }
        if self.min_quality > MAX_QUALITY - 1 {
            return Err(WebpreError::invalid_argument(
                "min",
                self.min_quality.to_string(),
                "Minimum quality has to be between 0 and 99.",
            ));
        }
        if self.min_quality > self.max_quality {
            return Err(WebpreError::invalid_argument(
                "min",
                self.min_quality.to_string(),
                format!(
                    "Minimum quality cannot exceed maximum quality ({}).",
                    self.max_quality
                ),
            ));
        }
        if !self.target.is_finite() || self.target <= 0.0 || self.target > 1.0 {
            return Err(WebpreError::invalid_argument(
                "target",
                self.target.to_string(),
                "Target has to be greater than 0 and at most 1.",
            ));
        }
        if self.loops == 0 {
            return Err(WebpreError::invalid_argument(
                "loops",
                "0",
                "Loops has to be more than 0.",
            ));
        }
        Ok(())
    }
}

/// One source -> destination job.
#[derive(Clone, Debug)]
pub struct OptimizeRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Replace an existing destination.
    pub overwrite: bool,
    pub search: SearchConfig,
}

impl OptimizeRequest {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            overwrite: false,
            search: SearchConfig::default(),
        }
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn validate(&self) -> Result<(), WebpreError> {
        if self.source.as_os_str().is_empty() || !self.source.exists() {
            return Err(WebpreError::file_not_found(
                self.source.to_string_lossy().to_string(),
            ));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(WebpreError::invalid_argument(
                "dest",
                "",
                "Please specify a destination path.",
            ));
        }
        if !self.overwrite && self.destination.exists() {
            return Err(WebpreError::destination_exists(
                self.destination.to_string_lossy().to_string(),
            ));
        }
        if same_file(&self.source, &self.destination) {
            return Err(WebpreError::invalid_argument(
                "dest",
                self.destination.to_string_lossy().to_string(),
                "Destination must differ from the source.",
            ));
        }
        self.search.validate()
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
