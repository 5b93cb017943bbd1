// src/engine/api.rs
//
// Optimizer: the one entry point that turns a request into a written file
// and a report.

use crate::codecs::{LossyCodec, WebpCodec};
use crate::engine::config::{OptimizeRequest, TrialSource};
use crate::engine::decoder::decode_image;
use crate::engine::io::{file_size, read_file};
use crate::engine::search::{run_search, run_trial};
use crate::engine::select::{persist, select, Decision, OptimizeReport, OutputKind};
use crate::error::Result;
use crate::metrics::{to_grayscale, SsimReference};
use image::{DynamicImage, GenericImageView};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Searches for the lowest quality whose output still meets the SSIM target.
///
/// ```no_run
/// use webpre::engine::{OptimizeRequest, Optimizer};
///
/// let report = Optimizer::new()
///     .optimize(&OptimizeRequest::new("photo.png", "photo.webp"))?;
/// println!("{report}");
/// # Ok::<(), webpre::error::WebpreError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Optimizer<C: LossyCodec = WebpCodec> {
    codec: C,
}

impl Optimizer<WebpCodec> {
    pub fn new() -> Self {
        Self { codec: WebpCodec }
    }
}

impl<C: LossyCodec> Optimizer<C> {
    pub fn with_codec(codec: C) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizeReport> {
        request.validate()?;
        let config = &request.search;

        let original = read_file(&request.source)?;
        let original_size = file_size(&request.source)?;
        let source_is_native = self.codec.is_native_file(&request.source);
        info!(
            target: "webpre::search",
            source = %request.source.display(),
            size_kb = format_args!("{:.2}", original_size as f64 / 1024.0),
            codec = self.codec.name(),
            "original"
        );

        let (decoded, format) = decode_image(&original)?;
        drop(original);
        let (width, height) = decoded.dimensions();
        debug!(target: "webpre::codec", width, height, format = ?format, "decoded source");

        let gray = to_grayscale(&decoded)?;
        let reference = SsimReference::new(&gray)?;
        let input: Cow<'_, DynamicImage> = match config.trial_source {
            TrialSource::Grayscale => Cow::Owned(DynamicImage::ImageLuma8(gray.clone())),
            TrialSource::Color => Cow::Borrowed(&decoded),
        };

        let outcome = run_search(config, original_size, |quality| {
            run_trial(&self.codec, &input, &reference, quality)
        })?;

        let decision = match select(outcome.best, outcome.fallback, source_is_native) {
            Decision::NoCandidate => {
                debug!(
                    target: "webpre::select",
                    quality = config.max_quality,
                    "no trial ran, encoding directly"
                );
                Decision::UseFallback(run_trial(
                    &self.codec,
                    &input,
                    &reference,
                    config.max_quality,
                )?)
            }
            decision => decision,
        };

        let written = persist(&decision, &request.source, &request.destination)?;
        let report =
            OptimizeReport::new(&decision, original_size, outcome.stop_reason, outcome.history)?;
        debug_assert_eq!(written, report.final_size);
        log_report(&report);
        Ok(report)
    }
}

fn log_report(report: &OptimizeReport) {
    match report.kind {
        OutputKind::Optimized => info!(
            target: "webpre::select",
            quality = ?report.quality,
            size = report.final_size,
            percent = format_args!("{:.1}", report.percent_of_original()),
            "final image"
        ),
        OutputKind::CopiedOriginal => {
            warn!(target: "webpre::select", "can't find target SSIM, copying original image")
        }
        OutputKind::Fallback => warn!(
            target: "webpre::select",
            quality = ?report.quality,
            size = report.final_size,
            "can't find target SSIM, falling back to closest match"
        ),
    }
}
