// main.rs
//
// webpre command line: optimize one image into a WebP file.

use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use webpre::engine::{
    OptimizeRequest, Optimizer, SearchConfig, TrialSource, DEFAULT_LOOPS, DEFAULT_MAX_QUALITY,
    DEFAULT_MIN_QUALITY, DEFAULT_TARGET,
};
use webpre::{ErrorCategory, WebpreError};

/// Re-encode an image as WebP at the smallest quality that keeps SSIM
/// above the target.
#[derive(Parser, Debug)]
#[command(name = "webpre", version, about)]
struct Args {
    /// Source image (JPEG, PNG, WebP, GIF, ...)
    src: PathBuf,

    /// Destination WebP file
    dest: PathBuf,

    /// Highest quality to try (1-100)
    #[arg(long, default_value_t = DEFAULT_MAX_QUALITY as i64, allow_negative_numbers = true)]
    max: i64,

    /// Lowest quality to try (0-99)
    #[arg(long, default_value_t = DEFAULT_MIN_QUALITY as i64, allow_negative_numbers = true)]
    min: i64,

    /// Target SSIM, in (0, 1]
    #[arg(short, long, default_value_t = DEFAULT_TARGET.to_string(), allow_negative_numbers = true)]
    target: String,

    /// Maximum number of encode trials
    #[arg(short, long, default_value_t = DEFAULT_LOOPS as i64, allow_negative_numbers = true)]
    loops: i64,

    /// Overwrite the destination if it exists
    #[arg(short, long)]
    force: bool,

    /// Keep color in the output. Without it the WebP is written in
    /// grayscale, the same image the SSIM search scores.
    #[arg(long)]
    keep_color: bool,

    /// Log every trial and the selection details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn default_filter(&self) -> &'static str {
        if self.verbose {
            "webpre=debug"
        } else if self.quiet {
            "webpre=warn"
        } else {
            "webpre=info"
        }
    }

    /// Parse and check the search flags before any path is touched.
    fn search(&self) -> Result<SearchConfig, WebpreError> {
        let max_quality = quality_arg("max", self.max, "Maximum quality has to be between 1 and 100.")?;
        let min_quality = quality_arg("min", self.min, "Minimum quality has to be between 0 and 99.")?;
        let target = self.target.trim().parse::<f64>().map_err(|_| {
            WebpreError::invalid_argument(
                "target",
                self.target.clone(),
                "Target has to be greater than 0 and at most 1.",
            )
        })?;
        let loops = u32::try_from(self.loops).map_err(|_| {
            WebpreError::invalid_argument("loops", self.loops.to_string(), "Loops has to be more than 0.")
        })?;
        let trial_source = if self.keep_color {
            TrialSource::Color
        } else {
            TrialSource::Grayscale
        };
        let search = SearchConfig::default()
            .with_bounds(min_quality, max_quality)
            .with_target(target)
            .with_loops(loops)
            .with_trial_source(trial_source);
        search.validate()?;
        Ok(search)
    }

    fn request(&self) -> Result<OptimizeRequest, WebpreError> {
        let request = OptimizeRequest::new(&self.src, &self.dest)
            .overwrite(self.force)
            .search(self.search()?);
        request.validate()?;
        Ok(request)
    }
}

fn quality_arg(name: &'static str, value: i64, reason: &'static str) -> Result<u8, WebpreError> {
    u8::try_from(value).map_err(|_| WebpreError::invalid_argument(name, value.to_string(), reason))
}

fn usage_error(err: &WebpreError) -> ExitCode {
    let message = match err {
        WebpreError::InvalidArgument { reason, .. } => reason.to_string(),
        other => other.to_string(),
    };
    eprintln!("* Error: {message}");
    eprintln!("{}", Args::command().render_usage());
    ExitCode::from(1)
}

fn exit_code(category: ErrorCategory) -> ExitCode {
    ExitCode::from(u8::try_from(category.exit_code()).unwrap_or(1))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let request = match args.request() {
        Ok(request) => request,
        Err(err) => return usage_error(&err),
    };

    match Optimizer::new().optimize(&request) {
        Ok(report) => {
            if !args.quiet {
                println!("Original Size = {:.2}KB", report.original_size as f64 / 1024.0);
                print!("{report}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let category = err.category();
            tracing::error!(code = category.code(), "{err}");
            eprintln!("* Error: {err}");
            exit_code(category)
        }
    }
}
