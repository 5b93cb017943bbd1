// src/error.rs
//
// Unified error handling for webpre
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - UserError: Invalid arguments or paths, fixable by the caller
// - CodecError: Decode/encode failures and incomparable images
// - ResourceLimit: Dimension limits and file system failures
// - InternalBug: Library bugs (should not happen)

use std::borrow::Cow;
use thiserror::Error;

/// Error category used by callers to pick a policy (retry, report, exit code).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Invalid input, recoverable by user
    UserError,
    /// Format/encoding issues
    CodecError,
    /// Dimension limits and I/O
    ResourceLimit,
    /// Library bugs (should not happen)
    InternalBug,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::UserError => "UserError",
            ErrorCategory::CodecError => "CodecError",
            ErrorCategory::ResourceLimit => "ResourceLimit",
            ErrorCategory::InternalBug => "InternalBug",
        }
    }

    /// Get the WEBPRE_* error code string for this category
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::UserError => "WEBPRE_USER_ERROR",
            ErrorCategory::CodecError => "WEBPRE_CODEC_ERROR",
            ErrorCategory::ResourceLimit => "WEBPRE_RESOURCE_LIMIT",
            ErrorCategory::InternalBug => "WEBPRE_INTERNAL_BUG",
        }
    }

    /// Process exit code the CLI uses for this category.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCategory::UserError => 1,
            ErrorCategory::CodecError => 2,
            ErrorCategory::ResourceLimit => 3,
            ErrorCategory::InternalBug => 70,
        }
    }
}

/// webpre error types
#[derive(Debug, Error)]
pub enum WebpreError {
    // File I/O Errors
    #[error("File not found: {path}")]
    FileNotFound { path: Cow<'static, str> },

    #[error("Failed to read file '{path}': {source}")]
    FileReadFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWriteFailed {
        path: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy '{from}' to '{to}': {source}")]
    FileCopyFailed {
        from: Cow<'static, str>,
        to: Cow<'static, str>,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination path '{path}' already exists. Use -f to overwrite")]
    DestinationExists { path: Cow<'static, str> },

    // Decode Errors
    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    #[error("Corrupted image data")]
    CorruptedImage,

    // Size Limit Errors
    #[error("Image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    // Comparison Errors
    #[error(
        "Images must have same dimension: {left_width}x{left_height} vs {right_width}x{right_height}"
    )]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    #[error("Image {width}x{height} is empty")]
    EmptyImage { width: u32, height: u32 },

    #[error(
        "Image {width}x{height} is too small to score: SSIM statistics divide by (width * height) - 1, which needs at least 2 pixels"
    )]
    TooFewSamples { width: u32, height: u32 },

    // Encode Errors
    #[error("Failed to encode as {format}: {message}")]
    EncodeFailed {
        format: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    // Configuration Errors
    #[error("Invalid value for {name}: {value}. {reason}")]
    InvalidArgument {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    // Internal Errors
    #[error("Internal error: {message}")]
    InternalPanic { message: Cow<'static, str> },
}

// Constructor Helpers
impl WebpreError {
    pub fn file_not_found(path: impl Into<Cow<'static, str>>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn file_read_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            source,
        }
    }

    pub fn file_write_failed(path: impl Into<Cow<'static, str>>, source: std::io::Error) -> Self {
        Self::FileWriteFailed {
            path: path.into(),
            source,
        }
    }

    pub fn file_copy_failed(
        from: impl Into<Cow<'static, str>>,
        to: impl Into<Cow<'static, str>>,
        source: std::io::Error,
    ) -> Self {
        Self::FileCopyFailed {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    pub fn destination_exists(path: impl Into<Cow<'static, str>>) -> Self {
        Self::DestinationExists { path: path.into() }
    }

    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn corrupted_image() -> Self {
        Self::CorruptedImage
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn dimension_mismatch(left: (u32, u32), right: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            left_width: left.0,
            left_height: left.1,
            right_width: right.0,
            right_height: right.1,
        }
    }

    pub fn empty_image(width: u32, height: u32) -> Self {
        Self::EmptyImage { width, height }
    }

    pub fn too_few_samples(width: u32, height: u32) -> Self {
        Self::TooFewSamples { width, height }
    }

    pub fn encode_failed(
        format: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn internal_panic(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InternalPanic {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (user can fix it)
    ///
    /// Consistent with category(): UserError and ResourceLimit are recoverable,
    /// CodecError and InternalBug are not.
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::ResourceLimit => true,
            ErrorCategory::CodecError | ErrorCategory::InternalBug => false,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileNotFound { .. }
            | Self::DestinationExists { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::UserError,

            // A size mismatch between original and candidate means the codec
            // returned something other than what was encoded.
            Self::UnsupportedFormat { .. }
            | Self::DecodeFailed { .. }
            | Self::CorruptedImage
            | Self::EncodeFailed { .. }
            | Self::DimensionMismatch { .. }
            | Self::EmptyImage { .. }
            | Self::TooFewSamples { .. } => ErrorCategory::CodecError,

            Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. }
            | Self::FileReadFailed { .. }
            | Self::FileWriteFailed { .. }
            | Self::FileCopyFailed { .. } => ErrorCategory::ResourceLimit,

            Self::InternalPanic { .. } => ErrorCategory::InternalBug,
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, WebpreError>;
