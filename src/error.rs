//! Error types for the `frameload` crate.
//!
//! This module defines [`LoadError`], the unified error type returned by all
//! fallible operations in the crate, and [`ErrorKind`], the coarse taxonomy
//! that host bindings map onto their native error types. Errors carry enough
//! context (file paths, requested vs. native dimensions, elapsed budgets) to
//! diagnose problems without additional logging at the call site.

use std::{path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// Coarse classification of a [`LoadError`].
///
/// Every error maps onto exactly one kind via [`LoadError::kind`]. The four
/// kinds are exhaustive: host bindings can match on them to pick a native
/// error or exception type without inspecting individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Container or codec open failure, or an internal backend failure.
    Io,
    /// A malformed request, missing stream, dimension mismatch, or
    /// unparseable stream metadata.
    Validation,
    /// The cumulative session budget was exceeded.
    Timeout,
    /// A buffer or auxiliary allocation failed.
    OutOfMemory,
}

/// The unified error type for all `frameload` operations.
///
/// Every public method that can fail returns `Result<T, LoadError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The container file could not be opened.
    #[error("Failed to open container at {path}: {reason}")]
    ContainerOpen {
        /// Path that was passed to [`crate::DecodeSession::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// Stream information could not be probed after the container opened.
    #[error("Stream index not found: {0}")]
    StreamProbe(String),

    /// The container holds no video stream.
    ///
    /// This condition is distinguished from generic I/O failures so that
    /// callers may tolerate it; the window extraction path fails open on it
    /// (see [`crate::extract_by_window`]).
    #[error("No video stream found in container")]
    MissingVideoStream,

    /// A decoder could not be opened for the selected video stream.
    #[error("Failed to open video decoder: {0}")]
    DecoderOpen(String),

    /// The decoder reported no pixel format after opening.
    #[error("Video decoder reported no pixel format")]
    UnknownPixelFormat,

    /// The stream carries no usable average frame rate, so the frame count
    /// cannot be estimated.
    #[error("Video frame rate unknown; cannot estimate frame count")]
    UnknownFrameRate,

    /// Caller-supplied dimensions do not match the codec's native dimensions.
    #[error(
        "Requested dimensions {requested_width}x{requested_height} do not match \
         native dimensions {native_width}x{native_height}"
    )]
    DimensionMismatch {
        /// Width passed by the caller.
        requested_width: u32,
        /// Height passed by the caller.
        requested_height: u32,
        /// Width reported by the opened decoder.
        native_width: u32,
        /// Height reported by the opened decoder.
        native_height: u32,
    },

    /// The request itself was malformed (empty geometry, arithmetic
    /// overflow in the buffer size, and similar).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The cumulative session budget was exceeded.
    ///
    /// The budget accrues across open, probe, seek, and decode calls within
    /// one session; see [`crate::deadline::Deadline`].
    #[error("Decode session exceeded its time budget of {budget:?}")]
    Timeout {
        /// The budget the session was opened with (after zero-coercion).
        budget: Duration,
    },

    /// The output frame buffer could not be allocated.
    #[error("Failed to allocate {bytes} byte frame buffer")]
    BufferAllocation {
        /// The allocation size that was requested.
        bytes: usize,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Backend(String),
}

impl LoadError {
    /// Classify this error into its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::ContainerOpen { .. }
            | LoadError::DecoderOpen(_)
            | LoadError::UnknownPixelFormat
            | LoadError::Backend(_) => ErrorKind::Io,
            LoadError::StreamProbe(_)
            | LoadError::MissingVideoStream
            | LoadError::UnknownFrameRate
            | LoadError::DimensionMismatch { .. }
            | LoadError::InvalidRequest(_) => ErrorKind::Validation,
            LoadError::Timeout { .. } => ErrorKind::Timeout,
            LoadError::BufferAllocation { .. } => ErrorKind::OutOfMemory,
        }
    }
}

impl From<FfmpegError> for LoadError {
    fn from(error: FfmpegError) -> Self {
        LoadError::Backend(error.to_string())
    }
}
