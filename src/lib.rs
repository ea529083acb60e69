//! # frameload
//!
//! Bounded video-frame extraction into flat RGB buffers — a decode-session
//! engine for data-loading pipelines (ML training samplers and similar),
//! powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! Each call opens one [`DecodeSession`] over a container file, resolves
//! stream metadata (estimating frame counts for containers that omit them),
//! decodes a bounded subset of frames under a hard cumulative wall-clock
//! timeout, and writes packed RGB24 pixels into a single contiguous
//! [`FrameBuffer`]. Two selection modes are supported: a sampled window of
//! consecutive frames ([`WindowRequest`]) and an explicit list of frame
//! indices ([`IndicesRequest`]).
//!
//! ## Quick Start
//!
//! ### Sample a window of frames
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use frameload::{WindowRequest, extract_by_window};
//!
//! let request = WindowRequest::new(32).with_random_seek();
//! let extraction = extract_by_window("clip.mp4", &request, Duration::from_secs(3))?;
//! println!(
//!     "{} frames of {}x{} (replayable at seek_distance={})",
//!     extraction.frames_decoded, extraction.width, extraction.height,
//!     extraction.seek_distance,
//! );
//! # Ok::<(), frameload::LoadError>(())
//! ```
//!
//! ### Extract exact frame indices
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use frameload::{IndicesRequest, extract_by_indices};
//!
//! let request = IndicesRequest::new(vec![0, 10, 10, 25]).with_resize(224);
//! let extraction = extract_by_indices("clip.mp4", &request, Duration::from_secs(3))?;
//! assert_eq!(extraction.buffer.frames(), 4);
//! # Ok::<(), frameload::LoadError>(())
//! ```
//!
//! ## Design highlights
//!
//! - **Cumulative timeout** — one [`deadline::Deadline`] per session,
//!   installed as the demuxer's interrupt callback before any I/O; the
//!   budget accrues across open, probe, seek, and decode.
//! - **Best-effort buffers** — requesting more frames than the stream holds
//!   fills what exists and leaves the rest zeroed, with no error; a missing
//!   video stream can fail open (see [`extract_by_window`]).
//! - **Byte-exact layout** — frames concatenated in request order, each
//!   row-major packed RGB24, no stride, no padding ([`FrameBuffer`]).
//! - **Single-threaded sessions** — no internal parallelism, no shared
//!   mutable state between sessions; run concurrent sessions on separate
//!   threads freely.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the system; see the
//! `ffmpeg-next` build documentation for platform specifics.

pub mod backend;
pub mod buffer;
mod conversion;
pub mod deadline;
pub mod error;
pub mod geometry;
pub mod indices;
pub mod metadata;
pub mod session;
pub mod window;

use std::{path::Path, time::Duration};

pub use backend::{BackendLogLevel, set_backend_log_level};
pub use buffer::FrameBuffer;
pub use deadline::DEFAULT_TIMEOUT;
pub use error::{ErrorKind, LoadError};
pub use geometry::OutputGeometry;
pub use indices::{IndexedExtraction, IndicesRequest};
pub use metadata::StreamInfo;
pub use session::{DecodeSession, frame_count, open_session};
pub use window::{WindowExtraction, WindowRequest};

/// Open a session over `path` and run the window-based seek sampler.
///
/// This is the path-level form of [`DecodeSession::extract_window`] with the
/// fail-open behavior for containers that hold no video stream: when the
/// request carries explicit dimensions, the buffer is still allocated and
/// returned with [`WindowExtraction::missing_stream`] set and zero frames
/// decoded, so data loaders that tolerate bad samples can keep going. Use
/// [`WindowExtraction::require_video`] to turn that outcome back into an
/// error. With dynamic sizing (`0x0`) there are no dimensions to size the
/// buffer from, so [`LoadError::MissingVideoStream`] surfaces directly.
///
/// # Errors
///
/// Every [`DecodeSession::open`] error except the fail-open case above, plus
/// [`LoadError::DimensionMismatch`] and allocation failures.
pub fn extract_by_window<P: AsRef<Path>>(
    path: P,
    request: &WindowRequest,
    timeout: Duration,
) -> Result<WindowExtraction, LoadError> {
    match DecodeSession::open(path.as_ref(), timeout) {
        Ok(session) => session.extract_window(request),
        Err(LoadError::MissingVideoStream) if request.width > 0 && request.height > 0 => {
            log::warn!(
                "{}: no video stream; returning an unfilled {}x{} buffer (fail-open)",
                path.as_ref().display(),
                request.width,
                request.height,
            );
            window::missing_stream_extraction(request)
        }
        Err(error) => Err(error),
    }
}

/// Open a session over `path` and run the indexed extractor.
///
/// The indices path never fails open; a container without a video stream is
/// always [`LoadError::MissingVideoStream`].
///
/// # Errors
///
/// Every [`DecodeSession::open`] error, plus
/// [`LoadError::DimensionMismatch`] and allocation failures.
pub fn extract_by_indices<P: AsRef<Path>>(
    path: P,
    request: &IndicesRequest,
    timeout: Duration,
) -> Result<IndexedExtraction, LoadError> {
    DecodeSession::open(path, timeout)?.extract_indices(request)
}
