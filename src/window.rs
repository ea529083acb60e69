//! Window-based extraction (the seek sampler).
//!
//! A [`WindowRequest`] asks for `N` consecutive frames starting somewhere in
//! the playable range. The sampler picks a start point (a uniform random
//! draw, or the caller's `seek_distance` for deterministic replay), seeks
//! backward to the nearest keyframe, then decodes and discards frames until
//! the first frame at or past the target timestamp, which becomes output
//! frame zero. Streams with fewer frames than requested simply fill fewer
//! slots; the rest of the buffer keeps its zero bytes, and that is not an
//! error.

use rand::Rng;

use crate::{
    buffer::FrameBuffer,
    conversion::{RgbConverter, window_start_upper_bound},
    error::LoadError,
    geometry::OutputGeometry,
    session::DecodeSession,
};

/// A request for `N` consecutive frames from a sampled window.
///
/// Built with the `with_*` chain:
///
/// ```
/// use frameload::WindowRequest;
///
/// let request = WindowRequest::new(32)
///     .with_dimensions(640, 480)
///     .with_random_seek();
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct WindowRequest {
    /// Number of output frame slots.
    pub num_frames: usize,
    /// Requested output width; `0` together with `height == 0` resolves
    /// dynamically from the codec.
    pub width: u32,
    /// Requested output height.
    pub height: u32,
    /// Draw the window start uniformly at random from the valid range.
    pub random_seek: bool,
    /// Fraction of the valid start range to consume when `random_seek` is
    /// off; ignored (and overwritten in the result) when it is on.
    pub seek_distance: f64,
}

impl WindowRequest {
    /// Request `num_frames` frames with dynamic sizing, deterministic seek
    /// from the start of the stream.
    pub fn new(num_frames: usize) -> Self {
        Self {
            num_frames,
            width: 0,
            height: 0,
            random_seek: false,
            seek_distance: 0.0,
        }
    }

    /// Require exact output dimensions (must match the codec's native size).
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sample the window start uniformly from the valid range.
    pub fn with_random_seek(mut self) -> Self {
        self.random_seek = true;
        self
    }

    /// Start the window at `distance` (clamped to `[0, 1]`) through the
    /// valid range; used for deterministic replay of a sampled window.
    pub fn with_seek_distance(mut self, distance: f64) -> Self {
        self.seek_distance = distance.clamp(0.0, 1.0);
        self.random_seek = false;
        self
    }
}

/// The outcome of a window extraction.
///
/// Dimensions and sampling state are always carried explicitly, so callers
/// never have to infer them from the shape of the result.
#[derive(Debug)]
pub struct WindowExtraction {
    /// The output pixel buffer (`num_frames` slots, zero-filled where the
    /// stream ran out).
    pub buffer: FrameBuffer,
    /// Resolved output width.
    pub width: u32,
    /// Resolved output height.
    pub height: u32,
    /// Whether the dimensions were resolved dynamically from the codec.
    pub size_was_dynamic: bool,
    /// The seek distance actually used (the random draw, or the caller's
    /// deterministic value echoed back).
    pub seek_distance: f64,
    /// Number of frames actually decoded into the buffer.
    pub frames_decoded: usize,
    /// Fail-open flag: the container opened but held no video stream, and
    /// the buffer was returned unfilled. See [`crate::extract_by_window`].
    pub missing_stream: bool,
}

impl WindowExtraction {
    /// Convert the fail-open outcome into a hard error.
    ///
    /// Returns [`LoadError::MissingVideoStream`] when
    /// [`missing_stream`](WindowExtraction::missing_stream) is set;
    /// otherwise passes the extraction through unchanged.
    pub fn require_video(self) -> Result<Self, LoadError> {
        if self.missing_stream {
            Err(LoadError::MissingVideoStream)
        } else {
            Ok(self)
        }
    }
}

/// Build the fail-open result for a container with no video stream.
///
/// Requires explicit caller dimensions; with dynamic sizing there are no
/// native dimensions to size the buffer from, so the caller surfaces the
/// stream-not-found error instead.
pub(crate) fn missing_stream_extraction(
    request: &WindowRequest,
) -> Result<WindowExtraction, LoadError> {
    let buffer = FrameBuffer::allocate(request.num_frames, request.width, request.height)?;
    Ok(WindowExtraction {
        buffer,
        width: request.width,
        height: request.height,
        size_was_dynamic: false,
        // Nothing was drawn under random_seek, so report 0.0 there.
        seek_distance: if request.random_seek {
            0.0
        } else {
            request.seek_distance
        },
        frames_decoded: 0,
        missing_stream: true,
    })
}

/// Run the seek sampler over an open session. Consumes the session.
pub(crate) fn extract(
    mut session: DecodeSession,
    request: &WindowRequest,
) -> Result<WindowExtraction, LoadError> {
    let info = session.info().clone();
    let geometry = OutputGeometry::resolve(info.width, info.height, request.width, request.height, 0)?;
    let mut buffer = FrameBuffer::allocate(request.num_frames, geometry.width, geometry.height)?;

    // Pick the window start within [0, duration - N * avg_frame_duration].
    let upper_bound =
        window_start_upper_bound(info.duration, info.average_frame_duration(), request.num_frames);
    let seek_distance = if request.random_seek {
        rand::rng().random::<f64>()
    } else {
        request.seek_distance.clamp(0.0, 1.0)
    };
    let target = (seek_distance * upper_bound as f64) as i64;

    log::debug!(
        "Window sample: distance={seek_distance:.4}, target={target} of [0, {upper_bound}], \
         {} frames at {}x{}",
        request.num_frames,
        geometry.width,
        geometry.height,
    );

    session.seek_backward(target)?;

    let mut converter = RgbConverter::new(
        session.decoder.format(),
        info.width,
        info.height,
        geometry.width,
        geometry.height,
    )?;

    // The seek landed on a keyframe at or before the target; discard frames
    // strictly before it. The first frame at or past the target is output
    // frame zero.
    let mut frames_decoded = 0;
    let mut skipped = 0_usize;
    while frames_decoded < request.num_frames && session.next_frame()? {
        if frames_decoded == 0 && session.frame_pts() < target {
            skipped += 1;
            continue;
        }
        converter.convert_into(&session.decoded, buffer.frame_mut(frames_decoded))?;
        frames_decoded += 1;
    }

    if frames_decoded < request.num_frames {
        log::debug!(
            "Stream ended after {frames_decoded} of {} frames (skipped {skipped} before target); \
             remaining slots left zero-filled",
            request.num_frames,
        );
    } else if skipped > 0 {
        log::debug!("Skipped {skipped} frames between keyframe and target");
    }

    Ok(WindowExtraction {
        buffer,
        width: geometry.width,
        height: geometry.height,
        size_was_dynamic: geometry.size_was_dynamic,
        seek_distance,
        frames_decoded,
        missing_stream: false,
    })
}
