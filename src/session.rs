//! The decode session.
//!
//! [`DecodeSession`] ties the whole engine together: it owns the open
//! container and decoder handles, the session [`Deadline`], the resolved
//! [`StreamInfo`], and a reusable decoded-frame slot, and exposes the decode
//! and seek primitives the two extraction paths are built on. A session
//! performs at most one extraction; the extraction methods consume it, so
//! demux position can never leak between extractions.
//!
//! Resource discipline is expressed through drop order: the decoder field is
//! declared before the container, so it is always closed first, on every
//! exit path. The deadline box is declared last because the container's
//! interrupt callback holds a pointer to it until the container closes.

use std::{fmt, path::Path, path::PathBuf, time::Duration};

use ffmpeg_next::{
    Error as FfmpegError, Packet, codec::context::Context as CodecContext, decoder,
    format::Pixel, format::context::Input, frame::Video as VideoFrame, media::Type,
    util::error::EAGAIN,
};
use ffmpeg_sys_next::{AVSEEK_FLAG_BACKWARD, av_seek_frame};

use crate::{
    backend,
    deadline::Deadline,
    error::LoadError,
    indices::{IndexedExtraction, IndicesRequest},
    metadata::{StreamInfo, resolve_stream_info},
    window::{WindowExtraction, WindowRequest},
};

/// One end-to-end open, extract, close lifecycle over a single file.
///
/// Created by [`DecodeSession::open`]; destroyed when dropped or when an
/// extraction method consumes it. Sessions share no mutable state, so
/// independent sessions may run on independent threads.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use frameload::{DecodeSession, WindowRequest};
///
/// let session = DecodeSession::open("clip.mp4", Duration::from_secs(3))?;
/// println!("{} frames", session.frame_count());
/// let extraction = session.extract_window(&WindowRequest::new(16))?;
/// # Ok::<(), frameload::LoadError>(())
/// ```
pub struct DecodeSession {
    // Field order is drop order: decoder closes before the container it
    // depends on; the deadline outlives the container because the interrupt
    // callback installed on it points at the deadline.
    pub(crate) decoder: decoder::Video,
    pub(crate) input: Input,
    deadline: Box<Deadline>,
    info: StreamInfo,
    pub(crate) decoded: VideoFrame,
    draining: bool,
    path: PathBuf,
}

impl fmt::Debug for DecodeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeSession")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("budget", &self.deadline.budget())
            .field("elapsed", &self.deadline.elapsed())
            .finish_non_exhaustive()
    }
}

impl DecodeSession {
    /// Open a container and resolve its video-stream metadata.
    ///
    /// Initialises FFmpeg (idempotent), installs the session deadline on the
    /// demux context before any I/O, opens the input, probes streams, picks
    /// the first video stream, opens its decoder, and resolves duration and
    /// frame count (estimating both for containers that omit them).
    ///
    /// A zero `timeout` is coerced to [`DEFAULT_TIMEOUT`](crate::DEFAULT_TIMEOUT);
    /// the budget is cumulative over every blocking call the session makes.
    ///
    /// # Errors
    ///
    /// - [`LoadError::ContainerOpen`] when the file cannot be opened.
    /// - [`LoadError::StreamProbe`] when stream info cannot be probed.
    /// - [`LoadError::MissingVideoStream`] when no video stream exists.
    /// - [`LoadError::DecoderOpen`] / [`LoadError::UnknownPixelFormat`] when
    ///   the decoder cannot be brought up.
    /// - [`LoadError::UnknownFrameRate`] when the frame count must be
    ///   estimated but the stream reports no average frame rate.
    /// - [`LoadError::Timeout`] when the budget expires during open.
    pub fn open<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self, LoadError> {
        let path = path.as_ref();
        backend::init()?;

        let deadline = Box::new(Deadline::new(timeout));
        let input = backend::open_guarded(path, &deadline)?;

        let stream = input
            .streams()
            .find(|stream| stream.parameters().medium() == Type::Video)
            .ok_or(LoadError::MissingVideoStream)?;
        let stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .and_then(|context| context.decoder().video())
            .map_err(|error| LoadError::DecoderOpen(error.to_string()))?;
        if decoder.format() == Pixel::None {
            return Err(LoadError::UnknownPixelFormat);
        }

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let info = resolve_stream_info(&input, &stream, decoder.width(), decoder.height(), codec)?;
        drop(stream);

        log::info!(
            "Opened decode session: {} (stream={}, {}x{}, codec={}, ~{} frames, budget={:?})",
            path.display(),
            stream_index,
            info.width,
            info.height,
            info.codec,
            info.frame_count,
            deadline.budget(),
        );

        Ok(Self {
            decoder,
            input,
            deadline,
            info,
            decoded: VideoFrame::empty(),
            draining: false,
            path: path.to_path_buf(),
        })
    }

    /// The resolved metadata for the selected video stream.
    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Resolved total frame count (reported or estimated).
    pub fn frame_count(&self) -> i64 {
        self.info.frame_count
    }

    /// Path the session was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extract a window of consecutive frames; see
    /// [`extract_by_window`](crate::extract_by_window) for the path-level
    /// form with fail-open handling.
    pub fn extract_window(self, request: &WindowRequest) -> Result<WindowExtraction, LoadError> {
        crate::window::extract(self, request)
    }

    /// Extract explicitly-listed frame indices; see
    /// [`extract_by_indices`](crate::extract_by_indices).
    pub fn extract_indices(self, request: &IndicesRequest) -> Result<IndexedExtraction, LoadError> {
        crate::indices::extract(self, request)
    }

    // ── Decode primitives ──────────────────────────────────────────────

    /// Engine-side deadline poll, used between backend calls so a long run
    /// of buffered decoding cannot overrun the budget unnoticed.
    pub(crate) fn check_deadline(&self) -> Result<(), LoadError> {
        if self.deadline.check() {
            Ok(())
        } else {
            Err(self.timeout_error())
        }
    }

    fn timeout_error(&self) -> LoadError {
        LoadError::Timeout {
            budget: self.deadline.budget(),
        }
    }

    /// Presentation timestamp of the frame currently in the decoded slot.
    pub(crate) fn frame_pts(&self) -> i64 {
        self.decoded.pts().unwrap_or(0)
    }

    /// Decode the next frame of the video stream into the reusable slot.
    ///
    /// Returns `Ok(false)` at end of stream. Mid-stream demux or decode
    /// errors are logged and treated as end of stream (the best-effort fill
    /// policy), except when the deadline has expired, which always surfaces
    /// as [`LoadError::Timeout`].
    pub(crate) fn next_frame(&mut self) -> Result<bool, LoadError> {
        loop {
            self.check_deadline()?;

            match self.decoder.receive_frame(&mut self.decoded) {
                Ok(()) => return Ok(true),
                Err(FfmpegError::Eof) => return Ok(false),
                Err(FfmpegError::Other { errno }) if errno == EAGAIN => {}
                Err(error) => {
                    if self.deadline.is_expired() {
                        return Err(self.timeout_error());
                    }
                    log::warn!("Decoder error, treating as end of stream: {error}");
                    return Ok(false);
                }
            }

            if self.draining {
                // send_eof already queued; the decoder owes us Eof next.
                continue;
            }

            match self.read_video_packet()? {
                Some(packet) => {
                    if let Err(error) = self.decoder.send_packet(&packet) {
                        if self.deadline.is_expired() {
                            return Err(self.timeout_error());
                        }
                        log::warn!("Dropping undecodable packet: {error}");
                    }
                }
                None => {
                    if let Err(error) = self.decoder.send_eof() {
                        log::warn!("Decoder refused flush: {error}");
                        return Ok(false);
                    }
                    self.draining = true;
                }
            }
        }
    }

    /// Read the next packet belonging to the video stream.
    ///
    /// Uses an explicit [`Packet::read`] loop rather than the packet
    /// iterator: the iterator swallows read errors, which would spin forever
    /// once the interrupt callback starts aborting reads.
    fn read_video_packet(&mut self) -> Result<Option<Packet>, LoadError> {
        let mut packet = Packet::empty();
        loop {
            self.check_deadline()?;
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.info.stream_index {
                        return Ok(Some(packet));
                    }
                }
                Err(FfmpegError::Eof) => return Ok(None),
                Err(error) => {
                    if self.deadline.is_expired() {
                        return Err(self.timeout_error());
                    }
                    log::warn!("Demux error, treating as end of stream: {error}");
                    return Ok(None);
                }
            }
        }
    }

    /// Seek to the nearest keyframe at or before `timestamp` (time-base
    /// units) and reset decoder state.
    ///
    /// Containers index only keyframes, so the demuxer may land earlier than
    /// requested; callers skip forward by decoding.
    pub(crate) fn seek_backward(&mut self, timestamp: i64) -> Result<(), LoadError> {
        self.check_deadline()?;

        // SAFETY: both pointers are valid for the lifetime of self; the
        // backward seek itself polls the interrupt callback.
        let status = unsafe {
            av_seek_frame(
                self.input.as_mut_ptr(),
                self.info.stream_index as i32,
                timestamp,
                AVSEEK_FLAG_BACKWARD,
            )
        };
        if status < 0 {
            if self.deadline.is_expired() {
                return Err(self.timeout_error());
            }
            return Err(LoadError::Backend(FfmpegError::from(status).to_string()));
        }

        self.decoder.flush();
        self.draining = false;
        log::debug!("Seeked backward to timestamp {timestamp}");
        Ok(())
    }
}

/// Open a session, return its resolved frame count, and close it.
///
/// # Errors
///
/// Propagates every [`DecodeSession::open`] error.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// let count = frameload::frame_count("clip.mp4", Duration::from_secs(3))?;
/// assert!(count >= 0);
/// # Ok::<(), frameload::LoadError>(())
/// ```
pub fn frame_count<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<i64, LoadError> {
    let session = DecodeSession::open(path, timeout)?;
    Ok(session.frame_count())
}

/// Alias for [`DecodeSession::open`], for callers that prefer free functions.
pub fn open_session<P: AsRef<Path>>(
    path: P,
    timeout: Duration,
) -> Result<DecodeSession, LoadError> {
    DecodeSession::open(path, timeout)
}
