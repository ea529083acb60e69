//! Stream metadata resolution.
//!
//! [`StreamInfo`] captures the resolved facts about the selected video
//! stream: dimensions, time base, duration, and frame count. Containers that
//! index only keyframes (WebM is the usual offender) report neither a stream
//! duration nor a frame count, so both are estimated from the container-level
//! duration and the stream's average frame rate. See
//! <https://stackoverflow.com/a/32538549> for the background.

use ffmpeg_next::{Rational, Stream, format::context::Input};
use ffmpeg_sys_next::AV_TIME_BASE;

use crate::{conversion::rescale_floor, error::LoadError};

/// Resolved metadata for one video stream.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Index of the stream within the container.
    pub stream_index: usize,
    /// Native coded width in pixels.
    pub width: u32,
    /// Native coded height in pixels.
    pub height: u32,
    /// The stream's time base (seconds per timestamp unit).
    pub time_base: Rational,
    /// The stream's average frame rate.
    pub avg_frame_rate: Rational,
    /// Stream duration in time-base units (reported or estimated).
    pub duration: i64,
    /// Total frame count (reported or estimated).
    pub frame_count: i64,
    /// Name of the video codec, for diagnostics.
    pub codec: String,
}

impl StreamInfo {
    /// Average duration of one frame in time-base units.
    ///
    /// Derived from `duration / frame_count`; zero when the stream is empty.
    pub fn average_frame_duration(&self) -> f64 {
        if self.frame_count <= 0 {
            0.0
        } else {
            self.duration as f64 / self.frame_count as f64
        }
    }

    /// Map a presentation timestamp to a zero-based frame number.
    pub(crate) fn pts_to_frame_number(&self, pts: i64) -> i64 {
        let average = self.average_frame_duration();
        if average <= 0.0 {
            0
        } else {
            (pts as f64 / average).round() as i64
        }
    }

    /// Timestamp (time-base units) at which the given frame is expected.
    pub(crate) fn frame_number_to_pts(&self, frame_number: i64) -> i64 {
        (frame_number as f64 * self.average_frame_duration()) as i64
    }
}

/// Resolve duration and frame count for the selected stream.
///
/// Values the stream reports directly are used verbatim when both are
/// positive. Otherwise the frame count is rescaled from the container-level
/// duration (microseconds) through the average frame rate, and the duration
/// from the same container value through the stream time base, with the
/// `AV_TIME_BASE` factor applied to the divisor so the rounding happens in
/// the higher-precision units. Both rescales round toward negative infinity
/// and pass the int64 sentinels through unchanged.
pub(crate) fn resolve_stream_info(
    input: &Input,
    stream: &Stream<'_>,
    width: u32,
    height: u32,
    codec: String,
) -> Result<StreamInfo, LoadError> {
    let time_base = stream.time_base();
    let avg_frame_rate = stream.avg_frame_rate();

    let reported_duration = stream.duration();
    let reported_frames = stream.frames();

    let (duration, frame_count) = if reported_duration > 0 && reported_frames > 0 {
        (reported_duration, reported_frames)
    } else {
        if avg_frame_rate.denominator() <= 0 {
            return Err(LoadError::UnknownFrameRate);
        }
        let container_duration = input.duration();
        let frame_count = rescale_floor(
            container_duration,
            avg_frame_rate.numerator() as i64,
            avg_frame_rate.denominator() as i64 * AV_TIME_BASE as i64,
        );
        let duration = rescale_floor(
            container_duration,
            time_base.denominator() as i64,
            time_base.numerator() as i64 * AV_TIME_BASE as i64,
        );
        log::debug!(
            "Stream reports no duration/frame count; estimated {frame_count} frames \
             over {duration} time-base units from container duration {container_duration}us \
             at {}/{} fps",
            avg_frame_rate.numerator(),
            avg_frame_rate.denominator(),
        );
        (duration, frame_count)
    };

    Ok(StreamInfo {
        stream_index: stream.index(),
        width,
        height,
        time_base,
        avg_frame_rate,
        duration,
        frame_count,
        codec,
    })
}
