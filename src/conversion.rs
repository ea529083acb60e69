//! Pixel conversion and timestamp rescaling.
//!
//! [`RgbConverter`] is the scale/convert stage: it turns decoded frames in
//! their native pixel format into packed RGB24 at the resolved output
//! dimensions, writing straight into the caller's buffer slot with the
//! backend's row stride stripped. The module also hosts the shared
//! timestamp-rescaling arithmetic used by metadata estimation and the seek
//! sampler.

use ffmpeg_next::{
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::LoadError;

/// Rescale `value * numerator / denominator`, rounding toward negative
/// infinity and passing the int64 sentinels (`i64::MIN`, `i64::MAX`)
/// through unchanged.
///
/// Matches FFmpeg's `av_rescale_rnd` under `AV_ROUND_DOWN | AV_ROUND_PASS_MINMAX`,
/// computed in 128-bit so that the `duration * AV_TIME_BASE` style inputs used
/// by metadata estimation cannot overflow.
pub(crate) fn rescale_floor(value: i64, numerator: i64, denominator: i64) -> i64 {
    if value == i64::MIN || value == i64::MAX {
        return value;
    }
    let scaled = value as i128 * numerator as i128;
    scaled.div_euclid(denominator as i128) as i64
}

/// Upper bound of the valid window start range, in time-base units.
///
/// A window of `num_frames` starting past this point would run off the end
/// of the stream, so the sampler draws its start from `[0, upper]`. Clamped
/// to zero for streams shorter than the window.
pub(crate) fn window_start_upper_bound(
    duration: i64,
    average_frame_duration: f64,
    num_frames: usize,
) -> i64 {
    let window_span = (num_frames as f64 * average_frame_duration) as i64;
    (duration - window_span).max(0)
}

/// Converts decoded frames to packed RGB24 at fixed output dimensions.
///
/// Wraps one reusable software-scaling context plus one reusable RGB frame,
/// so a whole extraction reuses the same scratch allocations. Bilinear
/// filtering is used; when the native and target dimensions match, the
/// scaler degenerates to a pure format conversion.
pub(crate) struct RgbConverter {
    scaler: ScalingContext,
    rgb_frame: VideoFrame,
    width: u32,
    height: u32,
}

impl RgbConverter {
    /// Build a converter from the decoder's native format to RGB24 at
    /// `width` x `height`.
    pub(crate) fn new(
        source_format: Pixel,
        source_width: u32,
        source_height: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, LoadError> {
        let scaler = ScalingContext::get(
            source_format,
            source_width,
            source_height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| LoadError::Backend(error.to_string()))?;

        Ok(Self {
            scaler,
            rgb_frame: VideoFrame::empty(),
            width,
            height,
        })
    }

    /// Convert one decoded frame and write it into `destination`.
    ///
    /// `destination` must be exactly `width * height * 3` bytes; rows are
    /// written back to back with no padding, so the slot can be handed to
    /// downstream consumers as a raw row-major RGB24 image.
    pub(crate) fn convert_into(
        &mut self,
        frame: &VideoFrame,
        destination: &mut [u8],
    ) -> Result<(), LoadError> {
        debug_assert_eq!(
            destination.len(),
            self.width as usize * self.height as usize * 3
        );

        self.scaler
            .run(frame, &mut self.rgb_frame)
            .map_err(|error| LoadError::Backend(error.to_string()))?;

        let stride = self.rgb_frame.stride(0);
        let row_bytes = self.width as usize * 3;
        let data = self.rgb_frame.data(0);

        if stride == row_bytes {
            // No padding: the whole plane is already packed.
            destination.copy_from_slice(&data[..row_bytes * self.height as usize]);
        } else {
            // Stride carries padding bytes: strip it row by row.
            for row in 0..self.height as usize {
                let source_start = row * stride;
                destination[row * row_bytes..(row + 1) * row_bytes]
                    .copy_from_slice(&data[source_start..source_start + row_bytes]);
            }
        }
        Ok(())
    }
}
