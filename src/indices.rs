//! Explicit-index extraction.
//!
//! An [`IndicesRequest`] names the exact frames to materialize, in request
//! order, with duplicates and out-of-range values permitted. Three decode
//! strategies cover the different request shapes:
//!
//! - default: one sequential decode pass, writing every slot whose index
//!   matches the running frame counter (duplicates fan out without
//!   re-decoding);
//! - `keyframes_only`: sequential decode counting only keyframes, so index
//!   `k` selects the k-th keyframe in stream order;
//! - `allow_seek`: an independent backward seek per requested index, for
//!   sparse index lists where a full linear scan would dominate.
//!
//! Slots whose index can never be satisfied (negative, past the end of the
//! stream) keep their zero bytes; that is the best-effort policy, not an
//! error.

use std::collections::HashMap;

use crate::{
    buffer::FrameBuffer,
    conversion::RgbConverter,
    error::LoadError,
    geometry::OutputGeometry,
    session::DecodeSession,
};

/// A request for explicitly-listed frame indices.
///
/// ```
/// use frameload::IndicesRequest;
///
/// let request = IndicesRequest::new(vec![5, 5, 2])
///     .with_resize(320);
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct IndicesRequest {
    /// Frame indices to materialize, in output order. Duplicates and
    /// out-of-range values are permitted.
    pub indices: Vec<i64>,
    /// Requested output width; `0` together with `height == 0` resolves
    /// dynamically from the codec.
    pub width: u32,
    /// Requested output height.
    pub height: u32,
    /// Nonzero pins the longer output side to this value and scales the
    /// shorter side proportionally, overriding `width`/`height`.
    pub resize: u32,
    /// Interpret each index as "the k-th keyframe" and decode keyframes
    /// only. Forces `allow_seek` off.
    pub keyframes_only: bool,
    /// Seek toward each index instead of scanning linearly.
    pub allow_seek: bool,
}

impl IndicesRequest {
    /// Request the given frame indices with dynamic sizing and the default
    /// sequential-scan strategy.
    pub fn new(indices: Vec<i64>) -> Self {
        Self {
            indices,
            width: 0,
            height: 0,
            resize: 0,
            keyframes_only: false,
            allow_seek: false,
        }
    }

    /// Require exact output dimensions (must match the codec's native size).
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Pin the longer output side to `resize` pixels.
    pub fn with_resize(mut self, resize: u32) -> Self {
        self.resize = resize;
        self
    }

    /// Select the k-th keyframe per index instead of the k-th frame.
    pub fn with_keyframes_only(mut self) -> Self {
        self.keyframes_only = true;
        self
    }

    /// Seek toward each requested index instead of scanning linearly.
    pub fn with_seek(mut self) -> Self {
        self.allow_seek = true;
        self
    }

    /// Whether per-index seeking is in effect after normalization
    /// (`keyframes_only` forces sequential decode, so it wins).
    pub fn effective_allow_seek(&self) -> bool {
        self.allow_seek && !self.keyframes_only
    }
}

/// The outcome of an indexed extraction.
#[derive(Debug)]
pub struct IndexedExtraction {
    /// The output pixel buffer, one slot per requested index.
    pub buffer: FrameBuffer,
    /// Resolved output width.
    pub width: u32,
    /// Resolved output height.
    pub height: u32,
    /// Whether the dimensions were resolved dynamically from the codec.
    pub size_was_dynamic: bool,
    /// Whether a nonzero `resize` produced the dimensions.
    pub resized: bool,
    /// Number of output slots actually written.
    pub slots_filled: usize,
}

/// Run the indexed extractor over an open session. Consumes the session.
pub(crate) fn extract(
    mut session: DecodeSession,
    request: &IndicesRequest,
) -> Result<IndexedExtraction, LoadError> {
    let info = session.info().clone();
    let geometry = OutputGeometry::resolve(
        info.width,
        info.height,
        request.width,
        request.height,
        request.resize,
    )?;
    let mut buffer = FrameBuffer::allocate(request.indices.len(), geometry.width, geometry.height)?;

    let mut converter = RgbConverter::new(
        session.decoder.format(),
        info.width,
        info.height,
        geometry.width,
        geometry.height,
    )?;

    let slots_filled = if request.effective_allow_seek() {
        extract_with_seeks(&mut session, request, &mut buffer, &mut converter)?
    } else {
        extract_sequential(
            &mut session,
            &request.indices,
            request.keyframes_only,
            &mut buffer,
            &mut converter,
        )?
    };

    if slots_filled < request.indices.len() {
        log::debug!(
            "Filled {slots_filled} of {} requested slots; the rest were unreachable \
             and stay zero-filled",
            request.indices.len(),
        );
    }

    Ok(IndexedExtraction {
        buffer,
        width: geometry.width,
        height: geometry.height,
        size_was_dynamic: geometry.size_was_dynamic,
        resized: geometry.resized,
        slots_filled,
    })
}

/// Sequential strategy: one pass from the start of the stream, advancing a
/// counter over frames (or keyframes), materializing every slot whose index
/// matches the counter. Duplicate indices are written by copying the first
/// matching slot.
fn extract_sequential(
    session: &mut DecodeSession,
    indices: &[i64],
    keyframes_only: bool,
    buffer: &mut FrameBuffer,
    converter: &mut RgbConverter,
) -> Result<usize, LoadError> {
    let Some(max_index) = indices.iter().copied().max() else {
        return Ok(0);
    };
    let satisfiable = indices.iter().filter(|&&index| index >= 0).count();
    if satisfiable == 0 {
        return Ok(0);
    }

    let mut counter: i64 = 0;
    let mut filled = 0_usize;

    while filled < satisfiable && counter <= max_index && session.next_frame()? {
        if keyframes_only && !session.decoded.is_key() {
            continue;
        }

        let mut converted_slot: Option<usize> = None;
        for (slot, &index) in indices.iter().enumerate() {
            if index != counter {
                continue;
            }
            match converted_slot {
                None => {
                    converter.convert_into(&session.decoded, buffer.frame_mut(slot))?;
                    converted_slot = Some(slot);
                }
                Some(first) => buffer.copy_frame(first, slot),
            }
            filled += 1;
        }

        counter += 1;
    }

    Ok(filled)
}

/// Seeking strategy: an independent backward seek per requested index,
/// decoding forward from the landed keyframe to the exact frame. A repeated
/// index is satisfied by copying the earlier slot instead of re-seeking.
fn extract_with_seeks(
    session: &mut DecodeSession,
    request: &IndicesRequest,
    buffer: &mut FrameBuffer,
    converter: &mut RgbConverter,
) -> Result<usize, LoadError> {
    let info = session.info().clone();
    let mut materialized: HashMap<i64, usize> = HashMap::new();
    let mut filled = 0_usize;

    for (slot, &index) in request.indices.iter().enumerate() {
        if index < 0 || index >= info.frame_count {
            log::debug!("Index {index} outside [0, {}); slot {slot} left zero-filled", info.frame_count);
            continue;
        }
        if let Some(&earlier) = materialized.get(&index) {
            buffer.copy_frame(earlier, slot);
            filled += 1;
            continue;
        }

        let target_pts = info.frame_number_to_pts(index);
        session.seek_backward(target_pts)?;

        let mut written = false;
        while session.next_frame()? {
            let current = info.pts_to_frame_number(session.frame_pts());
            if current >= index {
                converter.convert_into(&session.decoded, buffer.frame_mut(slot))?;
                materialized.insert(index, slot);
                filled += 1;
                written = true;
                break;
            }
        }
        if !written {
            log::warn!("Stream ended before frame {index}; slot {slot} left zero-filled");
        }
    }

    Ok(filled)
}
