//! The flat output pixel buffer.
//!
//! [`FrameBuffer`] is the byte-exact compatibility surface of the crate: a
//! single contiguous region of `frames * width * height * 3` bytes, frames
//! concatenated in request order, each frame row-major packed RGB24 with no
//! padding and no stride beyond `width * 3`. Downstream consumers (training
//! samplers reshaping into tensors) depend on exactly this layout.
//!
//! Slots the extraction never reached keep their initial zero bytes; the
//! engine deliberately returns such best-effort buffers instead of failing
//! when a stream runs out of frames.

use image::RgbImage;

use crate::error::LoadError;

/// A contiguous packed-RGB24 buffer holding a fixed number of frame slots.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    frame_len: usize,
    frames: usize,
}

impl FrameBuffer {
    /// Allocate a zero-filled buffer for `frames` frames of `width` x `height`.
    ///
    /// # Errors
    ///
    /// [`LoadError::BufferAllocation`] when the allocation fails or the size
    /// computation overflows `usize`.
    pub fn allocate(frames: usize, width: u32, height: u32) -> Result<Self, LoadError> {
        let frame_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or(LoadError::BufferAllocation { bytes: usize::MAX })?;
        let bytes = frames
            .checked_mul(frame_len)
            .ok_or(LoadError::BufferAllocation { bytes: usize::MAX })?;

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| LoadError::BufferAllocation { bytes })?;
        data.resize(bytes, 0);

        Ok(Self {
            data,
            width,
            height,
            frame_len,
            frames,
        })
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of frame slots (requested frames, not frames decoded).
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Size of one frame slot in bytes (`width * height * 3`).
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// The whole buffer as one contiguous byte slice.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the underlying bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Borrow one frame slot, or `None` when `index` is out of range.
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        if index >= self.frames {
            return None;
        }
        let start = index * self.frame_len;
        Some(&self.data[start..start + self.frame_len])
    }

    /// Mutable access to one frame slot for the decode stages.
    ///
    /// Callers are responsible for `index < frames`.
    pub(crate) fn frame_mut(&mut self, index: usize) -> &mut [u8] {
        let start = index * self.frame_len;
        &mut self.data[start..start + self.frame_len]
    }

    /// Duplicate an already-materialized slot into another slot.
    ///
    /// Used for repeated frame indices, which are satisfied byte-for-byte
    /// without re-decoding.
    pub(crate) fn copy_frame(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let (from_start, to_start) = (from * self.frame_len, to * self.frame_len);
        let source = self.data[from_start..from_start + self.frame_len].to_vec();
        self.data[to_start..to_start + self.frame_len].copy_from_slice(&source);
    }

    /// Copy one frame slot into an [`image::RgbImage`].
    ///
    /// Returns `None` when `index` is out of range. Convenient for PNG dumps
    /// and debugging; the raw slot layout already matches `RgbImage`'s
    /// expectations.
    pub fn frame_image(&self, index: usize) -> Option<RgbImage> {
        let slot = self.frame(index)?;
        RgbImage::from_raw(self.width, self.height, slot.to_vec())
    }
}
