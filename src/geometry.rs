//! Output dimension resolution.
//!
//! The dimension model has three inputs: the codec's native dimensions, the
//! caller's requested `width`/`height` (both zero meaning "resolve
//! dynamically"), and an optional `resize` target that pins the longer side
//! and scales the shorter side proportionally. [`OutputGeometry`] records
//! the resolved outcome together with explicit flags, so callers never have
//! to infer from the result shape whether sizing was dynamic or resized.

use crate::error::LoadError;

/// The resolved output dimensions for one extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputGeometry {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// `true` when the caller passed `0x0` and the dimensions were taken
    /// from the codec.
    pub size_was_dynamic: bool,
    /// `true` when a nonzero `resize` target produced the dimensions.
    pub resized: bool,
}

impl OutputGeometry {
    /// Resolve output dimensions against the codec's native dimensions.
    ///
    /// Rules, in order:
    /// 1. `requested == 0x0` resolves dynamically to the native dimensions;
    ///    anything else must match the native dimensions exactly.
    /// 2. A nonzero `resize` then overrides both: the longer side becomes
    ///    `resize` and the shorter side is scaled proportionally with
    ///    integer truncation.
    ///
    /// # Errors
    ///
    /// - [`LoadError::DimensionMismatch`] when explicit dimensions disagree
    ///   with the codec.
    /// - [`LoadError::InvalidRequest`] when the codec reports zero-sized
    ///   frames, which would make the aspect-ratio math meaningless.
    pub fn resolve(
        native_width: u32,
        native_height: u32,
        requested_width: u32,
        requested_height: u32,
        resize: u32,
    ) -> Result<Self, LoadError> {
        if native_width == 0 || native_height == 0 {
            return Err(LoadError::InvalidRequest(format!(
                "codec reports degenerate native dimensions {native_width}x{native_height}"
            )));
        }

        let size_was_dynamic = requested_width == 0 && requested_height == 0;
        let (mut width, mut height) = if size_was_dynamic {
            (native_width, native_height)
        } else {
            if requested_width != native_width || requested_height != native_height {
                return Err(LoadError::DimensionMismatch {
                    requested_width,
                    requested_height,
                    native_width,
                    native_height,
                });
            }
            (requested_width, requested_height)
        };

        let resized = resize > 0;
        if resized {
            if width >= height {
                height = (resize as u64 * height as u64 / width as u64) as u32;
                width = resize;
            } else {
                width = (resize as u64 * width as u64 / height as u64) as u32;
                height = resize;
            }
        }

        Ok(Self {
            width,
            height,
            size_was_dynamic,
            resized,
        })
    }
}
