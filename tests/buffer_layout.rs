//! Frame buffer allocation and layout tests.
//!
//! These are pure and need no media fixtures.

use frameload::{FrameBuffer, LoadError};

#[test]
fn allocation_is_zero_filled_and_exact() {
    let buffer = FrameBuffer::allocate(4, 8, 2).expect("Failed to allocate");
    assert_eq!(buffer.frames(), 4);
    assert_eq!(buffer.width(), 8);
    assert_eq!(buffer.height(), 2);
    assert_eq!(buffer.frame_len(), 8 * 2 * 3);
    assert_eq!(buffer.data().len(), 4 * 8 * 2 * 3);
    assert!(buffer.data().iter().all(|&byte| byte == 0));
}

#[test]
fn zero_frames_allocates_an_empty_buffer() {
    let buffer = FrameBuffer::allocate(0, 640, 480).expect("Failed to allocate");
    assert_eq!(buffer.frames(), 0);
    assert!(buffer.data().is_empty());
    assert!(buffer.frame(0).is_none());
}

#[test]
fn zero_dimensions_allocate_an_empty_buffer() {
    let buffer = FrameBuffer::allocate(16, 0, 0).expect("Failed to allocate");
    assert_eq!(buffer.frames(), 16);
    assert_eq!(buffer.frame_len(), 0);
    assert!(buffer.data().is_empty());
}

#[test]
fn frame_slices_are_contiguous_in_order() {
    let buffer = FrameBuffer::allocate(3, 2, 2).expect("Failed to allocate");
    let frame_len = buffer.frame_len();
    for index in 0..3 {
        let frame = buffer.frame(index).expect("Slot should exist");
        assert_eq!(frame.len(), frame_len);
        assert_eq!(frame.as_ptr(), buffer.data()[index * frame_len..].as_ptr());
    }
    assert!(buffer.frame(3).is_none());
}

#[test]
fn overflowing_allocation_is_an_error_not_a_panic() {
    let result = FrameBuffer::allocate(usize::MAX, 1920, 1080);
    assert!(matches!(result, Err(LoadError::BufferAllocation { .. })));
}

#[test]
fn frame_image_matches_dimensions() {
    let buffer = FrameBuffer::allocate(2, 4, 3).expect("Failed to allocate");
    let image = buffer.frame_image(1).expect("Slot should exist");
    assert_eq!(image.width(), 4);
    assert_eq!(image.height(), 3);
    assert!(buffer.frame_image(2).is_none());
}

#[test]
fn into_vec_hands_back_the_full_buffer() {
    let buffer = FrameBuffer::allocate(2, 2, 2).expect("Failed to allocate");
    let bytes = buffer.into_vec();
    assert_eq!(bytes.len(), 2 * 2 * 2 * 3);
}
