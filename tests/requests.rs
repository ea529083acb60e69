//! Request builder behavior tests.
//!
//! These are pure and need no media fixtures.

use frameload::{IndicesRequest, WindowRequest};

#[test]
fn window_request_defaults() {
    let request = WindowRequest::new(32);
    assert_eq!(request.num_frames, 32);
    assert_eq!(request.width, 0);
    assert_eq!(request.height, 0);
    assert!(!request.random_seek);
    assert_eq!(request.seek_distance, 0.0);
}

#[test]
fn window_seek_distance_is_clamped_to_unit_interval() {
    let request = WindowRequest::new(1).with_seek_distance(1.5);
    assert_eq!(request.seek_distance, 1.0);

    let request = WindowRequest::new(1).with_seek_distance(-0.25);
    assert_eq!(request.seek_distance, 0.0);

    let request = WindowRequest::new(1).with_seek_distance(0.75);
    assert_eq!(request.seek_distance, 0.75);
}

#[test]
fn window_request_dimensions() {
    let request = WindowRequest::new(8).with_dimensions(640, 480);
    assert_eq!(request.width, 640);
    assert_eq!(request.height, 480);
}

#[test]
fn indices_request_defaults() {
    let request = IndicesRequest::new(vec![0, 5, 5, 9]);
    assert_eq!(request.indices, vec![0, 5, 5, 9]);
    assert_eq!(request.resize, 0);
    assert!(!request.keyframes_only);
    assert!(!request.allow_seek);
    assert!(!request.effective_allow_seek());
}

#[test]
fn keyframes_only_disables_seeking() {
    let request = IndicesRequest::new(vec![0]).with_seek();
    assert!(request.effective_allow_seek());

    let request = IndicesRequest::new(vec![0]).with_seek().with_keyframes_only();
    assert!(request.allow_seek);
    assert!(!request.effective_allow_seek());
}

#[test]
fn indices_request_resize_and_dimensions() {
    let request = IndicesRequest::new(vec![1, 2])
        .with_dimensions(1920, 1080)
        .with_resize(224);
    assert_eq!(request.width, 1920);
    assert_eq!(request.height, 1080);
    assert_eq!(request.resize, 224);
}
