//! Window extraction integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and skip themselves when the fixtures are missing.

use std::{path::Path, time::Duration};

use frameload::{DEFAULT_TIMEOUT, LoadError, WindowRequest, extract_by_window, open_session};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn sample_audio_only_path() -> &'static str {
    "tests/fixtures/sample_audio_only.m4a"
}

#[test]
fn decodes_a_window_from_the_start() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let request = WindowRequest::new(8);
    let extraction =
        extract_by_window(path, &request, DEFAULT_TIMEOUT).expect("Failed to extract window");
    assert_eq!(extraction.frames_decoded, 8);
    assert_eq!(extraction.width, 640);
    assert_eq!(extraction.height, 480);
    assert!(extraction.size_was_dynamic);
    assert_eq!(extraction.seek_distance, 0.0);
    assert_eq!(extraction.buffer.data().len(), 8 * 640 * 480 * 3);
    // testsrc frames are not black; the first frame must carry pixels.
    let first = extraction.buffer.frame(0).expect("Slot should exist");
    assert!(first.iter().any(|&byte| byte != 0));
}

#[test]
fn explicit_dimensions_must_match_the_stream() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let request = WindowRequest::new(1).with_dimensions(1280, 720);
    let result = extract_by_window(path, &request, DEFAULT_TIMEOUT);
    assert!(matches!(result, Err(LoadError::DimensionMismatch { .. })));
}

#[test]
fn oversized_window_fills_best_effort() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    // The fixture holds 100 frames; ask for more and expect zero padding,
    // not an error.
    let request = WindowRequest::new(150);
    let extraction =
        extract_by_window(path, &request, DEFAULT_TIMEOUT).expect("Failed to extract window");
    assert!(extraction.frames_decoded <= 100);
    assert!(extraction.frames_decoded > 0);
    assert_eq!(extraction.buffer.frames(), 150);
    let last = extraction.buffer.frame(149).expect("Slot should exist");
    assert!(last.iter().all(|&byte| byte == 0), "tail slots stay zeroed");
}

#[test]
fn fixed_seek_distance_is_reproducible() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let request = WindowRequest::new(4).with_seek_distance(0.5);
    let first =
        extract_by_window(path, &request, DEFAULT_TIMEOUT).expect("Failed to extract window");
    let second =
        extract_by_window(path, &request, DEFAULT_TIMEOUT).expect("Failed to extract window");
    assert_eq!(first.seek_distance, 0.5);
    assert_eq!(first.buffer.data(), second.buffer.data());
}

#[test]
fn random_seek_reports_a_replayable_distance() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let request = WindowRequest::new(4).with_random_seek();
    let sampled =
        extract_by_window(path, &request, DEFAULT_TIMEOUT).expect("Failed to extract window");
    assert!((0.0..=1.0).contains(&sampled.seek_distance));

    let replay = WindowRequest::new(4).with_seek_distance(sampled.seek_distance);
    let replayed =
        extract_by_window(path, &replay, DEFAULT_TIMEOUT).expect("Failed to extract window");
    assert_eq!(sampled.buffer.data(), replayed.buffer.data());
}

#[test]
fn missing_video_stream_fails_open_with_dimensions() {
    let path = sample_audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    let request = WindowRequest::new(4).with_dimensions(320, 240);
    let extraction = extract_by_window(path, &request, DEFAULT_TIMEOUT)
        .expect("Fail-open path should not error");
    assert!(extraction.missing_stream);
    assert_eq!(extraction.frames_decoded, 0);
    assert_eq!(extraction.buffer.data().len(), 4 * 320 * 240 * 3);
    assert!(extraction.buffer.data().iter().all(|&byte| byte == 0));

    let result = extraction.require_video();
    assert!(matches!(result, Err(LoadError::MissingVideoStream)));
}

#[test]
fn missing_video_stream_is_an_error_without_dimensions() {
    let path = sample_audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    // Dynamic sizing leaves nothing to size a fail-open buffer from.
    let request = WindowRequest::new(4);
    let result = extract_by_window(path, &request, DEFAULT_TIMEOUT);
    assert!(matches!(result, Err(LoadError::MissingVideoStream)));
}

#[test]
fn session_window_consumes_the_session() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session =
        open_session(path, Duration::from_secs(10)).expect("Failed to open session");
    let extraction = session
        .extract_window(&WindowRequest::new(2))
        .expect("Failed to extract window");
    assert_eq!(extraction.frames_decoded, 2);
}
