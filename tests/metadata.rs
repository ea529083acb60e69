//! Stream metadata resolution integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`
//! and skip themselves when the fixtures are missing.

use std::{path::Path, time::Duration};

use frameload::{DEFAULT_TIMEOUT, LoadError, frame_count, open_session};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn sample_webm_path() -> &'static str {
    "tests/fixtures/sample_video.webm"
}

fn sample_audio_only_path() -> &'static str {
    "tests/fixtures/sample_audio_only.m4a"
}

#[test]
fn resolves_reported_metadata() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = open_session(path, DEFAULT_TIMEOUT).expect("Failed to open session");
    let info = session.info();
    assert_eq!(info.width, 640);
    assert_eq!(info.height, 480);
    assert_eq!(info.frame_count, 100);
    assert!(info.duration > 0);
    assert!(!info.codec.is_empty());
}

#[test]
fn estimates_frame_count_when_unreported() {
    let path = sample_webm_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = open_session(path, DEFAULT_TIMEOUT).expect("Failed to open session");
    let info = session.info();
    // 4 seconds at 25 fps; the estimate rounds down through the container
    // duration, so allow one frame of slack on either side.
    assert!(
        (99..=101).contains(&info.frame_count),
        "estimated frame count should be close to 100, got {}",
        info.frame_count,
    );
    assert!(info.duration > 0);
}

#[test]
fn frame_count_helper_matches_session_info() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let count = frame_count(path, DEFAULT_TIMEOUT).expect("Failed to count frames");
    let session = open_session(path, DEFAULT_TIMEOUT).expect("Failed to open session");
    assert_eq!(count, session.frame_count());
}

#[test]
fn average_frame_duration_is_consistent() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = open_session(path, DEFAULT_TIMEOUT).expect("Failed to open session");
    let info = session.info();
    let average = info.average_frame_duration();
    assert!(average > 0.0);
    let reconstructed = average * info.frame_count as f64;
    assert!(
        (reconstructed - info.duration as f64).abs() < 1.0,
        "average * count should reproduce the duration",
    );
}

#[test]
fn audio_only_container_has_no_video_stream() {
    let path = sample_audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    let result = open_session(path, Duration::from_secs(3));
    assert!(matches!(result, Err(LoadError::MissingVideoStream)));
}
