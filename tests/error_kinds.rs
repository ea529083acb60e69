//! Error taxonomy tests.
//!
//! These are pure and need no media fixtures.

use std::{path::PathBuf, time::Duration};

use frameload::{ErrorKind, LoadError};

#[test]
fn every_variant_maps_to_one_kind() {
    let open = LoadError::ContainerOpen {
        path: PathBuf::from("/missing.mp4"),
        reason: "No such file or directory".into(),
    };
    assert_eq!(open.kind(), ErrorKind::Io);
    assert_eq!(LoadError::DecoderOpen("h264".into()).kind(), ErrorKind::Io);
    assert_eq!(LoadError::UnknownPixelFormat.kind(), ErrorKind::Io);
    assert_eq!(LoadError::Backend("EINVAL".into()).kind(), ErrorKind::Io);

    assert_eq!(
        LoadError::StreamProbe("probe failed".into()).kind(),
        ErrorKind::Validation
    );
    assert_eq!(LoadError::MissingVideoStream.kind(), ErrorKind::Validation);
    assert_eq!(LoadError::UnknownFrameRate.kind(), ErrorKind::Validation);
    assert_eq!(
        LoadError::DimensionMismatch {
            requested_width: 1,
            requested_height: 1,
            native_width: 2,
            native_height: 2,
        }
        .kind(),
        ErrorKind::Validation
    );
    assert_eq!(
        LoadError::InvalidRequest("bad".into()).kind(),
        ErrorKind::Validation
    );

    assert_eq!(
        LoadError::Timeout {
            budget: Duration::from_secs(3)
        }
        .kind(),
        ErrorKind::Timeout
    );
    assert_eq!(
        LoadError::BufferAllocation { bytes: 1 << 40 }.kind(),
        ErrorKind::OutOfMemory
    );
}

#[test]
fn messages_carry_diagnostic_context() {
    let error = LoadError::ContainerOpen {
        path: PathBuf::from("/data/clip.mp4"),
        reason: "Invalid data found".into(),
    };
    let message = error.to_string();
    assert!(message.contains("/data/clip.mp4"), "{message}");
    assert!(message.contains("Invalid data found"), "{message}");

    let error = LoadError::DimensionMismatch {
        requested_width: 1280,
        requested_height: 720,
        native_width: 640,
        native_height: 480,
    };
    let message = error.to_string();
    assert!(message.contains("1280x720"), "{message}");
    assert!(message.contains("640x480"), "{message}");

    let error = LoadError::Timeout {
        budget: Duration::from_secs(3),
    };
    assert!(error.to_string().contains("time budget"), "{error}");
}

#[test]
fn backend_errors_convert_with_their_message() {
    let error: LoadError = ffmpeg_next::Error::StreamNotFound.into();
    assert_eq!(error.kind(), ErrorKind::Io);
    assert!(error.to_string().starts_with("FFmpeg error:"));
}
