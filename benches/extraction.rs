//! Benchmarks for the window and indexed extraction paths.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{path::Path, time::Duration};

use criterion::Criterion;
use frameload::{
    BackendLogLevel, DEFAULT_TIMEOUT, IndicesRequest, WindowRequest, extract_by_indices,
    extract_by_window, frame_count, set_backend_log_level,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";
const SAMPLE_WEBM: &str = "tests/fixtures/sample_video.webm";

fn benchmark_session_open(criterion: &mut Criterion) {
    set_backend_log_level(BackendLogLevel::Quiet);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    criterion.bench_function("open session + resolve metadata", |bencher| {
        bencher.iter(|| {
            let _count = frame_count(SAMPLE_VIDEO, DEFAULT_TIMEOUT).unwrap();
        });
    });
}

fn benchmark_window_extraction(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    criterion.bench_function("window 32 frames from start", |bencher| {
        let request = WindowRequest::new(32);
        bencher.iter(|| {
            let _extraction = extract_by_window(SAMPLE_VIDEO, &request, DEFAULT_TIMEOUT).unwrap();
        });
    });

    criterion.bench_function("window 32 frames mid-stream seek", |bencher| {
        let request = WindowRequest::new(32).with_seek_distance(0.5);
        bencher.iter(|| {
            let _extraction = extract_by_window(SAMPLE_VIDEO, &request, DEFAULT_TIMEOUT).unwrap();
        });
    });
}

fn benchmark_indexed_extraction(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return;
    }

    criterion.bench_function("indices sequential scan", |bencher| {
        let request = IndicesRequest::new(vec![0, 25, 50, 75]);
        bencher.iter(|| {
            let _extraction = extract_by_indices(SAMPLE_VIDEO, &request, DEFAULT_TIMEOUT).unwrap();
        });
    });

    criterion.bench_function("indices per-index seeks", |bencher| {
        let request = IndicesRequest::new(vec![0, 25, 50, 75]).with_seek();
        bencher.iter(|| {
            let _extraction = extract_by_indices(SAMPLE_VIDEO, &request, DEFAULT_TIMEOUT).unwrap();
        });
    });

    criterion.bench_function("indices with resize to 224", |bencher| {
        let request = IndicesRequest::new(vec![0, 25, 50, 75]).with_resize(224);
        bencher.iter(|| {
            let _extraction = extract_by_indices(SAMPLE_VIDEO, &request, DEFAULT_TIMEOUT).unwrap();
        });
    });
}

fn benchmark_estimated_metadata(criterion: &mut Criterion) {
    if !Path::new(SAMPLE_WEBM).exists() {
        return;
    }

    let mut group = criterion.benchmark_group("webm estimation");
    group.sample_size(30);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("window 16 frames", |bencher| {
        let request = WindowRequest::new(16);
        bencher.iter(|| {
            let _extraction = extract_by_window(SAMPLE_WEBM, &request, DEFAULT_TIMEOUT).unwrap();
        });
    });

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_session_open,
    benchmark_window_extraction,
    benchmark_indexed_extraction,
    benchmark_estimated_metadata,
);
criterion::criterion_main!(benches);
