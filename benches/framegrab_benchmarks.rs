//! Benchmarks for classification, rendering, and end-to-end grabs.
//!
//! Run with: cargo bench
//!
//! The end-to-end group requires `tests/fixtures/generate_fixtures.sh`.

use std::{hint::black_box, path::Path};

use criterion::Criterion;
use framegrab::{
    Canvas, FfmpegLogLevel, FrameGrab, GrabOptions, GrabTime, SkipSolidsOptions,
    SolidColorClassifier, SolidFrameClassifier, VideoElement, normalize_time, render_frame,
};
use image::{Rgba, RgbaImage};
use tokio::runtime::Builder;

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn full_hd_frame() -> RgbaImage {
    RgbaImage::from_fn(1920, 1080, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

fn benchmark_classifier(criterion: &mut Criterion) {
    let frame = full_hd_frame();
    let sampled = SolidColorClassifier::default();
    let exhaustive = SolidColorClassifier::default().with_sample_size(0);

    criterion.bench_function("classify 1080p frame (10px sample)", |bencher| {
        bencher.iter(|| sampled.is_solid(black_box(&frame), 0.95));
    });

    criterion.bench_function("classify 1080p frame (every pixel)", |bencher| {
        bencher.iter(|| exhaustive.is_solid(black_box(&frame), 0.95));
    });
}

fn benchmark_rendering(criterion: &mut Criterion) {
    let frame = full_hd_frame();
    let mut canvas = Canvas::default();

    criterion.bench_function("render 1080p frame at native size", |bencher| {
        bencher.iter(|| render_frame(black_box(&frame), &mut canvas, None));
    });

    criterion.bench_function("render 1080p frame scaled to 320", |bencher| {
        bencher.iter(|| render_frame(black_box(&frame), &mut canvas, Some(320)));
    });

    render_frame(&frame, &mut canvas, Some(320));
    criterion.bench_function("encode 320px canvas as data URL", |bencher| {
        bencher.iter(|| canvas.to_data_url().unwrap());
    });
}

fn benchmark_timecodes(criterion: &mut Criterion) {
    let timecode = GrabTime::from("01:23:45:12");
    criterion.bench_function("normalize timecode", |bencher| {
        bencher.iter(|| normalize_time(black_box(&timecode), 23.976).unwrap());
    });
}

fn benchmark_grab(criterion: &mut Criterion) {
    framegrab::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let runtime = Builder::new_current_thread().enable_all().build().unwrap();
    let video = VideoElement::open(SAMPLE_VIDEO).unwrap();
    let session = FrameGrab::new(&video, GrabOptions::new(30.0)).unwrap();
    let skipping = FrameGrab::new(
        &video,
        GrabOptions::new(30.0).with_skip_solids(SkipSolidsOptions::enabled()),
    )
    .unwrap();

    criterion.bench_function("grab frame (mid-video seek)", |bencher| {
        bencher.iter(|| {
            let mut canvas = Canvas::default();
            runtime
                .block_on(session.grab(&mut canvas, 2.5, Some(320)).unwrap())
                .unwrap();
        });
    });

    criterion.bench_function("grab frame (skipping black intro)", |bencher| {
        bencher.iter(|| {
            let mut canvas = Canvas::default();
            runtime
                .block_on(skipping.grab(&mut canvas, 0.0, Some(320)).unwrap())
                .unwrap();
        });
    });
}

criterion::criterion_group!(
    benches,
    benchmark_classifier,
    benchmark_rendering,
    benchmark_timecodes,
    benchmark_grab,
);

criterion::criterion_main!(benches);
