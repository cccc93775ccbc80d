//! FFmpeg video element integration tests.
//!
//! Tests that need media return early when `tests/fixtures/sample_video.mp4`
//! is missing. Run `tests/fixtures/generate_fixtures.sh` to create it.

mod common;

use std::path::Path;

use common::sample_video_path;
use framegrab::{
    Canvas, FrameGrab, FrameGrabError, GrabOptions, ImageElement, MediaElement, MediaSource,
    SkipSolidsOptions, VideoElement,
};

// ── Opening ────────────────────────────────────────────────────────

#[test]
fn open_nonexistent_file() {
    let error = VideoElement::open("this_file_does_not_exist.mp4").unwrap_err();
    assert!(
        matches!(error, FrameGrabError::FileOpen { .. }),
        "unexpected error: {error}"
    );
    assert!(error.to_string().contains("this_file_does_not_exist.mp4"));
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    assert!(VideoElement::open(&invalid_file_path).is_err());
}

#[test]
fn empty_source_list_is_rejected() {
    let error = VideoElement::with_sources(Vec::new()).unwrap_err();
    assert!(matches!(error, FrameGrabError::Configuration(_)));
}

#[test]
fn metadata_is_probed_on_open() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::open(path).expect("open");
    let metadata = video.metadata().expect("metadata");
    assert_eq!((metadata.width, metadata.height), (640, 480));
    assert!((metadata.frames_per_second - 30.0).abs() < 0.01);
    assert!((metadata.duration - 5.0).abs() < 0.1);
    assert!(metadata.frame_count() >= 140);
    assert!(video.has_video());
    assert_eq!(video.video_width(), 640);
}

#[test]
fn first_usable_source_wins() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::with_sources(vec![
        MediaSource::parse("missing.webm"),
        MediaSource::parse(path),
    ])
    .expect("open");
    assert_eq!(video.source(), Some(MediaSource::parse(path)));
}

#[test]
fn clones_start_unloaded() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::open(path).expect("open");
    let clone = video.clone_element().expect("clone");
    assert!(!clone.has_video());
    assert!(clone.duration().is_nan());
    assert_eq!(clone.sources(), video.sources());
}

// ── Grabbing ───────────────────────────────────────────────────────

#[tokio::test]
async fn grab_frame_into_canvas() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::open(path).expect("open");
    let session = FrameGrab::new(&video, GrabOptions::new(30.0)).expect("session");

    let mut canvas = Canvas::default();
    session
        .grab(&mut canvas, 1.0, Some(320))
        .expect("valid grab")
        .await
        .expect("grab");
    assert_eq!((canvas.width(), canvas.height()), (320, 240));

    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let output = temporary_directory.path().join("frame.png");
    canvas.save(&output).expect("save");
    assert!(output.exists());
}

#[tokio::test]
async fn grab_frame_into_image() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::open(path).expect("open");
    let session = FrameGrab::new(
        &video,
        GrabOptions::new(30.0).with_skip_solids(SkipSolidsOptions::enabled()),
    )
    .expect("session");

    let mut image = ImageElement::new();
    session
        .grab(&mut image, "00:00:02:15", None)
        .expect("valid grab")
        .await
        .expect("grab");
    assert_eq!((image.width(), image.height()), (640, 480));
}

#[tokio::test]
async fn repeated_grabs_decode_the_same_frame() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::open(path).expect("open");
    let session = FrameGrab::new(&video, GrabOptions::new(30.0)).expect("session");

    let mut first = Canvas::default();
    let mut second = Canvas::default();
    session.grab(&mut first, 3.0, None).unwrap().await.unwrap();
    session.grab(&mut second, 3.0, None).unwrap().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn grab_past_end_is_rejected() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoElement::open(path).expect("open");
    let session = FrameGrab::new(&video, GrabOptions::new(30.0)).expect("session");

    let mut canvas = Canvas::default();
    let error = session
        .grab(&mut canvas, 3600.0, None)
        .unwrap()
        .await
        .unwrap_err();
    assert!(matches!(error, FrameGrabError::SeekRange { .. }));
}
