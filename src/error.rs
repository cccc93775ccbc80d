//! Error types for the `framegrab` crate.
//!
//! This module defines [`FrameGrabError`], the unified error type returned by
//! every fallible operation in the crate. Validation failures (bad options,
//! bad target, bad time) are returned synchronously; failures that happen
//! while a frame is being acquired (seeking past the end, image load failure)
//! are returned from the grab future.

use std::io::Error as IoError;

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameGrabError {
    /// The session was constructed with invalid arguments (missing video,
    /// non-positive frame rate, out-of-range skip options).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The grab target is neither an image element nor a canvas.
    #[error("Target container must be an image or a canvas, got <{0}>")]
    InvalidTarget(String),

    /// The requested time is not a number or a valid timecode, or no usable
    /// frame rate accompanied a timecode string.
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// The seek target lies beyond the end of the video.
    #[error("Target time {requested:.3}s exceeds the video length ({duration:.3}s)")]
    SeekRange {
        /// Requested position in seconds.
        requested: f64,
        /// Total duration of the video in seconds.
        duration: f64,
    },

    /// The image element reported that it could not load the encoded frame.
    #[error("Frame failed to load in image element: {0}")]
    ImageLoad(String),

    /// The solid-frame skip loop hit its configured retry cap.
    #[error("Gave up after skipping {retries} solid frames (last tried {time:.3}s)")]
    SolidFrameLimit {
        /// Number of retries performed.
        retries: u32,
        /// Last time offset that was tried, in seconds.
        time: f64,
    },

    /// The media element has no decoded frame to draw.
    #[error("No frame is available at the current position")]
    NoFrame,

    /// None of the media sources could be opened.
    #[error("Failed to open media source {source_name}: {reason}")]
    FileOpen {
        /// The path or URL that was tried last.
        source_name: String,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The source does not contain a video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while encoding or decoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FrameGrabError {
    fn from(error: FfmpegError) -> Self {
        FrameGrabError::FfmpegError(error.to_string())
    }
}
