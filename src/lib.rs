//! # framegrab
//!
//! Grab still frames from videos at a given time or timecode, optionally
//! scaled down and optionally skipping past solid (black) frames such as
//! fade-ins and slates.
//!
//! A [`FrameGrab`] session clones the video once and serializes its grabs on
//! that private clone, so the caller's element is never repositioned. Frames
//! are delivered into an [`ImageElement`] (as a PNG data URL) or a
//! [`Canvas`] (as raw RGBA pixels).
//!
//! ## Quick Start
//!
//! ```no_run
//! use framegrab::{Canvas, FrameGrab, GrabOptions, SkipSolidsOptions, VideoElement};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), framegrab::FrameGrabError> {
//! let video = VideoElement::open("input.mp4")?;
//! let session = FrameGrab::new(
//!     &video,
//!     GrabOptions::new(24.0).with_skip_solids(SkipSolidsOptions::enabled()),
//! )?;
//!
//! // Two seconds in, scaled to 320 pixels wide.
//! let mut canvas = Canvas::default();
//! session.grab(&mut canvas, 2.0, Some(320))?.await?;
//! canvas.save("thumbnail.png")?;
//!
//! // Timecodes are [[[HH:]MM:]SS:]FF, with frames counted at the session rate.
//! session.grab(&mut canvas, "00:01:30:12", None)?.await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom media
//!
//! The session is generic over [`MediaElement`]. [`VideoElement`] decodes
//! with FFmpeg; any other player that can seek, report its current frame, and
//! dispatch [`MediaEvent`]s through an [`EventTarget`] works as well.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build the crate.

pub mod classifier;
pub mod configuration;
mod conversion;
pub mod error;
pub mod events;
pub mod ffmpeg;
pub mod image_element;
pub mod media;
pub mod metadata;
pub mod seek;
pub mod session;
pub mod surface;
pub mod timecode;
pub mod video;

mod acquisition;

pub use classifier::{SolidColor, SolidColorClassifier, SolidFrameClassifier};
pub use configuration::{GrabOptions, SkipSolidsOptions};
pub use error::FrameGrabError;
pub use events::{EventListener, EventTarget};
pub use ffmpeg::{FfmpegLogLevel, ffmpeg_log_level, set_ffmpeg_log_level};
pub use image_element::{ImageElement, ImageEvent};
pub use media::{MediaElement, MediaEvent, MediaSource, uncacheable_url};
pub use metadata::VideoMetadata;
pub use seek::seek;
pub use session::{FrameGrab, GrabTarget, Output};
pub use surface::{Canvas, render_frame, scaled_dimensions};
pub use timecode::{GrabTime, normalize_time};
pub use video::VideoElement;
