//! Session configuration.
//!
//! [`GrabOptions`] is a builder that carries the frame rate, solid-frame
//! skipping settings, and the classifier used to decide what counts as a
//! solid frame.
//!
//! # Example
//!
//! ```
//! use framegrab::{GrabOptions, SkipSolidsOptions};
//!
//! let options = GrabOptions::new(24.0).with_skip_solids(
//!     SkipSolidsOptions::enabled()
//!         .with_frames(5)
//!         .with_max_ratio(0.95),
//! );
//! assert!(options.skip_solids.enabled);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::classifier::{SolidColorClassifier, SolidFrameClassifier};
use crate::error::FrameGrabError;

/// Default number of frames to jump when a solid frame is found.
pub const DEFAULT_SKIP_FRAMES: u32 = 5;

/// Default solid-pixel ratio above which a frame is skipped.
pub const DEFAULT_MAX_SOLID_RATIO: f64 = 0.95;

/// Settings for skipping past solid frames.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct SkipSolidsOptions {
    /// Whether solid frames are skipped at all. Defaults to `false`.
    pub enabled: bool,
    /// Frames to jump ahead each time a solid frame is found. Defaults to 5.
    pub frames: u32,
    /// A frame with a larger share of solid pixels than this is skipped.
    /// Defaults to 0.95.
    pub max_ratio: f64,
    /// Optional cap on the number of skips per grab. `None` keeps skipping
    /// until a non-solid frame is found or the seek runs past the end.
    pub max_retries: Option<u32>,
}

impl Default for SkipSolidsOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            frames: DEFAULT_SKIP_FRAMES,
            max_ratio: DEFAULT_MAX_SOLID_RATIO,
            max_retries: None,
        }
    }
}

impl SkipSolidsOptions {
    /// Default settings with skipping turned on.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Set the number of frames to jump per skip.
    ///
    /// Zero falls back to the default of 5.
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.frames = if frames == 0 {
            DEFAULT_SKIP_FRAMES
        } else {
            frames
        };
        self
    }

    /// Set the solid-pixel ratio threshold.
    ///
    /// Zero falls back to the default of 0.95.
    pub fn with_max_ratio(mut self, max_ratio: f64) -> Self {
        self.max_ratio = if max_ratio == 0.0 {
            DEFAULT_MAX_SOLID_RATIO
        } else {
            max_ratio
        };
        self
    }

    /// Cap the number of solid-frame skips for a single grab.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Seconds to advance per skip at the given frame rate.
    pub(crate) fn skip_seconds(&self, frame_rate: f64) -> f64 {
        self.frames as f64 / frame_rate
    }

    pub(crate) fn validate(&self) -> Result<(), FrameGrabError> {
        if !(0.0..=1.0).contains(&self.max_ratio) {
            return Err(FrameGrabError::Configuration(format!(
                "skip_solids.max_ratio must be within [0, 1], got {}",
                self.max_ratio
            )));
        }
        Ok(())
    }
}

/// Options for constructing a [`FrameGrab`](crate::FrameGrab) session.
#[derive(Clone)]
#[must_use]
pub struct GrabOptions {
    /// Frame rate of the source video. Required and must be positive.
    pub frame_rate: f64,
    /// Solid-frame skipping settings.
    pub skip_solids: SkipSolidsOptions,
    pub(crate) classifier: Arc<dyn SolidFrameClassifier>,
}

impl Debug for GrabOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GrabOptions")
            .field("frame_rate", &self.frame_rate)
            .field("skip_solids", &self.skip_solids)
            .finish_non_exhaustive()
    }
}

impl GrabOptions {
    /// Create options for a video with the given frame rate.
    ///
    /// Solid-frame skipping is off and the default near-black classifier is
    /// used.
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            skip_solids: SkipSolidsOptions::default(),
            classifier: Arc::new(SolidColorClassifier::default()),
        }
    }

    /// Set the solid-frame skipping settings.
    pub fn with_skip_solids(mut self, skip_solids: SkipSolidsOptions) -> Self {
        self.skip_solids = skip_solids;
        self
    }

    /// Replace the classifier that decides whether a frame is solid.
    pub fn with_classifier(mut self, classifier: Arc<dyn SolidFrameClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), FrameGrabError> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(FrameGrabError::Configuration(format!(
                "Invalid frame rate of {}",
                self.frame_rate
            )));
        }
        self.skip_solids.validate()
    }
}
