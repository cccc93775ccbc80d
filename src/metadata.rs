//! Video stream metadata.

/// Metadata probed from a video source when it is opened or loaded.
///
/// # Example
///
/// ```no_run
/// use framegrab::VideoElement;
///
/// let video = VideoElement::open("input.mp4")?;
/// let metadata = video.metadata().expect("probed on open");
/// println!("{}x{} @ {:.2} fps", metadata.width, metadata.height, metadata.frames_per_second);
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate. Zero when the container does not report one.
    pub frames_per_second: f64,
    /// Duration in seconds. `NaN` when unknown.
    pub duration: f64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Estimated number of frames, or 0 when duration or frame rate is
    /// unknown.
    pub fn frame_count(&self) -> u64 {
        if self.duration.is_finite() && self.frames_per_second > 0.0 {
            (self.duration * self.frames_per_second) as u64
        } else {
            0
        }
    }
}
