//! The media element interface.
//!
//! [`FrameGrab`](crate::FrameGrab) never decodes video itself. It drives a
//! [`MediaElement`]: something that can be cloned, loaded, positioned, and
//! asked for the frame at its current position, announcing progress through
//! [`MediaEvent`]s. [`VideoElement`](crate::VideoElement) is the FFmpeg-backed
//! implementation shipped with the crate.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbaImage;

use crate::error::FrameGrabError;
use crate::events::{EventListener, EventTarget};

/// Events a media element dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    /// Enough media is available to play through without stalling.
    CanPlayThrough,
    /// A position change requested through
    /// [`set_current_time`](MediaElement::set_current_time) has completed.
    Seeked,
    /// Loading the media failed.
    Error,
}

/// A video playback element.
pub trait MediaElement: Send + Sized + 'static {
    /// Whether the element carries a video stream.
    fn has_video(&self) -> bool;

    /// Total duration in seconds. `NaN` while unknown.
    fn duration(&self) -> f64;

    /// Native frame width in pixels.
    fn video_width(&self) -> u32;

    /// Native frame height in pixels.
    fn video_height(&self) -> u32;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Request a move to `seconds`. Completion is announced with
    /// [`MediaEvent::Seeked`].
    fn set_current_time(&mut self, seconds: f64);

    /// The decoded frame at the current position, if one is available.
    fn current_frame(&self) -> Option<RgbaImage>;

    /// Start (re)loading the media. Readiness is announced with
    /// [`MediaEvent::CanPlayThrough`], failure with [`MediaEvent::Error`].
    fn load(&mut self);

    /// Create an independent, not yet loaded, element over the same media.
    ///
    /// Positioning the clone must not affect `self`.
    fn clone_element(&self) -> Result<Self, FrameGrabError>;

    /// The element's event target.
    fn events(&self) -> &EventTarget<MediaEvent>;

    /// Reason the last load failed, if it did.
    fn load_error(&self) -> Option<String> {
        None
    }

    /// Register a one-shot listener for `event`.
    fn listen(&self, event: MediaEvent) -> EventListener<MediaEvent> {
        self.events().listen(event)
    }
}

/// Where a media element reads its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A local file.
    Path(PathBuf),
    /// A network URL (anything FFmpeg's protocols accept).
    Url(String),
}

impl MediaSource {
    /// Interpret `input` as a URL when it contains a scheme separator and as
    /// a path otherwise.
    pub fn parse(input: &str) -> Self {
        if input.contains("://") {
            MediaSource::Url(input.to_string())
        } else {
            MediaSource::Path(PathBuf::from(input))
        }
    }

    /// Copy of this source that bypasses HTTP caches.
    ///
    /// URLs gain an `fgtimestamp` query parameter; paths are returned
    /// unchanged.
    pub fn uncacheable(&self) -> Self {
        match self {
            MediaSource::Url(url) => MediaSource::Url(uncacheable_url(url)),
            MediaSource::Path(path) => MediaSource::Path(path.clone()),
        }
    }

    /// The string handed to FFmpeg.
    pub fn location(&self) -> String {
        match self {
            MediaSource::Path(path) => path.display().to_string(),
            MediaSource::Url(url) => url.clone(),
        }
    }
}

impl Display for MediaSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.location())
    }
}

/// Append a cache-busting `fgtimestamp` query parameter to `url`.
///
/// ```
/// let url = framegrab::uncacheable_url("https://cdn.example/clip.mp4?sig=1");
/// assert!(url.starts_with("https://cdn.example/clip.mp4?sig=1&fgtimestamp="));
/// ```
pub fn uncacheable_url(url: &str) -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    with_cache_buster(url, stamp)
}

fn with_cache_buster(url: &str, stamp: u128) -> String {
    let separator = match url.find('?') {
        Some(index) if index > 0 => '&',
        _ => '?',
    };
    format!("{url}{separator}fgtimestamp={stamp}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_buster_starts_query() {
        assert_eq!(
            with_cache_buster("http://host/video.mp4", 42),
            "http://host/video.mp4?fgtimestamp=42"
        );
    }

    #[test]
    fn cache_buster_extends_query() {
        assert_eq!(
            with_cache_buster("http://host/video.mp4?a=b", 7),
            "http://host/video.mp4?a=b&fgtimestamp=7"
        );
    }

    #[test]
    fn paths_are_not_rewritten() {
        let source = MediaSource::parse("clips/intro.mp4");
        assert_eq!(source.uncacheable(), source);
    }

    #[test]
    fn urls_are_detected() {
        assert!(matches!(
            MediaSource::parse("rtsp://camera/stream"),
            MediaSource::Url(_)
        ));
        assert!(matches!(MediaSource::parse("/tmp/a.mkv"), MediaSource::Path(_)));
    }
}
