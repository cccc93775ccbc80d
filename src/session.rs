//! Grab sessions.
//!
//! [`FrameGrab`] is the main entry point. It clones the caller's media
//! element once, so seeking never disturbs the caller's own playback, and
//! drives one acquisition run per [`grab`](FrameGrab::grab) call.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::acquisition::{AcquisitionSpec, acquire};
use crate::classifier::SolidFrameClassifier;
use crate::configuration::{GrabOptions, SkipSolidsOptions};
use crate::error::FrameGrabError;
use crate::events::EventListener;
use crate::image_element::{ImageElement, ImageEvent};
use crate::media::{MediaElement, MediaEvent};
use crate::surface::Canvas;
use crate::timecode::{GrabTime, normalize_time};

/// The concrete output a [`GrabTarget`] exposes.
pub enum Output<'a> {
    /// Encode the frame and assign it as the image's source.
    Image(&'a mut ImageElement),
    /// Copy the frame's pixels onto the canvas.
    Canvas(&'a mut Canvas),
}

/// Something a frame can be grabbed into.
///
/// [`ImageElement`] and [`Canvas`] are the supported targets. Other
/// implementors return `None` from [`output`](GrabTarget::output) and are
/// rejected by [`FrameGrab::grab`] with [`FrameGrabError::InvalidTarget`].
pub trait GrabTarget {
    /// Element name used in error messages (`"img"`, `"canvas"`, ...).
    fn tag_name(&self) -> &str;

    /// Borrow the target as one of the supported outputs.
    fn output(&mut self) -> Option<Output<'_>> {
        None
    }
}

struct Readiness {
    can_play: EventListener<MediaEvent>,
    failed: EventListener<MediaEvent>,
}

struct ClonedVideo<V> {
    video: V,
    /// Pending until the clone first reports it can play through.
    readiness: Option<Readiness>,
    load_error: Option<String>,
}

/// A frame-grabbing session around one video.
///
/// Concurrent [`grab`](FrameGrab::grab) calls on the same session queue up
/// and run one at a time, in call order, against the session's private clone.
///
/// # Example
///
/// ```no_run
/// use framegrab::{FrameGrab, GrabOptions, ImageElement, SkipSolidsOptions, VideoElement};
///
/// # async fn example() -> Result<(), framegrab::FrameGrabError> {
/// let video = VideoElement::open("input.mp4")?;
/// let session = FrameGrab::new(
///     &video,
///     GrabOptions::new(24.0).with_skip_solids(SkipSolidsOptions::enabled()),
/// )?;
///
/// let mut thumbnail = ImageElement::new();
/// session.grab(&mut thumbnail, "00:00:02:00", Some(320))?.await?;
/// # Ok(())
/// # }
/// ```
pub struct FrameGrab<V> {
    clone: Mutex<ClonedVideo<V>>,
    frame_rate: f64,
    skip_solids: SkipSolidsOptions,
    classifier: Arc<dyn SolidFrameClassifier>,
}

impl<V> Debug for FrameGrab<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FrameGrab")
            .field("frame_rate", &self.frame_rate)
            .field("skip_solids", &self.skip_solids)
            .finish_non_exhaustive()
    }
}

impl<V: MediaElement> FrameGrab<V> {
    /// Create a session for `video`.
    ///
    /// Clones the element and starts loading the clone; the first grab waits
    /// until the clone is ready.
    ///
    /// # Errors
    ///
    /// Returns [`FrameGrabError::Configuration`] if `video` has no video
    /// stream or the options are invalid, or any error from cloning the
    /// element.
    pub fn new(video: &V, options: GrabOptions) -> Result<Self, FrameGrabError> {
        if !video.has_video() {
            return Err(FrameGrabError::Configuration(
                "You must pass a valid video".to_string(),
            ));
        }
        options.validate()?;

        let mut clone = video.clone_element()?;
        let readiness = Readiness {
            can_play: clone.listen(MediaEvent::CanPlayThrough),
            failed: clone.listen(MediaEvent::Error),
        };
        clone.load();

        log::debug!(
            "Created grab session ({:.3} fps, skip_solids={:?})",
            options.frame_rate,
            options.skip_solids
        );

        Ok(Self {
            clone: Mutex::new(ClonedVideo {
                video: clone,
                readiness: Some(readiness),
                load_error: None,
            }),
            frame_rate: options.frame_rate,
            skip_solids: options.skip_solids,
            classifier: options.classifier,
        })
    }

    /// Frame rate used for timecodes and solid-frame skips.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Solid-frame skipping settings.
    pub fn skip_solids(&self) -> &SkipSolidsOptions {
        &self.skip_solids
    }

    /// Grab the frame at `time` into `target`.
    ///
    /// `time` is seconds or a `[[[HH:]MM:]SS:]FF` timecode. With `max_size`
    /// the frame is scaled down so it fits within that many pixels.
    ///
    /// The target and time are validated immediately; everything else
    /// happens when the returned future is awaited, which resolves to the
    /// populated target.
    ///
    /// # Errors
    ///
    /// Immediately: [`FrameGrabError::InvalidTarget`] or
    /// [`FrameGrabError::InvalidTime`]. From the future:
    /// [`FrameGrabError::SeekRange`] when the (possibly advanced) time passes
    /// the end of the video, [`FrameGrabError::ImageLoad`] when an image
    /// target rejects the frame, and any media loading or decoding error.
    pub fn grab<'a, T>(
        &'a self,
        target: &'a mut T,
        time: impl Into<GrabTime>,
        max_size: Option<u32>,
    ) -> Result<impl Future<Output = Result<&'a mut T, FrameGrabError>> + 'a, FrameGrabError>
    where
        T: GrabTarget + ?Sized,
    {
        if target.output().is_none() {
            return Err(FrameGrabError::InvalidTarget(target.tag_name().to_string()));
        }
        let seconds = normalize_time(&time.into(), self.frame_rate)?;
        Ok(self.grab_seconds(target, seconds, max_size))
    }

    fn grab_seconds<'a, T>(
        &'a self,
        target: &'a mut T,
        seconds: f64,
        max_size: Option<u32>,
    ) -> impl Future<Output = Result<&'a mut T, FrameGrabError>> + 'a
    where
        T: GrabTarget + ?Sized,
    {
        async move {
            let canvas = self.acquire_frame(seconds, max_size).await?;
            deliver(&canvas, target).await?;
            Ok(target)
        }
    }

    async fn acquire_frame(
        &self,
        seconds: f64,
        max_size: Option<u32>,
    ) -> Result<Canvas, FrameGrabError> {
        let mut clone = self.clone.lock().await;
        clone.wait_until_ready().await?;

        log::debug!("Grabbing frame at {seconds:.3}s (max_size={max_size:?})");
        acquire(
            &mut clone.video,
            AcquisitionSpec {
                canvas: Canvas::default(),
                time: seconds,
                frame_rate: self.frame_rate,
                max_size,
                skip_solids: self.skip_solids,
                classifier: self.classifier.as_ref(),
            },
        )
        .await
    }
}

impl<V: MediaElement> ClonedVideo<V> {
    async fn wait_until_ready(&mut self) -> Result<(), FrameGrabError> {
        if let Some(readiness) = &mut self.readiness {
            let loaded = tokio::select! {
                _ = &mut readiness.can_play => true,
                _ = &mut readiness.failed => false,
            };
            if !loaded {
                self.load_error = Some(
                    self.video
                        .load_error()
                        .unwrap_or_else(|| "media failed to load".to_string()),
                );
            }
            self.readiness = None;
        }

        match &self.load_error {
            Some(reason) => Err(FrameGrabError::FileOpen {
                source_name: "cloned video".to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Copy the acquired frame into the caller's target.
///
/// The frame is drawn on a private canvas first and only copied once the
/// acquisition loop is finished, so a canvas target never shows the solid
/// frames that were skipped.
async fn deliver<T: GrabTarget + ?Sized>(
    canvas: &Canvas,
    target: &mut T,
) -> Result<(), FrameGrabError> {
    match target.output() {
        Some(Output::Canvas(destination)) => {
            destination.copy_from_canvas(canvas);
            Ok(())
        }
        Some(Output::Image(image)) => {
            let data_url = canvas.to_data_url()?;
            let loaded = image.listen(ImageEvent::Load);
            let failed = image.listen(ImageEvent::Error);
            image.set_src(data_url);

            tokio::select! {
                _ = loaded => Ok(()),
                _ = failed => Err(FrameGrabError::ImageLoad(
                    image.load_error().unwrap_or("unknown error").to_string(),
                )),
            }
        }
        None => Err(FrameGrabError::InvalidTarget(target.tag_name().to_string())),
    }
}
