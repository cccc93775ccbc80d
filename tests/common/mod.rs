//! Shared helpers: a scriptable in-memory media element.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use framegrab::{EventTarget, FrameGrabError, MediaElement, MediaEvent};
use image::{Rgba, RgbaImage};

/// When a [`SyntheticVideo`] announces that a seek finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Inside `set_current_time`.
    Immediate,
    /// From a spawned task, after yielding to the scheduler.
    Deferred,
    /// Never.
    Never,
}

type FrameFn = Arc<dyn Fn(f64) -> RgbaImage + Send + Sync>;

/// An in-memory video whose frames are produced by a function of time.
///
/// Clones share the frame function and the seek log with the element they
/// were cloned from.
pub struct SyntheticVideo {
    pub duration: f64,
    pub has_video: bool,
    pub width: u32,
    pub height: u32,
    pub seek_dispatch: Dispatch,
    pub load_fails: bool,
    frame_at: FrameFn,
    seeks: Arc<Mutex<Vec<f64>>>,
    clones: Arc<Mutex<usize>>,
    current_time: f64,
    events: EventTarget<MediaEvent>,
}

impl SyntheticVideo {
    pub fn new<F>(duration: f64, frame_at: F) -> Self
    where
        F: Fn(f64) -> RgbaImage + Send + Sync + 'static,
    {
        let probe = frame_at(0.0);
        Self {
            duration,
            has_video: true,
            width: probe.width(),
            height: probe.height(),
            seek_dispatch: Dispatch::Immediate,
            load_fails: false,
            frame_at: Arc::new(frame_at),
            seeks: Arc::new(Mutex::new(Vec::new())),
            clones: Arc::new(Mutex::new(0)),
            current_time: 0.0,
            events: EventTarget::new(),
        }
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.seek_dispatch = dispatch;
        self
    }

    /// Every seek performed by this element or any of its clones, in order.
    pub fn seeks(&self) -> Vec<f64> {
        self.seeks.lock().unwrap().clone()
    }

    pub fn clone_count(&self) -> usize {
        *self.clones.lock().unwrap()
    }

    fn announce(&self, event: MediaEvent, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Immediate => {
                self.events.dispatch(event);
            }
            Dispatch::Deferred => {
                let events = self.events.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    events.dispatch(event);
                });
            }
            Dispatch::Never => {}
        }
    }
}

impl MediaElement for SyntheticVideo {
    fn has_video(&self) -> bool {
        self.has_video
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn video_width(&self) -> u32 {
        self.width
    }

    fn video_height(&self) -> u32 {
        self.height
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.seeks.lock().unwrap().push(seconds);
        self.current_time = seconds;
        self.announce(MediaEvent::Seeked, self.seek_dispatch);
    }

    fn current_frame(&self) -> Option<RgbaImage> {
        Some((self.frame_at)(self.current_time))
    }

    fn load(&mut self) {
        let dispatch = match self.seek_dispatch {
            Dispatch::Deferred => Dispatch::Deferred,
            _ => Dispatch::Immediate,
        };
        let event = if self.load_fails {
            MediaEvent::Error
        } else {
            MediaEvent::CanPlayThrough
        };
        self.announce(event, dispatch);
    }

    fn clone_element(&self) -> Result<Self, FrameGrabError> {
        *self.clones.lock().unwrap() += 1;
        Ok(Self {
            duration: self.duration,
            has_video: self.has_video,
            width: self.width,
            height: self.height,
            seek_dispatch: self.seek_dispatch,
            load_fails: self.load_fails,
            frame_at: Arc::clone(&self.frame_at),
            seeks: Arc::clone(&self.seeks),
            clones: Arc::clone(&self.clones),
            current_time: 0.0,
            events: EventTarget::new(),
        })
    }

    fn events(&self) -> &EventTarget<MediaEvent> {
        &self.events
    }

    fn load_error(&self) -> Option<String> {
        self.load_fails.then(|| "synthetic load failure".to_string())
    }
}

pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A frame whose colour encodes `seconds`, so tests can tell which time was
/// rendered.
pub fn timestamp_frame(seconds: f64) -> RgbaImage {
    let millis = (seconds * 1000.0).round() as u32;
    let red = 64 + (millis % 128) as u8;
    let green = 64 + ((millis / 128) % 128) as u8;
    RgbaImage::from_pixel(64, 36, Rgba([red, green, 200, 255]))
}

pub fn black_frame() -> RgbaImage {
    RgbaImage::from_pixel(64, 36, BLACK)
}

/// Black before `cutoff`, a timestamp-coloured frame from `cutoff` on.
pub fn black_until(cutoff: f64) -> impl Fn(f64) -> RgbaImage + Send + Sync + 'static {
    move |seconds| {
        if seconds < cutoff {
            black_frame()
        } else {
            timestamp_frame(seconds)
        }
    }
}

pub fn checkerboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            BLACK
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

pub fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}
