//! FFmpeg-backed video element.
//!
//! [`VideoElement`] implements [`MediaElement`] on top of `ffmpeg-next`.
//! Loading probes the source for metadata and setting the current time
//! decodes the frame shown at that time. Both run on tokio's blocking pool
//! when a runtime is available, each job opening its own demuxer from the
//! source location, and report back through the element's events.

use std::cmp::Ordering;
use std::mem;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbaImage;

use crate::conversion::{
    container_duration_seconds, frame_to_buffer, pts_to_seconds, seconds_to_frame_number,
    seconds_to_seek_timestamp,
};
use crate::error::FrameGrabError;
use crate::events::EventTarget;
use crate::media::{MediaElement, MediaEvent, MediaSource};
use crate::metadata::VideoMetadata;

#[derive(Debug, Default)]
struct Playback {
    /// Set once a source has been opened successfully.
    loaded: Option<(MediaSource, VideoMetadata)>,
    frame: Option<RgbaImage>,
    current_time: f64,
    error: Option<String>,
    /// Bumped on every seek so late decodes of superseded seeks are dropped.
    generation: u64,
}

/// A video decoded with FFmpeg.
///
/// The element is created from one or more candidate sources; the first one
/// FFmpeg can open with a video stream is used.
///
/// # Example
///
/// ```no_run
/// use framegrab::{MediaElement, VideoElement};
///
/// let video = VideoElement::open("input.mp4")?;
/// println!("{}x{}, {:.2}s", video.video_width(), video.video_height(), video.duration());
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
#[derive(Debug)]
pub struct VideoElement {
    sources: Vec<MediaSource>,
    playback: Arc<Mutex<Playback>>,
    events: EventTarget<MediaEvent>,
}

impl VideoElement {
    /// Open a local video file.
    ///
    /// # Errors
    ///
    /// Returns [`FrameGrabError::FileOpen`] if the file cannot be opened and
    /// [`FrameGrabError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameGrabError> {
        Self::with_sources(vec![MediaSource::Path(path.as_ref().to_path_buf())])
    }

    /// Open a video from a URL.
    ///
    /// # Errors
    ///
    /// See [`open`](VideoElement::open).
    pub fn open_url(url: &str) -> Result<Self, FrameGrabError> {
        Self::with_sources(vec![MediaSource::Url(url.to_string())])
    }

    /// Open the first usable source out of `sources`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameGrabError::Configuration`] for an empty list, otherwise
    /// the error from the last source tried when none could be opened.
    pub fn with_sources(sources: Vec<MediaSource>) -> Result<Self, FrameGrabError> {
        let loaded = open_first(&sources)?;
        log::debug!(
            "Opened {} ({}x{}, {:.3} fps, {:.3}s, {})",
            loaded.0,
            loaded.1.width,
            loaded.1.height,
            loaded.1.frames_per_second,
            loaded.1.duration,
            loaded.1.codec
        );

        Ok(Self {
            sources,
            playback: Arc::new(Mutex::new(Playback {
                loaded: Some(loaded),
                ..Playback::default()
            })),
            events: EventTarget::new(),
        })
    }

    /// Metadata of the loaded source.
    pub fn metadata(&self) -> Option<VideoMetadata> {
        lock(&self.playback)
            .loaded
            .as_ref()
            .map(|(_, metadata)| metadata.clone())
    }

    /// The source in use, once loaded.
    pub fn source(&self) -> Option<MediaSource> {
        lock(&self.playback)
            .loaded
            .as_ref()
            .map(|(source, _)| source.clone())
    }

    /// Candidate sources in preference order.
    pub fn sources(&self) -> &[MediaSource] {
        &self.sources
    }
}

impl MediaElement for VideoElement {
    fn has_video(&self) -> bool {
        lock(&self.playback).loaded.is_some()
    }

    fn duration(&self) -> f64 {
        self.metadata()
            .map_or(f64::NAN, |metadata| metadata.duration)
    }

    fn video_width(&self) -> u32 {
        self.metadata().map_or(0, |metadata| metadata.width)
    }

    fn video_height(&self) -> u32 {
        self.metadata().map_or(0, |metadata| metadata.height)
    }

    fn current_time(&self) -> f64 {
        lock(&self.playback).current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        let (generation, source) = {
            let mut playback = lock(&self.playback);
            playback.current_time = seconds;
            playback.generation += 1;
            (
                playback.generation,
                playback.loaded.as_ref().map(|(source, _)| source.clone()),
            )
        };

        let Some(source) = source else {
            log::warn!("Seek to {seconds:.3}s requested before the video was loaded");
            lock(&self.playback).frame = None;
            self.events.dispatch(MediaEvent::Seeked);
            return;
        };

        let playback = Arc::clone(&self.playback);
        let events = self.events.clone();
        run_blocking(move || {
            let decoded = decode_frame_at(&source, seconds);

            let mut state = lock(&playback);
            if state.generation != generation {
                return;
            }
            state.frame = match decoded {
                Ok(frame) => Some(frame),
                Err(error) => {
                    log::warn!("Failed to decode frame at {seconds:.3}s from {source}: {error}");
                    None
                }
            };
            drop(state);
            events.dispatch(MediaEvent::Seeked);
        });
    }

    fn current_frame(&self) -> Option<RgbaImage> {
        lock(&self.playback).frame.clone()
    }

    fn load(&mut self) {
        let sources = self.sources.clone();
        let playback = Arc::clone(&self.playback);
        let events = self.events.clone();
        run_blocking(move || match open_first(&sources) {
            Ok(loaded) => {
                log::debug!("Loaded {}", loaded.0);
                let mut state = lock(&playback);
                state.loaded = Some(loaded);
                state.error = None;
                drop(state);
                events.dispatch(MediaEvent::CanPlayThrough);
            }
            Err(error) => {
                log::warn!("Failed to load video: {error}");
                lock(&playback).error = Some(error.to_string());
                events.dispatch(MediaEvent::Error);
            }
        });
    }

    fn clone_element(&self) -> Result<Self, FrameGrabError> {
        Ok(Self {
            sources: self.sources.iter().map(MediaSource::uncacheable).collect(),
            playback: Arc::new(Mutex::new(Playback::default())),
            events: EventTarget::new(),
        })
    }

    fn events(&self) -> &EventTarget<MediaEvent> {
        &self.events
    }

    fn load_error(&self) -> Option<String> {
        lock(&self.playback).error.clone()
    }
}

fn lock(playback: &Mutex<Playback>) -> MutexGuard<'_, Playback> {
    playback.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `task` on tokio's blocking pool, or inline outside a runtime.
fn run_blocking<F>(task: F)
where
    F: FnOnce() + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(task);
        }
        Err(_) => task(),
    }
}

fn rational_to_f64(rate: Rational) -> f64 {
    if rate.denominator() == 0 {
        0.0
    } else {
        rate.numerator() as f64 / rate.denominator() as f64
    }
}

fn open_error(location: &str, error: impl ToString) -> FrameGrabError {
    FrameGrabError::FileOpen {
        source_name: location.to_string(),
        reason: error.to_string(),
    }
}

fn open_first(sources: &[MediaSource]) -> Result<(MediaSource, VideoMetadata), FrameGrabError> {
    let mut last_error =
        FrameGrabError::Configuration("at least one media source is required".to_string());
    for source in sources {
        match probe(source) {
            Ok(metadata) => return Ok((source.clone(), metadata)),
            Err(error) => {
                log::debug!("Skipping source {source}: {error}");
                last_error = error;
            }
        }
    }
    Err(last_error)
}

fn probe(source: &MediaSource) -> Result<VideoMetadata, FrameGrabError> {
    let location = source.location();
    ffmpeg_next::init().map_err(|error| {
        open_error(&location, format!("FFmpeg initialisation failed: {error}"))
    })?;

    let input = ffmpeg_next::format::input(&location).map_err(|error| open_error(&location, error))?;
    let stream = input
        .streams()
        .best(Type::Video)
        .ok_or(FrameGrabError::NoVideoStream)?;
    let decoder = CodecContext::from_parameters(stream.parameters())
        .and_then(|context| context.decoder().video())
        .map_err(|error| open_error(&location, format!("Failed to create video decoder: {error}")))?;

    let mut frames_per_second = rational_to_f64(stream.avg_frame_rate());
    if frames_per_second <= 0.0 {
        frames_per_second = rational_to_f64(stream.rate());
    }

    let duration = container_duration_seconds(input.duration())
        .or_else(|| {
            (stream.duration() > 0).then(|| pts_to_seconds(stream.duration(), stream.time_base()))
        })
        .unwrap_or(f64::NAN);

    Ok(VideoMetadata {
        width: decoder.width(),
        height: decoder.height(),
        frames_per_second,
        duration,
        codec: decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

/// Walks decoded frames until the one displayed at the target time.
struct FrameLocator {
    decoder: ffmpeg_next::decoder::Video,
    time_base: Rational,
    frames_per_second: f64,
    target_seconds: f64,
    decoded: VideoFrame,
    previous: Option<VideoFrame>,
}

impl FrameLocator {
    /// Drain ready frames, returning the target frame once it is reached.
    fn drain(&mut self) -> Option<VideoFrame> {
        while self.decoder.receive_frame(&mut self.decoded).is_ok() {
            let seconds = self
                .decoded
                .timestamp()
                .or_else(|| self.decoded.pts())
                .map_or(0.0, |pts| pts_to_seconds(pts, self.time_base));

            let current = mem::replace(&mut self.decoded, VideoFrame::empty());
            match self.compare(seconds) {
                Ordering::Less => self.previous = Some(current),
                Ordering::Equal => return Some(current),
                // Overshot: the frame on screen is the one before.
                Ordering::Greater => return Some(self.previous.take().unwrap_or(current)),
            }
        }
        None
    }

    fn compare(&self, frame_seconds: f64) -> Ordering {
        if self.frames_per_second > 0.0 {
            seconds_to_frame_number(frame_seconds, self.frames_per_second)
                .cmp(&seconds_to_frame_number(self.target_seconds, self.frames_per_second))
        } else if frame_seconds > self.target_seconds {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}

/// Decode the frame displayed at `seconds` as RGBA.
fn decode_frame_at(source: &MediaSource, seconds: f64) -> Result<RgbaImage, FrameGrabError> {
    let location = source.location();
    let mut input =
        ffmpeg_next::format::input(&location).map_err(|error| open_error(&location, error))?;

    let (stream_index, mut locator) = {
        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(FrameGrabError::NoVideoStream)?;
        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;
        (
            stream.index(),
            FrameLocator {
                decoder,
                time_base: stream.time_base(),
                frames_per_second: rational_to_f64(stream.avg_frame_rate()),
                target_seconds: seconds,
                decoded: VideoFrame::empty(),
                previous: None,
            },
        )
    };

    // Lands on the keyframe at or before the target.
    let timestamp = seconds_to_seek_timestamp(seconds);
    input.seek(timestamp, ..timestamp)?;

    let mut found = None;
    for (stream, packet) in input.packets() {
        if stream.index() != stream_index {
            continue;
        }
        locator.decoder.send_packet(&packet)?;
        found = locator.drain();
        if found.is_some() {
            break;
        }
    }

    if found.is_none() {
        locator.decoder.send_eof()?;
        found = locator.drain().or_else(|| locator.previous.take());
    }

    let frame = found.ok_or_else(|| {
        FrameGrabError::VideoDecodeError(format!("Could not locate a frame at {seconds:.3}s"))
    })?;
    frame_to_image(&frame)
}

fn frame_to_image(frame: &VideoFrame) -> Result<RgbaImage, FrameGrabError> {
    let (width, height) = (frame.width(), frame.height());
    let mut scaler = ScalingContext::get(
        frame.format(),
        width,
        height,
        Pixel::RGBA,
        width,
        height,
        ScalingFlags::BILINEAR,
    )?;
    let mut rgba_frame = VideoFrame::empty();
    scaler.run(frame, &mut rgba_frame)?;

    let buffer = frame_to_buffer(&rgba_frame, width, height, 4);
    RgbaImage::from_raw(width, height, buffer).ok_or_else(|| {
        FrameGrabError::VideoDecodeError(
            "Failed to construct RGBA image from decoded frame data".to_string(),
        )
    })
}
