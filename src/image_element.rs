//! Image output element.
//!
//! [`ImageElement`] is the `<img>`-style grab target: assigning a source
//! decodes it and dispatches [`ImageEvent::Load`] or [`ImageEvent::Error`].
//! Sources are either `data:` URLs (what [`FrameGrab`](crate::FrameGrab)
//! assigns) or paths to image files.

use base64::{Engine as _, engine::general_purpose};
use image::RgbaImage;

use crate::events::{EventListener, EventTarget};
use crate::session::{GrabTarget, Output};

/// Events an [`ImageElement`] dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageEvent {
    /// The source was decoded successfully.
    Load,
    /// The source could not be decoded.
    Error,
}

/// An image element holding the decoded pixels of its current source.
///
/// # Example
///
/// ```
/// use framegrab::{Canvas, ImageElement};
///
/// let mut image = ImageElement::new();
/// image.set_src(Canvas::new(4, 3).to_data_url()?);
/// assert_eq!((image.width(), image.height()), (4, 3));
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
#[derive(Debug, Default)]
pub struct ImageElement {
    src: Option<String>,
    image: Option<RgbaImage>,
    error: Option<String>,
    events: EventTarget<ImageEvent>,
}

impl ImageElement {
    /// Create an element with no source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a new source and decode it.
    pub fn set_src(&mut self, src: impl Into<String>) {
        let src = src.into();
        let decoded = decode_source(&src);
        self.src = Some(src);

        match decoded {
            Ok(image) => {
                self.image = Some(image);
                self.error = None;
                self.events.dispatch(ImageEvent::Load);
            }
            Err(reason) => {
                log::debug!("Image source failed to load: {reason}");
                self.image = None;
                self.error = Some(reason);
                self.events.dispatch(ImageEvent::Error);
            }
        }
    }

    /// The current source, if one was assigned.
    pub fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    /// Decoded pixels of the current source.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Natural width of the loaded image, or 0.
    pub fn width(&self) -> u32 {
        self.image.as_ref().map_or(0, RgbaImage::width)
    }

    /// Natural height of the loaded image, or 0.
    pub fn height(&self) -> u32 {
        self.image.as_ref().map_or(0, RgbaImage::height)
    }

    /// Why the current source failed to load, if it did.
    pub fn load_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Register a one-shot listener for `event`.
    pub fn listen(&self, event: ImageEvent) -> EventListener<ImageEvent> {
        self.events.listen(event)
    }

    /// The element's event target.
    pub fn events(&self) -> &EventTarget<ImageEvent> {
        &self.events
    }
}

impl GrabTarget for ImageElement {
    fn tag_name(&self) -> &str {
        "img"
    }

    fn output(&mut self) -> Option<Output<'_>> {
        Some(Output::Image(self))
    }
}

fn decode_source(src: &str) -> Result<RgbaImage, String> {
    let Some(data_url) = src.strip_prefix("data:") else {
        return image::open(src)
            .map(|image| image.to_rgba8())
            .map_err(|error| error.to_string());
    };

    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| "malformed data URL".to_string())?;
    if !header.ends_with(";base64") {
        return Err(format!("unsupported data URL encoding: {header}"));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|error| error.to_string())?;
    image::load_from_memory(&bytes)
        .map(|image| image.to_rgba8())
        .map_err(|error| error.to_string())
}
