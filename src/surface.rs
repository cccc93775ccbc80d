//! Off-screen drawing surfaces.
//!
//! [`Canvas`] is the drawing surface frames are rendered onto: it can be
//! resized, drawn into, read back as RGBA pixels, and encoded to a PNG data
//! URL. [`render_frame`] draws a decoded frame at native or proportionally
//! scaled size.

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops, imageops::FilterType};

use crate::error::FrameGrabError;
use crate::session::{GrabTarget, Output};

/// An RGBA drawing surface.
///
/// Resizing a canvas clears it to transparent black, like an HTML canvas.
///
/// # Example
///
/// ```
/// use framegrab::Canvas;
///
/// let mut canvas = Canvas::new(4, 2);
/// canvas.resize(8, 8);
/// assert_eq!((canvas.width(), canvas.height()), (8, 8));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Create a transparent canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Resize the canvas, discarding its contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
    }

    /// Copy `source` into the rectangle at `(x, y)` of size `width`×`height`,
    /// scaling it when the rectangle differs from the source size. Pixels are
    /// replaced, not blended.
    pub fn draw_image(&mut self, source: &RgbaImage, x: i64, y: i64, width: u32, height: u32) {
        if width == 0 || height == 0 || source.width() == 0 || source.height() == 0 {
            return;
        }
        if source.dimensions() == (width, height) {
            imageops::replace(&mut self.pixels, source, x, y);
        } else {
            let scaled = imageops::resize(source, width, height, FilterType::Triangle);
            imageops::replace(&mut self.pixels, &scaled, x, y);
        }
    }

    /// Resize this canvas to match `other` and copy its pixels.
    pub fn copy_from_canvas(&mut self, other: &Canvas) {
        self.pixels.clone_from(&other.pixels);
    }

    /// Raw RGBA pixel data.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Consume the canvas, returning its pixels.
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Encode the canvas as a `data:image/png;base64,...` URL.
    ///
    /// An empty canvas encodes to `data:,`.
    pub fn to_data_url(&self) -> Result<String, FrameGrabError> {
        if self.width() == 0 || self.height() == 0 {
            return Ok("data:,".to_string());
        }
        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(self.pixels.clone()).write_to(&mut encoded, ImageFormat::Png)?;
        Ok(format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(encoded.into_inner())
        ))
    }

    /// Save the canvas to a file. The format is inferred from the extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FrameGrabError> {
        self.pixels.save(path)?;
        Ok(())
    }
}

impl From<RgbaImage> for Canvas {
    fn from(pixels: RgbaImage) -> Self {
        Self { pixels }
    }
}

impl GrabTarget for Canvas {
    fn tag_name(&self) -> &str {
        "canvas"
    }

    fn output(&mut self) -> Option<Output<'_>> {
        Some(Output::Canvas(self))
    }
}

/// Compute the size a frame is drawn at.
///
/// With no maximum (or a maximum of zero) the native size is kept. When both
/// native dimensions already fit within `max_size` the native size is kept as
/// well. Otherwise the width becomes `max_size` and the height follows the
/// native aspect ratio.
///
/// ```
/// use framegrab::scaled_dimensions;
///
/// assert_eq!(scaled_dimensions(1920, 1080, Some(960)), (960, 540));
/// assert_eq!(scaled_dimensions(1920, 1080, Some(2000)), (1920, 1080));
/// assert_eq!(scaled_dimensions(1920, 1080, None), (1920, 1080));
/// ```
pub fn scaled_dimensions(width: u32, height: u32, max_size: Option<u32>) -> (u32, u32) {
    let max_size = match max_size {
        Some(max_size) if max_size > 0 => max_size,
        _ => return (width, height),
    };
    if max_size >= width && max_size >= height {
        return (width, height);
    }
    if width == 0 {
        return (max_size, height);
    }
    let aspect_ratio = height as f64 / width as f64;
    let scaled_height = (aspect_ratio * max_size as f64).round() as u32;
    (max_size, scaled_height.max(1))
}

/// Draw `frame` onto `canvas`, resizing the canvas to the native or scaled
/// frame size first.
pub fn render_frame(frame: &RgbaImage, canvas: &mut Canvas, max_size: Option<u32>) {
    let (width, height) = scaled_dimensions(frame.width(), frame.height(), max_size);
    canvas.resize(width, height);
    canvas.draw_image(frame, 0, 0, width, height);
}
