//! Solid-frame classification.
//!
//! A frame is "solid" when the share of its pixels matching a near-uniform
//! colour predicate exceeds a threshold. Letterbox frames, fades to black and
//! blank title cards are the usual culprits.
//!
//! The default [`SolidColorClassifier`] looks for opaque near-black pixels,
//! inspecting a small downsampled copy of the frame to bound the cost. It can
//! be pointed at another colour, or at any neutral grey tone. Implement
//! [`SolidFrameClassifier`] to plug in a different predicate entirely.

use image::{Rgba, RgbaImage, imageops, imageops::FilterType};

use crate::surface::scaled_dimensions;

/// Decides whether a rendered frame is solid.
///
/// Implementations must be [`Send`] and [`Sync`] because a session may be
/// shared between tasks.
pub trait SolidFrameClassifier: Send + Sync {
    /// Return `true` if more than `max_ratio` of the frame's pixels are solid.
    fn is_solid(&self, frame: &RgbaImage, max_ratio: f64) -> bool;
}

/// Default tolerance for channel comparisons.
pub const DEFAULT_TOLERANCE: u8 = 30;

/// Default long-edge size of the downsampled copy that is inspected.
pub const DEFAULT_SAMPLE_SIZE: u32 = 10;

/// Which pixels count towards the solid ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolidColor {
    /// Pixels within tolerance of this colour on every channel.
    Rgb([u8; 3]),
    /// Any neutral tone: adjacent channels differ by less than the tolerance.
    Neutral,
}

impl Default for SolidColor {
    fn default() -> Self {
        SolidColor::Rgb([0, 0, 0])
    }
}

/// Colour-predicate classifier.
///
/// # Example
///
/// ```
/// use framegrab::{SolidColorClassifier, SolidFrameClassifier};
/// use image::{Rgba, RgbaImage};
///
/// let black = RgbaImage::from_pixel(64, 36, Rgba([0, 0, 0, 255]));
/// assert!(SolidColorClassifier::default().is_solid(&black, 0.95));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SolidColorClassifier {
    /// Colour to match. Defaults to black.
    pub target: SolidColor,
    /// Maximum channel difference (exclusive) for a pixel to count as solid.
    pub tolerance: u8,
    /// The frame is downsampled to this size before inspection.
    pub sample_size: u32,
}

impl Default for SolidColorClassifier {
    fn default() -> Self {
        Self {
            target: SolidColor::default(),
            tolerance: DEFAULT_TOLERANCE,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

impl SolidColorClassifier {
    /// Match pixels close to `target` instead of black.
    pub fn with_target(mut self, target: SolidColor) -> Self {
        self.target = target;
        self
    }

    /// Set the channel tolerance.
    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the size of the downsampled copy. Zero inspects the full frame.
    pub fn with_sample_size(mut self, sample_size: u32) -> Self {
        self.sample_size = sample_size;
        self
    }

    fn matches(&self, pixel: &Rgba<u8>) -> bool {
        let [red, green, blue, alpha] = pixel.0;
        if alpha != u8::MAX {
            return false;
        }
        match self.target {
            SolidColor::Neutral => {
                red.abs_diff(green) < self.tolerance && green.abs_diff(blue) < self.tolerance
            }
            SolidColor::Rgb([target_red, target_green, target_blue]) => {
                red.abs_diff(target_red) < self.tolerance
                    && green.abs_diff(target_green) < self.tolerance
                    && blue.abs_diff(target_blue) < self.tolerance
            }
        }
    }

    /// Fraction of pixels in `frame` that match the predicate.
    pub fn solid_ratio(&self, frame: &RgbaImage) -> f64 {
        let (width, height) =
            scaled_dimensions(frame.width(), frame.height(), Some(self.sample_size));
        let total = width as u64 * height as u64;
        if total == 0 {
            return 0.0;
        }

        let solid = if (width, height) == frame.dimensions() {
            frame.pixels().filter(|pixel| self.matches(pixel)).count()
        } else {
            imageops::resize(frame, width, height, FilterType::Triangle)
                .pixels()
                .filter(|pixel| self.matches(pixel))
                .count()
        };

        solid as f64 / total as f64
    }
}

impl SolidFrameClassifier for SolidColorClassifier {
    fn is_solid(&self, frame: &RgbaImage, max_ratio: f64) -> bool {
        let ratio = self.solid_ratio(frame);
        log::trace!("Solid pixel ratio {ratio:.3} (threshold {max_ratio:.3})");
        ratio > max_ratio
    }
}
