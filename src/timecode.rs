//! Time and timecode normalization.
//!
//! A grab time is either a plain number of seconds or a colon-delimited
//! `[[[HH:]MM:]SS:]FF` timecode string. Timecodes are converted to seconds
//! using the session's frame rate; the rightmost segment is always a frame
//! count.

use crate::error::FrameGrabError;

/// A requested grab position.
#[derive(Debug, Clone, PartialEq)]
pub enum GrabTime {
    /// Offset in seconds, used as-is.
    Seconds(f64),
    /// Timecode string in `[[[HH:]MM:]SS:]FF` form, each segment 1–2 digits.
    Timecode(String),
}

impl From<f64> for GrabTime {
    fn from(seconds: f64) -> Self {
        GrabTime::Seconds(seconds)
    }
}

impl From<&str> for GrabTime {
    fn from(timecode: &str) -> Self {
        GrabTime::Timecode(timecode.to_string())
    }
}

impl From<String> for GrabTime {
    fn from(timecode: String) -> Self {
        GrabTime::Timecode(timecode)
    }
}

/// Convert a [`GrabTime`] to seconds.
///
/// # Errors
///
/// Returns [`FrameGrabError::InvalidTime`] if a timecode is given without a
/// positive frame rate, or if the string is not a valid timecode.
///
/// # Example
///
/// ```
/// use framegrab::{GrabTime, normalize_time};
///
/// assert_eq!(normalize_time(&GrabTime::Seconds(2.5), 24.0)?, 2.5);
/// assert_eq!(normalize_time(&"00:00:01:12".into(), 24.0)?, 1.5);
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
pub fn normalize_time(time: &GrabTime, frame_rate: f64) -> Result<f64, FrameGrabError> {
    match time {
        GrabTime::Seconds(seconds) => Ok(*seconds),
        GrabTime::Timecode(timecode) if frame_rate.is_finite() && frame_rate > 0.0 => {
            timecode_to_seconds(timecode, frame_rate)
        }
        GrabTime::Timecode(_) => Err(FrameGrabError::InvalidTime(format!(
            "Invalid time or frame rate ({frame_rate})"
        ))),
    }
}

/// Convert a `[[[HH:]MM:]SS:]FF` timecode to seconds at `frame_rate`.
pub(crate) fn timecode_to_seconds(timecode: &str, frame_rate: f64) -> Result<f64, FrameGrabError> {
    let invalid = || FrameGrabError::InvalidTime(format!("{timecode} is not a valid timecode!"));

    let segments: Vec<&str> = timecode.split(':').collect();
    if segments.len() > 4 {
        return Err(invalid());
    }

    let mut values = [0_u32; 4];
    // Least significant first: frames, seconds, minutes, hours.
    for (slot, segment) in values.iter_mut().zip(segments.iter().rev()) {
        if segment.is_empty() || segment.len() > 2 || !segment.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        *slot = segment.parse().map_err(|_| invalid())?;
    }

    let [frames, seconds, minutes, hours] = values.map(f64::from);
    Ok(hours * 3600.0 + minutes * 60.0 + seconds + frames / frame_rate)
}
