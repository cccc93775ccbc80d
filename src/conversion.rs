//! Timestamp and pixel-buffer conversions shared by the FFmpeg backend.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};
use ffmpeg_sys_next::AV_TIME_BASE;

/// Copy plane 0 of a packed video frame into a tightly-packed buffer.
///
/// `bytes_per_pixel` is 4 for RGBA.
pub(crate) fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_length = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == row_length {
        data[..row_length * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_length * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_length]);
        }
        buffer
    }
}

/// Rescale a PTS value from the stream time base to seconds.
pub(crate) fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Convert seconds to a container seek timestamp in `AV_TIME_BASE` units.
pub(crate) fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    (seconds.max(0.0) * AV_TIME_BASE as f64) as i64
}

/// Index of the frame displayed at `seconds`.
///
/// A small epsilon absorbs float error so that `n / fps` maps back to `n`.
pub(crate) fn seconds_to_frame_number(seconds: f64, frames_per_second: f64) -> i64 {
    (seconds * frames_per_second + 1e-6).floor() as i64
}

/// Container duration (in `AV_TIME_BASE` units) to seconds, or `None` when
/// the container does not report one.
pub(crate) fn container_duration_seconds(duration: i64) -> Option<f64> {
    (duration > 0).then(|| duration as f64 / AV_TIME_BASE as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_rescales_by_time_base() {
        assert_eq!(pts_to_seconds(90_000, Rational::new(1, 90_000)), 1.0);
        assert_eq!(pts_to_seconds(12_800, Rational::new(1, 12_800)), 1.0);
    }

    #[test]
    fn seek_timestamps_are_microseconds() {
        assert_eq!(seconds_to_seek_timestamp(1.5), 1_500_000);
        assert_eq!(seconds_to_seek_timestamp(-2.0), 0);
    }

    #[test]
    fn frame_numbers_survive_float_error() {
        assert_eq!(seconds_to_frame_number(5.0 / 24.0, 24.0), 5);
        assert_eq!(seconds_to_frame_number(2.0 + 5.0 / 24.0, 24.0), 53);
        assert_eq!(seconds_to_frame_number(0.0, 30.0), 0);
    }

    #[test]
    fn unknown_container_duration() {
        assert_eq!(container_duration_seconds(0), None);
        assert_eq!(container_duration_seconds(2_500_000), Some(2.5));
    }
}
