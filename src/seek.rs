//! Asynchronous seeking.

use crate::error::FrameGrabError;
use crate::media::{MediaElement, MediaEvent};

/// Move `video` to `seconds` and wait until it reports the seek finished.
///
/// The range check happens before anything is touched: a target past the
/// end of the video fails with [`FrameGrabError::SeekRange`] without
/// registering a listener or changing the position. A seek that never
/// completes leaves the returned future pending; wrap it in a timeout if
/// that matters to the caller.
pub async fn seek<V: MediaElement>(video: &mut V, seconds: f64) -> Result<(), FrameGrabError> {
    let duration = video.duration();
    if duration < seconds {
        return Err(FrameGrabError::SeekRange {
            requested: seconds,
            duration,
        });
    }

    let seeked = video.listen(MediaEvent::Seeked);
    video.set_current_time(seconds);
    seeked.await;

    log::trace!("Seeked to {seconds:.3}s");
    Ok(())
}
