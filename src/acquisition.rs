//! Frame acquisition.
//!
//! One acquisition run seeks the video, renders the frame onto a working
//! canvas and, when solid-frame skipping is on and the frame is solid,
//! advances by the configured number of frames and tries again:
//!
//! ```text
//! Seeking ──▶ Rendered ──▶ Done
//!    ▲  │          │
//!    │  ▼          ▼
//!    │ Failed   Retrying
//!    └─────────────┘
//! ```
//!
//! Skipping is unbounded unless
//! [`SkipSolidsOptions::max_retries`](crate::SkipSolidsOptions) is set; an
//! all-solid video otherwise runs until the seek passes the end of the video.

use crate::classifier::SolidFrameClassifier;
use crate::configuration::SkipSolidsOptions;
use crate::error::FrameGrabError;
use crate::media::MediaElement;
use crate::seek::seek;
use crate::surface::{Canvas, render_frame};

/// Working state for one acquisition run.
pub(crate) struct AcquisitionSpec<'a> {
    /// Canvas the frame is rendered onto, reused across retries.
    pub canvas: Canvas,
    /// Position to try next, in seconds.
    pub time: f64,
    pub frame_rate: f64,
    pub max_size: Option<u32>,
    pub skip_solids: SkipSolidsOptions,
    pub classifier: &'a dyn SolidFrameClassifier,
}

#[derive(Debug)]
enum AcquisitionState {
    Seeking,
    Rendered,
    Retrying,
    Done,
    Failed(FrameGrabError),
}

/// Run the seek → render → classify loop until a usable frame is on the
/// canvas or an error occurs.
pub(crate) async fn acquire<V: MediaElement>(
    video: &mut V,
    mut spec: AcquisitionSpec<'_>,
) -> Result<Canvas, FrameGrabError> {
    let mut retries = 0_u32;
    let mut state = AcquisitionState::Seeking;

    loop {
        state = match state {
            AcquisitionState::Seeking => match seek(video, spec.time).await {
                Ok(()) => AcquisitionState::Rendered,
                Err(error) => {
                    log::warn!("Failed to seek to {:.3}s: {error}", spec.time);
                    AcquisitionState::Failed(error)
                }
            },
            AcquisitionState::Rendered => match video.current_frame() {
                None => AcquisitionState::Failed(FrameGrabError::NoFrame),
                Some(frame) => {
                    render_frame(&frame, &mut spec.canvas, spec.max_size);
                    if spec.skip_solids.enabled
                        && spec.classifier.is_solid(&frame, spec.skip_solids.max_ratio)
                    {
                        AcquisitionState::Retrying
                    } else {
                        AcquisitionState::Done
                    }
                }
            },
            AcquisitionState::Retrying => {
                if spec
                    .skip_solids
                    .max_retries
                    .is_some_and(|limit| retries >= limit)
                {
                    AcquisitionState::Failed(FrameGrabError::SolidFrameLimit {
                        retries,
                        time: spec.time,
                    })
                } else {
                    retries += 1;
                    spec.time += spec.skip_solids.skip_seconds(spec.frame_rate);
                    log::info!(
                        "Found a solid frame, advancing {} frames to {:.3}s",
                        spec.skip_solids.frames,
                        spec.time
                    );
                    AcquisitionState::Seeking
                }
            }
            AcquisitionState::Done => {
                log::debug!(
                    "Acquired {}x{} frame at {:.3}s after {retries} skip(s)",
                    spec.canvas.width(),
                    spec.canvas.height(),
                    spec.time
                );
                return Ok(spec.canvas);
            }
            AcquisitionState::Failed(error) => return Err(error),
        };
    }
}
