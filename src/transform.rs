//! Stimulus-relative coordinate transform.
//!
//! Maps one raw screen-space gaze point into the stimulus image's own
//! pixel grid. The mapping goes through the relative position inside the
//! on-screen rectangle, so it is independent of how the stimulus was
//! scaled or positioned on the participant's display.

use crate::types::{ImageDimensions, RawGazeSample, StimulusRect};

/// Result of mapping one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapOutcome {
    /// Accepted pixel coordinate `(x, y)` inside the image grid.
    Mapped(usize, usize),
    /// The sample fell outside the stimulus rectangle or rounded onto the
    /// grid boundary. Expected during eye movement to UI chrome; tallied,
    /// never clamped.
    OutOfBounds,
    /// The sample carried a non-finite coordinate.
    Malformed,
}

/// Map a raw gaze sample into stimulus-image pixel space.
///
/// `rel = (sample - origin) / extent` per axis, scaled by the image
/// dimensions and rounded half away from zero (`f64::round`). A point is
/// accepted only inside the half-open ranges `[0, width)` x `[0, height)`;
/// the far rectangle corner maps exactly onto the bound and is rejected.
///
/// The caller must guarantee `rect.is_valid()`.
pub fn map_sample(
    sample: &RawGazeSample,
    rect: &StimulusRect,
    dims: ImageDimensions,
) -> MapOutcome {
    if !sample.x.is_finite() || !sample.y.is_finite() {
        return MapOutcome::Malformed;
    }

    let rel_x = (sample.x - rect.left) / rect.width;
    let rel_y = (sample.y - rect.top) / rect.height;

    let px = (rel_x * dims.width as f64).round();
    let py = (rel_y * dims.height as f64).round();

    if px < 0.0 || py < 0.0 || px >= dims.width as f64 || py >= dims.height as f64 {
        return MapOutcome::OutOfBounds;
    }
    MapOutcome::Mapped(px as usize, py as usize)
}
