//! Stimulus target resolution.
//!
//! The instrumentation tags the stimulus element under different DOM
//! identifiers depending on experiment type (image trials vs. video
//! trials). Resolution probes a fixed, ordered list of known identifiers
//! and takes the first match; guessing a default rectangle would
//! misattribute gaze to the wrong region, so no match means the row is
//! unusable for this pipeline.

use crate::types::StimulusRect;
use std::collections::BTreeMap;

/// Known stimulus element identifiers, in probe order.
pub const STIMULUS_ELEMENT_IDS: [&str; 2] = [
    "#jspsych-image-keyboard-response-stimulus",
    "#jspsych-video-keyboard-response-stimulus",
];

/// Pick the stimulus rectangle out of a parsed targets map.
///
/// Returns `None` when no known identifier is present; the caller records
/// a `MissingTarget` skip for the row.
pub fn resolve_target(targets: &BTreeMap<String, StimulusRect>) -> Option<&StimulusRect> {
    STIMULUS_ELEMENT_IDS
        .iter()
        .find_map(|id| targets.get(*id))
}
