//! Per-source batch accumulation.
//!
//! One builder is scoped to one telemetry-source pass and finishes into an
//! immutable, deterministically ordered mapping. Nothing here is shared
//! across sources or across runs.

use crate::types::{RawGazeSample, StimulusRect};
use std::collections::BTreeMap;

/// Samples and geometry accumulated for one stimulus image, before the
/// image file itself (and hence its pixel dimensions) is consulted.
#[derive(Clone, Debug, Default)]
pub struct ImageAccumulator {
    pub samples: Vec<RawGazeSample>,
    pub rect: StimulusRect,
}

/// Accumulates rows of one telemetry source into per-image batches.
#[derive(Debug, Default)]
pub struct BatchBuilder {
    entries: BTreeMap<String, ImageAccumulator>,
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row's samples for `image_key`.
    ///
    /// The rectangle is expected to be stable per image; the last *valid*
    /// value observed wins, so an invalid rectangle never shadows a valid
    /// one from an earlier row.
    pub fn add(&mut self, image_key: &str, samples: Vec<RawGazeSample>, rect: StimulusRect) {
        let entry = self.entries.entry(image_key.to_string()).or_default();
        if rect.is_valid() || !entry.rect.is_valid() {
            entry.rect = rect;
        }
        entry.samples.extend(samples);
    }

    /// Finish the pass, yielding an immutable mapping in key order.
    pub fn finish(self) -> BTreeMap<String, ImageAccumulator> {
        self.entries
    }
}
