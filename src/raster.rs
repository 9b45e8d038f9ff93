//! Gaze rasterizer: telemetry batch -> occupancy grid.

use crate::transform::{map_sample, MapOutcome};
use crate::types::{GazeMatrix, TelemetryBatch};
use log::{debug, warn};
use serde::Serialize;

/// Per-batch acceptance tally. `accepted / total` is the principal
/// data-quality signal for the pipeline.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RasterStats {
    pub total: usize,
    pub accepted: usize,
    pub out_of_bounds: usize,
    pub malformed: usize,
}

/// Rasterize a batch into a binary occupancy grid.
///
/// Returns `None` when the batch's rectangle is invalid: no matrix is
/// producible, and the caller must skip persistence and rendering for the
/// image entirely rather than emit an all-zero grid indistinguishable from
/// a legitimately empty-gaze image. Rejected points are tallied, never
/// fatal.
pub fn rasterize(batch: &TelemetryBatch) -> (Option<GazeMatrix>, RasterStats) {
    let mut stats = RasterStats {
        total: batch.samples.len(),
        ..Default::default()
    };

    if !batch.rect.is_valid() || batch.dims.width == 0 || batch.dims.height == 0 {
        warn!(
            "rasterize: degenerate batch (rect {}x{}, image {}x{}), no matrix producible",
            batch.rect.width, batch.rect.height, batch.dims.width, batch.dims.height
        );
        return (None, stats);
    }

    let mut matrix = GazeMatrix::new(batch.dims);
    for sample in &batch.samples {
        match map_sample(sample, &batch.rect, batch.dims) {
            MapOutcome::Mapped(x, y) => {
                matrix.mark(x, y);
                stats.accepted += 1;
            }
            MapOutcome::OutOfBounds => stats.out_of_bounds += 1,
            MapOutcome::Malformed => {
                warn!(
                    "rasterize: malformed sample x={} y={} t={}",
                    sample.x, sample.y, sample.t
                );
                stats.malformed += 1;
            }
        }
    }

    debug!(
        "rasterize: {}x{} accepted={}/{} oob={} malformed={} occupied={}",
        matrix.w,
        matrix.h,
        stats.accepted,
        stats.total,
        stats.out_of_bounds,
        stats.malformed,
        matrix.occupied_count()
    );
    (Some(matrix), stats)
}
