//! Structured diagnostics for a batch run.
//!
//! Every skip or rejection is scoped to the smallest unit possible (one
//! sample, one row, one image) and surfaced here instead of aborting the
//! job. Reports serialize to JSON next to the artifacts.

use crate::raster::RasterStats;
use serde::Serialize;
use std::path::PathBuf;

/// Failure taxonomy for skip events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// Required field missing/null on a telemetry row. Silent skip.
    RowRejected,
    /// `webgazer_data` or `webgazer_targets` failed to parse. Logged.
    JsonMalformed,
    /// No known stimulus element identifier in the parsed targets. Logged.
    MissingTarget,
    /// Resolved rectangle has non-positive extent; the image's whole
    /// accumulation is skipped.
    InvalidRect,
    /// A single raw sample had a non-numeric or missing coordinate.
    PointMalformed,
    /// Transformed coordinate fell outside the image grid. Expected;
    /// tallied, not logged as an error.
    PointOutOfBounds,
    /// Referenced stimulus image file could not be located.
    ImageMissing,
    /// Occupancy count disagreed with the derived scatter list; the
    /// renderer reconciled from the scatter coordinates.
    ConsistencyMismatch,
}

/// Row-level tallies for one telemetry source.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RowCounts {
    pub seen: usize,
    pub used: usize,
    pub rejected: usize,
    pub json_malformed: usize,
    pub missing_target: usize,
}

/// Per-stimulus-image processing report.
#[derive(Clone, Debug, Serialize)]
pub struct ImageReport {
    /// Stimulus image key (base file name).
    pub image: String,
    pub width: usize,
    pub height: usize,
    pub raster: RasterStats,
    /// Set when the image was skipped before producing artifacts.
    pub skipped: Option<SkipKind>,
    /// True when the renderer's cross-check fired. A correct pipeline
    /// never sets this.
    pub reconciled: bool,
    pub raster_ms: f64,
    pub density_ms: f64,
    pub render_ms: f64,
    pub matrix_path: Option<PathBuf>,
    pub overlay_path: Option<PathBuf>,
}

impl ImageReport {
    /// Skeleton report for an image skipped before rasterization.
    pub fn skipped(image: &str, kind: SkipKind) -> Self {
        Self {
            image: image.to_string(),
            width: 0,
            height: 0,
            raster: RasterStats::default(),
            skipped: Some(kind),
            reconciled: false,
            raster_ms: 0.0,
            density_ms: 0.0,
            render_ms: 0.0,
            matrix_path: None,
            overlay_path: None,
        }
    }

    /// An image counts as fully processed once both artifacts exist.
    pub fn is_processed(&self) -> bool {
        self.skipped.is_none() && self.matrix_path.is_some() && self.overlay_path.is_some()
    }
}

/// Report for one telemetry source (one CSV table).
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub source: PathBuf,
    pub rows: RowCounts,
    pub images: Vec<ImageReport>,
    pub total_ms: f64,
}

impl RunReport {
    /// Whether at least one image was fully processed. Drives the job's
    /// exit status; a run full of dirty rows still succeeds if any image
    /// made it through.
    pub fn processed_any(&self) -> bool {
        self.images.iter().any(ImageReport::is_processed)
    }
}
