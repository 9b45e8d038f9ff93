#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod pipeline;
pub mod types;

// Stage modules – public for tools and tests, considered internals.
pub mod density;
pub mod image_io;
pub mod raster;
pub mod render;
pub mod target;
pub mod telemetry;
pub mod transform;

// --- High-level re-exports -------------------------------------------------

// Main entry point: one telemetry table end to end.
pub use crate::pipeline::process_source;

pub use crate::config::RunConfig;
pub use crate::diagnostics::{ImageReport, RunReport, SkipKind};
pub use crate::types::{
    DensityField, GazeMatrix, ImageDimensions, RawGazeSample, StimulusRect, TelemetryBatch,
};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```
/// use gaze_mapper::prelude::*;
///
/// let batch = TelemetryBatch {
///     samples: vec![RawGazeSample { x: 200.0, y: 100.0, t: 0.0 }],
///     rect: StimulusRect {
///         left: 100.0, top: 50.0, width: 200.0, height: 100.0,
///         ..Default::default()
///     },
///     dims: ImageDimensions { width: 400, height: 200 },
/// };
/// let (matrix, stats) = rasterize(&batch);
/// assert_eq!(stats.accepted, 1);
/// assert_eq!(matrix.unwrap().occupied_count(), 1);
/// ```
pub mod prelude {
    pub use crate::density::synthesize;
    pub use crate::raster::rasterize;
    pub use crate::render::{render_overlay, OverlayOutcome, RenderOptions};
    pub use crate::types::{
        DensityField, GazeMatrix, ImageDimensions, RawGazeSample, StimulusRect, TelemetryBatch,
    };
}
