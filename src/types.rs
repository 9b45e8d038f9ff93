//! Core value types shared across the pipeline stages.
//!
//! Everything here is an immutable value once produced: a `TelemetryBatch`
//! is built once per stimulus image, consumed once by the rasterizer, and
//! the derived grids are handed forward without mutation.

use serde::{Deserialize, Serialize};

/// One timestamped raw gaze measurement in screen pixel coordinates.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct RawGazeSample {
    pub x: f64,
    pub y: f64,
    /// Capture timestamp in milliseconds. Carried through for downstream
    /// consumers; the spatial pipeline never reads it.
    #[serde(default)]
    pub t: f64,
}

/// On-screen bounding rectangle of the stimulus element at capture time.
///
/// `left`/`top` are the origin used for relative-position computation;
/// `width`/`height` are stored in screen pixels as captured. Distinct from
/// the stimulus image's own native pixel dimensions.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct StimulusRect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

impl StimulusRect {
    /// A rectangle with non-positive extent cannot anchor a coordinate
    /// transform and disqualifies its whole batch.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// True pixel size of the stimulus image file, independent of its on-screen
/// display size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ImageDimensions {
    pub width: usize,
    pub height: usize,
}

/// Merged telemetry for one stimulus image: every gaze sample collected
/// across all rows referencing the image, the last valid rectangle seen for
/// it, and the image's native dimensions.
#[derive(Clone, Debug)]
pub struct TelemetryBatch {
    pub samples: Vec<RawGazeSample>,
    pub rect: StimulusRect,
    pub dims: ImageDimensions,
}

/// Binary occupancy grid over the stimulus image's pixel space.
///
/// Row-major, shape `(height, width)`, one byte per cell. A cell is `1` if
/// at least one sample rasterized to it, else `0`. Occupancy, not count:
/// the grid answers "was this pixel looked at", so repeated hits on one
/// cell are a no-op.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GazeMatrix {
    pub w: usize,
    pub h: usize,
    pub data: Vec<u8>,
}

impl GazeMatrix {
    /// Zero-initialized grid of the given image dimensions.
    pub fn new(dims: ImageDimensions) -> Self {
        Self {
            w: dims.width,
            h: dims.height,
            data: vec![0u8; dims.width * dims.height],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[self.idx(x, y)]
    }

    /// Mark the cell as occupied. Idempotent.
    #[inline]
    pub fn mark(&mut self, x: usize, y: usize) {
        let i = self.idx(x, y);
        self.data[i] = 1;
    }

    /// Number of occupied cells (full-grid scan).
    pub fn occupied_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    /// Coordinates of every occupied cell as `(x, y)`, in row-major order.
    ///
    /// This is the coordinate-extraction path used for the scatter overlay;
    /// it is intentionally a separate derivation from
    /// [`occupied_count`](GazeMatrix::occupied_count) so the renderer can
    /// cross-check the two.
    pub fn occupied_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for y in 0..self.h {
            for x in 0..self.w {
                if self.data[self.idx(x, y)] != 0 {
                    cells.push((x, y));
                }
            }
        }
        cells
    }
}

/// Smoothed, max-normalized density over the same grid as a [`GazeMatrix`].
/// Values in `[0, 1]`; all-zero when the source grid is all-zero.
#[derive(Clone, Debug)]
pub struct DensityField {
    pub w: usize,
    pub h: usize,
    pub data: Vec<f32>,
}

impl DensityField {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    pub fn max_value(&self) -> f32 {
        self.data.iter().fold(0.0f32, |acc, &v| acc.max(v))
    }
}
