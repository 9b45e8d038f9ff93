use gaze_mapper::types::{ImageDimensions, RawGazeSample, StimulusRect, TelemetryBatch};
use std::fs;
use std::path::PathBuf;

/// The reference geometry used across the end-to-end scenarios: a 200x100
/// on-screen rectangle at (100, 50) showing a 400x200 image.
pub fn reference_rect() -> StimulusRect {
    StimulusRect {
        x: 100.0,
        y: 50.0,
        width: 200.0,
        height: 100.0,
        left: 100.0,
        top: 50.0,
    }
}

pub fn reference_dims() -> ImageDimensions {
    ImageDimensions {
        width: 400,
        height: 200,
    }
}

pub fn sample(x: f64, y: f64) -> RawGazeSample {
    RawGazeSample { x, y, t: 0.0 }
}

pub fn batch(samples: Vec<RawGazeSample>) -> TelemetryBatch {
    TelemetryBatch {
        samples,
        rect: reference_rect(),
        dims: reference_dims(),
    }
}

/// Fresh scratch directory under the system temp dir.
pub fn temp_workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gaze_mapper_{name}_{}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).expect("clear scratch dir");
    }
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
