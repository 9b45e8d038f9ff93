//! Run configuration: JSON config file with CLI overrides.

use crate::density::DEFAULT_SIGMA;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Telemetry source: a CSV file, or a directory scanned for `*.csv`.
    pub telemetry: PathBuf,
    /// Directory holding the stimulus image files.
    pub images_dir: PathBuf,
    /// Output directory; artifacts land under `<output_dir>/<source stem>/`.
    pub output_dir: PathBuf,
    /// Gaussian spread of the density smoothing, in grid cells.
    pub sigma: f32,
    /// Optional filter: only process these stimulus images (base names).
    pub target_images: Option<Vec<String>>,
    pub background_alpha: f32,
    pub overlay_alpha: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            telemetry: PathBuf::from("."),
            images_dir: PathBuf::from("./images"),
            output_dir: PathBuf::from("./output"),
            sigma: DEFAULT_SIGMA,
            target_images: None,
            background_alpha: 0.8,
            overlay_alpha: 0.9,
        }
    }
}

impl RunConfig {
    /// Whether `image_key` passes the optional stimulus filter.
    pub fn wants_image(&self, image_key: &str) -> bool {
        match &self.target_images {
            Some(list) => list.iter().any(|t| {
                t == image_key || t.rsplit(['/', '\\']).next() == Some(image_key)
            }),
            None => true,
        }
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [--config FILE] [--telemetry PATH] [--images DIR] [--out DIR] \
         [--sigma N] [--image NAME]...\n\
         Flags override values from the config file."
    )
}

/// Parse CLI arguments, applying them on top of an optional config file.
pub fn parse_cli<I>(program: &str, args: I) -> Result<RunConfig, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = RunConfig::default();
    let mut images_filter: Vec<String> = Vec::new();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        let mut value_for = |flag: &str| {
            iter.next()
                .ok_or_else(|| format!("Missing value for {flag}\n{}", usage(program)))
        };
        match arg.as_str() {
            "--config" => {
                let path = PathBuf::from(value_for("--config")?);
                config = load_config(&path)?;
            }
            "--telemetry" => config.telemetry = PathBuf::from(value_for("--telemetry")?),
            "--images" => config.images_dir = PathBuf::from(value_for("--images")?),
            "--out" => config.output_dir = PathBuf::from(value_for("--out")?),
            "--sigma" => {
                let raw = value_for("--sigma")?;
                config.sigma = raw
                    .parse()
                    .map_err(|e| format!("Invalid --sigma {raw}: {e}"))?;
            }
            "--image" => images_filter.push(value_for("--image")?),
            "--help" | "-h" => return Err(usage(program)),
            other => return Err(format!("Unknown argument {other}\n{}", usage(program))),
        }
    }

    if !images_filter.is_empty() {
        config.target_images = Some(images_filter);
    }
    Ok(config)
}
