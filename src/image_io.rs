//! I/O helpers for stimulus images and artifacts.
//!
//! - `load_rgb_image`: read a PNG/JPEG/etc. into an owned RGB buffer.
//! - `save_matrix`: persist a `GazeMatrix` as a raw binary grid file.
//! - `save_overlay`: write a rendered composite to PNG.
//! - `write_json_file`: pretty-print a serializable report to disk.

use crate::types::{GazeMatrix, ImageDimensions};
use image::RgbImage;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Magic prefix of the binary matrix artifact.
pub const MATRIX_MAGIC: &[u8; 4] = b"GZMX";

/// Load an image from disk as 8-bit RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgb8();
    Ok(img)
}

/// Native pixel dimensions of a loaded stimulus image.
pub fn dimensions_of(img: &RgbImage) -> ImageDimensions {
    ImageDimensions {
        width: img.width() as usize,
        height: img.height() as usize,
    }
}

/// Persist an occupancy grid: 12-byte header (magic, width, height as
/// little-endian u32) followed by row-major cells, one byte per cell.
pub fn save_matrix(matrix: &GazeMatrix, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut bytes = Vec::with_capacity(12 + matrix.data.len());
    bytes.extend_from_slice(MATRIX_MAGIC);
    bytes.extend_from_slice(&(matrix.w as u32).to_le_bytes());
    bytes.extend_from_slice(&(matrix.h as u32).to_le_bytes());
    bytes.extend_from_slice(&matrix.data);
    fs::write(path, bytes).map_err(|e| format!("Failed to write matrix {}: {e}", path.display()))
}

/// Read back a persisted occupancy grid.
pub fn load_matrix(path: &Path) -> Result<GazeMatrix, String> {
    let bytes =
        fs::read(path).map_err(|e| format!("Failed to read matrix {}: {e}", path.display()))?;
    if bytes.len() < 12 || &bytes[0..4] != MATRIX_MAGIC {
        return Err(format!("Not a gaze matrix file: {}", path.display()));
    }
    let w = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let h = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let data = bytes[12..].to_vec();
    if data.len() != w * h {
        return Err(format!(
            "Matrix {} truncated: expected {} cells, found {}",
            path.display(),
            w * h,
            data.len()
        ));
    }
    Ok(GazeMatrix { w, h, data })
}

/// Save a rendered composite image.
pub fn save_overlay(img: &RgbImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    img.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
