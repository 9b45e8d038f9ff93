//! Density synthesis: occupancy grid -> smoothed, normalized field.
//!
//! A raw single-pixel-hit occupancy grid is illegible at display scale.
//! Smoothing with an isotropic Gaussian turns sparse hits into a
//! continuous surface, and max-normalization pins the color scale to
//! `[0, 1]` regardless of how much gaze a given image collected.

use crate::types::{DensityField, GazeMatrix};

/// Default Gaussian spread, in grid cells.
pub const DEFAULT_SIGMA: f32 = 15.0;

/// Normalized 1D Gaussian taps for a separable two-pass blur.
/// Radius is `ceil(3 * sigma)`; taps sum to 1.
fn gaussian_taps(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil() as usize;
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
    let mut taps = Vec::with_capacity(2 * radius + 1);
    let mut sum = 0.0f32;
    for i in 0..=2 * radius {
        let d = i as f32 - radius as f32;
        let w = (-d * d * inv_two_sigma_sq).exp();
        taps.push(w);
        sum += w;
    }
    for t in &mut taps {
        *t /= sum;
    }
    taps
}

/// One horizontal pass of the separable filter with clamped borders.
fn blur_pass_horizontal(src: &DensityField, taps: &[f32]) -> DensityField {
    let radius = taps.len() / 2;
    let mut out = DensityField::new(src.w, src.h);
    for y in 0..src.h {
        for x in 0..src.w {
            let mut acc = 0.0f32;
            for (i, &t) in taps.iter().enumerate() {
                let sx = (x as isize + i as isize - radius as isize)
                    .clamp(0, src.w as isize - 1) as usize;
                acc += t * src.get(sx, y);
            }
            out.set(x, y, acc);
        }
    }
    out
}

fn blur_pass_vertical(src: &DensityField, taps: &[f32]) -> DensityField {
    let radius = taps.len() / 2;
    let mut out = DensityField::new(src.w, src.h);
    for y in 0..src.h {
        for x in 0..src.w {
            let mut acc = 0.0f32;
            for (i, &t) in taps.iter().enumerate() {
                let sy = (y as isize + i as isize - radius as isize)
                    .clamp(0, src.h as isize - 1) as usize;
                acc += t * src.get(x, sy);
            }
            out.set(x, y, acc);
        }
    }
    out
}

/// Smooth an occupancy grid and normalize it to `[0, 1]`.
///
/// An all-zero grid produces the all-zero field of the same shape; the
/// normalization never divides by zero.
pub fn synthesize(matrix: &GazeMatrix, sigma: f32) -> DensityField {
    let mut field = DensityField::new(matrix.w, matrix.h);
    if matrix.w == 0 || matrix.h == 0 {
        return field;
    }
    for (dst, &src) in field.data.iter_mut().zip(matrix.data.iter()) {
        *dst = src as f32;
    }

    let taps = gaussian_taps(sigma);
    if taps.len() > 1 {
        field = blur_pass_horizontal(&field, &taps);
        field = blur_pass_vertical(&field, &taps);
    }

    let max = field.max_value();
    if max > 0.0 {
        for v in &mut field.data {
            *v /= max;
        }
    }
    field
}
