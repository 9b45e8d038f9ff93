//! Consistency-checked overlay renderer.
//!
//! Composites, in order: the stimulus image as background, the density
//! field as a translucent color-mapped layer, and the occupied-cell
//! scatter marks. Before compositing it cross-checks the occupancy count
//! (full-grid scan) against the scatter coordinate list (coordinate
//! extraction); the two derive from the same grid and must agree. On
//! mismatch the occupancy layer is rebuilt from the scatter list, which is
//! authoritative, and drawn with an alternate colormap so the discrepancy
//! stays visible in the artifact.

use crate::types::{DensityField, GazeMatrix, ImageDimensions};
use image::RgbImage;
use log::warn;

/// Rendering knobs, mirroring the opacities of the historical artifacts.
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Background image opacity over a white canvas.
    pub background_alpha: f32,
    /// Peak opacity of the density layer; per-pixel opacity scales with
    /// the density value.
    pub overlay_alpha: f32,
    /// Scatter mark color and opacity.
    pub scatter_color: [u8; 3],
    pub scatter_alpha: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            background_alpha: 0.8,
            overlay_alpha: 0.9,
            scatter_color: [0, 255, 255],
            scatter_alpha: 0.6,
        }
    }
}

/// Outcome of one render call.
#[derive(Debug)]
pub enum OverlayOutcome {
    Rendered {
        image: RgbImage,
        /// True when the consistency check failed and the occupancy layer
        /// was rebuilt from the scatter list. Must never happen in a
        /// correct pipeline; treated as a defect signal by the tests.
        reconciled: bool,
    },
    /// The matrix was zero-sized; nothing to draw.
    Skipped,
}

impl OverlayOutcome {
    pub fn was_reconciled(&self) -> bool {
        matches!(
            self,
            OverlayOutcome::Rendered {
                reconciled: true,
                ..
            }
        )
    }
}

/// Piecewise-linear magma approximation (five anchor colors).
fn magma(t: f32) -> [u8; 3] {
    const ANCHORS: [[f32; 3]; 5] = [
        [0.0, 0.0, 4.0],
        [81.0, 18.0, 124.0],
        [183.0, 55.0, 121.0],
        [252.0, 137.0, 97.0],
        [252.0, 253.0, 191.0],
    ];
    lerp_anchors(&ANCHORS, t)
}

/// Piecewise-linear "hot" colormap used for the reconciled layer.
fn hot(t: f32) -> [u8; 3] {
    const ANCHORS: [[f32; 3]; 4] = [
        [10.0, 0.0, 0.0],
        [230.0, 0.0, 0.0],
        [255.0, 210.0, 0.0],
        [255.0, 255.0, 255.0],
    ];
    lerp_anchors(&ANCHORS, t)
}

fn lerp_anchors(anchors: &[[f32; 3]], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let span = (anchors.len() - 1) as f32;
    let pos = t * span;
    let lo = (pos.floor() as usize).min(anchors.len() - 2);
    let frac = pos - lo as f32;
    let a = anchors[lo];
    let b = anchors[lo + 1];
    [
        (a[0] + (b[0] - a[0]) * frac) as u8,
        (a[1] + (b[1] - a[1]) * frac) as u8,
        (a[2] + (b[2] - a[2]) * frac) as u8,
    ]
}

#[inline]
fn blend(dst: [u8; 3], src: [u8; 3], alpha: f32) -> [u8; 3] {
    let a = alpha.clamp(0.0, 1.0);
    [
        (dst[0] as f32 * (1.0 - a) + src[0] as f32 * a) as u8,
        (dst[1] as f32 * (1.0 - a) + src[1] as f32 * a) as u8,
        (dst[2] as f32 * (1.0 - a) + src[2] as f32 * a) as u8,
    ]
}

/// Render the composite overlay.
///
/// `scatter` is the occupied-cell coordinate list extracted from `matrix`
/// by the caller ([`GazeMatrix::occupied_cells`]); passing it separately
/// keeps the two derivations on independent code paths for the
/// cross-check. Dimension disagreement between matrix, field, and
/// background is a hard error: it means the stimulus file on disk no
/// longer matches the telemetry.
pub fn render_overlay(
    matrix: &GazeMatrix,
    scatter: &[(usize, usize)],
    field: &DensityField,
    background: &RgbImage,
    opts: &RenderOptions,
) -> Result<OverlayOutcome, String> {
    if matrix.w == 0 || matrix.h == 0 {
        return Ok(OverlayOutcome::Skipped);
    }
    let dims = ImageDimensions {
        width: matrix.w,
        height: matrix.h,
    };
    if field.w != dims.width || field.h != dims.height {
        return Err(format!(
            "density field {}x{} does not match matrix {}x{}",
            field.w, field.h, dims.width, dims.height
        ));
    }
    if background.width() as usize != dims.width || background.height() as usize != dims.height {
        return Err(format!(
            "background image {}x{} does not match matrix {}x{}",
            background.width(),
            background.height(),
            dims.width,
            dims.height
        ));
    }

    let occupied = matrix.occupied_count();
    let reconcile = occupied != scatter.len();
    if reconcile {
        warn!(
            "render: occupancy mismatch, grid scan={} scatter={}; rebuilding from scatter",
            occupied,
            scatter.len()
        );
    }

    // Rebuilt binary layer drawn instead of the smoothed field when the
    // cross-check fails; the scatter list is the authoritative source.
    let rebuilt = reconcile.then(|| {
        let mut m = GazeMatrix::new(dims);
        for &(x, y) in scatter {
            if x < dims.width && y < dims.height {
                m.mark(x, y);
            }
        }
        m
    });

    let mut out = RgbImage::new(dims.width as u32, dims.height as u32);
    for y in 0..dims.height {
        for x in 0..dims.width {
            let bg = background.get_pixel(x as u32, y as u32).0;
            let mut px = blend([255, 255, 255], bg, opts.background_alpha);

            let (value, color) = match &rebuilt {
                Some(m) => {
                    let v = m.get(x, y) as f32;
                    (v, hot(v))
                }
                None => {
                    let v = field.get(x, y);
                    (v, magma(v))
                }
            };
            px = blend(px, color, opts.overlay_alpha * value);
            out.put_pixel(x as u32, y as u32, image::Rgb(px));
        }
    }

    for &(x, y) in scatter {
        if x < dims.width && y < dims.height {
            let dst = out.get_pixel(x as u32, y as u32).0;
            let px = blend(dst, opts.scatter_color, opts.scatter_alpha);
            out.put_pixel(x as u32, y as u32, image::Rgb(px));
        }
    }

    Ok(OverlayOutcome::Rendered {
        image: out,
        reconciled: reconcile,
    })
}
