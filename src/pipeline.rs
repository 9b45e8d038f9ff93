//! Per-source orchestration.
//!
//! One telemetry source at a time, one stimulus image at a time, fully
//! sequential: batch build -> rasterize -> smooth -> render -> persist.
//! Every failure is scoped to one sample, one row, or one image and never
//! aborts the run; the per-source [`RunReport`] records what happened.

use crate::config::RunConfig;
use crate::density;
use crate::diagnostics::{ImageReport, RowCounts, RunReport, SkipKind};
use crate::image_io::{
    dimensions_of, load_rgb_image, save_matrix, save_overlay, write_json_file,
};
use crate::raster::rasterize;
use crate::render::{render_overlay, OverlayOutcome, RenderOptions};
use crate::target::resolve_target;
use crate::telemetry::{parse_row, BatchBuilder, ColumnMap, ImageAccumulator, RowOutcome};
use crate::types::TelemetryBatch;
use log::{debug, info, warn};
use std::path::Path;
use std::time::Instant;

/// Process one telemetry table end to end.
///
/// Artifacts and the JSON report land under
/// `<output_dir>/<source stem>/`. Only unusable inputs at the source level
/// (unreadable file, unrecognizable header) are `Err`; everything below
/// that is recorded in the report.
pub fn process_source(csv_path: &Path, config: &RunConfig) -> Result<RunReport, String> {
    let total_start = Instant::now();
    let source_stem = csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Unusable telemetry path {}", csv_path.display()))?
        .to_string();
    let out_dir = config.output_dir.join(&source_stem);

    let mut reader = csv::Reader::from_path(csv_path)
        .map_err(|e| format!("Failed to open telemetry {}: {e}", csv_path.display()))?;
    let headers = reader
        .headers()
        .map_err(|e| format!("Failed to read header of {}: {e}", csv_path.display()))?
        .clone();
    let cols = ColumnMap::detect(&headers)
        .map_err(|e| format!("{}: {e}", csv_path.display()))?;
    debug!("{}: detected {:?} row format", csv_path.display(), cols.format);

    let mut rows = RowCounts::default();
    let mut builder = BatchBuilder::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: unreadable record: {e}", csv_path.display());
                rows.seen += 1;
                rows.rejected += 1;
                continue;
            }
        };
        rows.seen += 1;
        match parse_row(&record, &cols) {
            RowOutcome::Rejected => rows.rejected += 1,
            RowOutcome::JsonMalformed => rows.json_malformed += 1,
            RowOutcome::Parsed(row) => {
                if !config.wants_image(&row.image_key) {
                    debug!("{}: filtered out", row.image_key);
                    continue;
                }
                match resolve_target(&row.targets) {
                    None => {
                        warn!("{}: no known stimulus element in targets", row.image_key);
                        rows.missing_target += 1;
                    }
                    Some(rect) => {
                        builder.add(&row.image_key, row.samples, *rect);
                        rows.used += 1;
                    }
                }
            }
        }
    }

    let mut images = Vec::new();
    for (image_key, acc) in builder.finish() {
        images.push(process_image(&image_key, acc, config, &out_dir));
    }

    let report = RunReport {
        source: csv_path.to_path_buf(),
        rows,
        images,
        total_ms: total_start.elapsed().as_secs_f64() * 1000.0,
    };
    write_json_file(&out_dir.join("report.json"), &report)?;
    info!(
        "{}: {} rows ({} used), {}/{} images processed in {:.1} ms",
        csv_path.display(),
        report.rows.seen,
        report.rows.used,
        report.images.iter().filter(|i| i.is_processed()).count(),
        report.images.len(),
        report.total_ms
    );
    Ok(report)
}

fn process_image(
    image_key: &str,
    acc: ImageAccumulator,
    config: &RunConfig,
    out_dir: &Path,
) -> ImageReport {
    let image_path = config.images_dir.join(image_key);
    let background = match load_rgb_image(&image_path) {
        Ok(img) => img,
        Err(e) => {
            warn!("{image_key}: stimulus image unavailable: {e}");
            return ImageReport::skipped(image_key, SkipKind::ImageMissing);
        }
    };
    let dims = dimensions_of(&background);

    let batch = TelemetryBatch {
        samples: acc.samples,
        rect: acc.rect,
        dims,
    };

    let raster_start = Instant::now();
    let (matrix, stats) = rasterize(&batch);
    let raster_ms = raster_start.elapsed().as_secs_f64() * 1000.0;

    let Some(matrix) = matrix else {
        let mut report = ImageReport::skipped(image_key, SkipKind::InvalidRect);
        report.width = dims.width;
        report.height = dims.height;
        report.raster = stats;
        report.raster_ms = raster_ms;
        return report;
    };

    let density_start = Instant::now();
    let field = density::synthesize(&matrix, config.sigma);
    let density_ms = density_start.elapsed().as_secs_f64() * 1000.0;

    let render_start = Instant::now();
    let opts = RenderOptions {
        background_alpha: config.background_alpha,
        overlay_alpha: config.overlay_alpha,
        ..Default::default()
    };
    let scatter = matrix.occupied_cells();
    let outcome = render_overlay(&matrix, &scatter, &field, &background, &opts);
    let render_ms = render_start.elapsed().as_secs_f64() * 1000.0;

    let mut report = ImageReport {
        image: image_key.to_string(),
        width: dims.width,
        height: dims.height,
        raster: stats,
        skipped: None,
        reconciled: false,
        raster_ms,
        density_ms,
        render_ms,
        matrix_path: None,
        overlay_path: None,
    };

    let rendered = match outcome {
        Ok(OverlayOutcome::Rendered { image, reconciled }) => {
            report.reconciled = reconciled;
            image
        }
        Ok(OverlayOutcome::Skipped) => {
            report.skipped = Some(SkipKind::InvalidRect);
            return report;
        }
        Err(e) => {
            warn!("{image_key}: render failed: {e}");
            return report;
        }
    };

    let stem = Path::new(image_key)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(image_key);
    let matrix_path = out_dir.join(format!("{stem}_gaze_matrix.bin"));
    match save_matrix(&matrix, &matrix_path) {
        Ok(()) => report.matrix_path = Some(matrix_path),
        Err(e) => warn!("{image_key}: {e}"),
    }
    let overlay_path = out_dir.join(format!("{stem}_heatmap.png"));
    match save_overlay(&rendered, &overlay_path) {
        Ok(()) => report.overlay_path = Some(overlay_path),
        Err(e) => warn!("{image_key}: {e}"),
    }

    info!(
        "{image_key}: {}x{}, accepted {}/{} samples, occupied {} cells{}",
        dims.width,
        dims.height,
        report.raster.accepted,
        report.raster.total,
        matrix.occupied_count(),
        if report.reconciled {
            " (reconciled)"
        } else {
            ""
        }
    );
    report
}
