mod common;

use common::{batch, reference_dims, sample, temp_workspace};
use gaze_mapper::config::RunConfig;
use gaze_mapper::density::synthesize;
use gaze_mapper::image_io::load_matrix;
use gaze_mapper::pipeline::process_source;
use gaze_mapper::raster::rasterize;
use gaze_mapper::render::{render_overlay, OverlayOutcome, RenderOptions};
use gaze_mapper::types::{GazeMatrix, StimulusRect, TelemetryBatch};
use image::RgbImage;
use std::fs;

#[test]
fn single_sample_maps_to_the_expected_cell() {
    let _ = env_logger::builder().is_test(true).try_init();
    // Rect {left:100, top:50, 200x100}, image 400x200, sample at the rect
    // center -> relative fraction (0.5, 0.5) -> pixel (200, 100).
    let (matrix, stats) = rasterize(&batch(vec![sample(200.0, 100.0)]));
    let matrix = matrix.expect("valid batch");

    assert_eq!(stats.accepted, 1);
    assert_eq!(matrix.get(200, 100), 1);
    assert_eq!(matrix.occupied_count(), 1, "all other cells must stay 0");

    let field = synthesize(&matrix, 15.0);
    assert_eq!(field.max_value(), 1.0);

    let bg = RgbImage::new(400, 200);
    let outcome = render_overlay(
        &matrix,
        &matrix.occupied_cells(),
        &field,
        &bg,
        &RenderOptions::default(),
    )
    .expect("render");
    assert!(
        !outcome.was_reconciled(),
        "reconciliation firing is a defect signal"
    );
}

#[test]
fn sample_outside_the_rect_is_rejected_not_clamped() {
    // (50, 50) is left of the rectangle: relative fraction x = -0.25.
    let (matrix, stats) = rasterize(&batch(vec![sample(50.0, 50.0)]));
    let matrix = matrix.expect("valid batch");
    assert_eq!(stats.accepted, 0);
    assert_eq!(stats.out_of_bounds, 1);
    assert_eq!(matrix.occupied_count(), 0);
}

#[test]
fn zero_width_rect_produces_no_matrix_and_renderer_skips() {
    let mut b = batch(vec![sample(200.0, 100.0)]);
    b.rect.width = 0.0;
    let (matrix, stats) = rasterize(&b);
    assert!(matrix.is_none());
    assert_eq!(stats.total, 1);

    let empty = GazeMatrix {
        w: 0,
        h: 0,
        data: Vec::new(),
    };
    let field = gaze_mapper::types::DensityField::new(0, 0);
    let outcome = render_overlay(
        &empty,
        &[],
        &field,
        &RgbImage::new(0, 0),
        &RenderOptions::default(),
    )
    .expect("must not raise");
    assert!(matches!(outcome, OverlayOutcome::Skipped));
}

#[test]
fn duplicate_samples_collapse_to_one_cell_and_stay_consistent() {
    let (matrix, stats) = rasterize(&batch(vec![
        sample(200.0, 100.0),
        sample(200.0, 100.0),
        sample(200.0, 100.0),
    ]));
    let matrix = matrix.expect("valid batch");
    assert_eq!(stats.accepted, 3);
    assert_eq!(matrix.occupied_count(), 1);

    let scatter = matrix.occupied_cells();
    assert_eq!(scatter.len(), matrix.occupied_count());

    let field = synthesize(&matrix, 2.0);
    let bg = RgbImage::new(
        reference_dims().width as u32,
        reference_dims().height as u32,
    );
    let outcome =
        render_overlay(&matrix, &scatter, &field, &bg, &RenderOptions::default()).expect("render");
    assert!(!outcome.was_reconciled());
}

#[test]
fn occupancy_sum_equals_unique_accepted_cells() {
    let (matrix, stats) = rasterize(&batch(vec![
        sample(200.0, 100.0),
        sample(200.0, 100.0),
        sample(150.0, 75.0),
        sample(50.0, 50.0),
    ]));
    let matrix = matrix.expect("valid batch");
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.out_of_bounds, 1);
    assert_eq!(matrix.occupied_count(), 2);
}

fn write_stimulus_image(dir: &std::path::Path, name: &str, w: u32, h: u32) {
    let mut img = RgbImage::new(w, h);
    for (i, px) in img.pixels_mut().enumerate() {
        px.0 = [(i % 251) as u8, 128, 64];
    }
    img.save(dir.join(name)).expect("write stimulus image");
}

const TARGETS_JSON: &str = concat!(
    r##"{"#jspsych-image-keyboard-response-stimulus":"##,
    r#"{"x":0,"y":0,"width":8,"height":4,"left":0,"top":0}}"#
);

#[test]
fn full_job_over_a_csv_table_writes_all_artifacts() {
    let _ = env_logger::builder().is_test(true).try_init();
    let root = temp_workspace("e2e");
    let images_dir = root.join("images");
    fs::create_dir_all(&images_dir).expect("images dir");
    write_stimulus_image(&images_dir, "001.jpg", 8, 4);

    let csv_path = root.join("participant_a.csv");
    let mut writer = csv::Writer::from_path(&csv_path).expect("csv writer");
    writer
        .write_record(["original_filename", "webgazer_data", "webgazer_targets"])
        .unwrap();
    // Two usable rows for the same image merge their samples.
    writer
        .write_record([
            "/images/001.jpg",
            r#"[{"x":2,"y":1,"t":10},{"x":6,"y":3,"t":20}]"#,
            TARGETS_JSON,
        ])
        .unwrap();
    writer
        .write_record(["/images/001.jpg", r#"[{"x":2,"y":1,"t":30}]"#, TARGETS_JSON])
        .unwrap();
    // Row with a required field absent: silently rejected.
    writer
        .write_record(["", "[]", TARGETS_JSON])
        .unwrap();
    // Row whose targets contain no known stimulus identifier.
    writer
        .write_record([
            "/images/001.jpg",
            r#"[{"x":1,"y":1,"t":0}]"#,
            r##"{"#some-button":{"x":0,"y":0,"width":8,"height":4,"left":0,"top":0}}"##,
        ])
        .unwrap();
    // Row with broken JSON.
    writer
        .write_record(["/images/001.jpg", "[{broken", TARGETS_JSON])
        .unwrap();
    // Row for an image that does not exist on disk.
    writer
        .write_record(["/images/404.jpg", r#"[{"x":2,"y":1,"t":0}]"#, TARGETS_JSON])
        .unwrap();
    writer.flush().unwrap();
    drop(writer);

    let config = RunConfig {
        telemetry: csv_path.clone(),
        images_dir,
        output_dir: root.join("out"),
        sigma: 1.0,
        ..Default::default()
    };
    let report = process_source(&csv_path, &config).expect("source processes");

    assert_eq!(report.rows.seen, 6);
    assert_eq!(report.rows.used, 3);
    assert_eq!(report.rows.rejected, 1);
    assert_eq!(report.rows.missing_target, 1);
    assert_eq!(report.rows.json_malformed, 1);
    assert!(report.processed_any());

    // 001.jpg processed, 404.jpg skipped as missing.
    assert_eq!(report.images.len(), 2);
    let ok = report.images.iter().find(|i| i.image == "001.jpg").unwrap();
    let missing = report.images.iter().find(|i| i.image == "404.jpg").unwrap();
    assert!(ok.is_processed());
    assert!(!ok.reconciled);
    assert_eq!(ok.raster.total, 3);
    assert_eq!(ok.raster.accepted, 3);
    assert!(!missing.is_processed());

    let out_dir = root.join("out").join("participant_a");
    assert!(out_dir.join("report.json").is_file());
    assert!(out_dir.join("001_heatmap.png").is_file());

    // The duplicate (2, 1) sample counts once in the occupancy grid.
    let matrix = load_matrix(&out_dir.join("001_gaze_matrix.bin")).expect("matrix artifact");
    assert_eq!(matrix.w, 8);
    assert_eq!(matrix.h, 4);
    assert_eq!(matrix.occupied_count(), 2);
    assert_eq!(matrix.get(2, 1), 1);
    assert_eq!(matrix.get(6, 3), 1);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn invalid_rect_skips_the_image_without_artifacts() {
    let root = temp_workspace("invalid_rect");
    let images_dir = root.join("images");
    fs::create_dir_all(&images_dir).expect("images dir");
    write_stimulus_image(&images_dir, "002.jpg", 8, 4);

    let csv_path = root.join("participant_b.csv");
    let mut writer = csv::Writer::from_path(&csv_path).expect("csv writer");
    writer
        .write_record(["original_filename", "webgazer_data", "webgazer_targets"])
        .unwrap();
    writer
        .write_record([
            "/images/002.jpg",
            r#"[{"x":2,"y":1,"t":0}]"#,
            concat!(
                r##"{"#jspsych-image-keyboard-response-stimulus":"##,
                r#"{"x":0,"y":0,"width":0,"height":4,"left":0,"top":0}}"#
            ),
        ])
        .unwrap();
    writer.flush().unwrap();
    drop(writer);

    let config = RunConfig {
        telemetry: csv_path.clone(),
        images_dir,
        output_dir: root.join("out"),
        ..Default::default()
    };
    let report = process_source(&csv_path, &config).expect("source parses");
    assert!(!report.processed_any());
    let img = &report.images[0];
    assert_eq!(img.skipped, Some(gaze_mapper::SkipKind::InvalidRect));
    assert!(!root.join("out/participant_b/002_gaze_matrix.bin").exists());
    assert!(!root.join("out/participant_b/002_heatmap.png").exists());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn legacy_path_column_is_accepted() {
    let root = temp_workspace("legacy");
    let images_dir = root.join("images");
    fs::create_dir_all(&images_dir).expect("images dir");
    write_stimulus_image(&images_dir, "003.jpg", 8, 4);

    let csv_path = root.join("pilot.csv");
    let mut writer = csv::Writer::from_path(&csv_path).expect("csv writer");
    writer
        .write_record(["path", "webgazer_data", "webgazer_targets"])
        .unwrap();
    writer
        .write_record(["/003.jpg", r#"[{"x":4,"y":2,"t":0}]"#, TARGETS_JSON])
        .unwrap();
    writer.flush().unwrap();
    drop(writer);

    let config = RunConfig {
        telemetry: csv_path.clone(),
        images_dir,
        output_dir: root.join("out"),
        sigma: 1.0,
        ..Default::default()
    };
    let report = process_source(&csv_path, &config).expect("legacy source processes");
    assert!(report.processed_any());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn batch_helper_produces_consistent_fixture() {
    // Guards the shared fixture against drift: the reference rect must
    // stay valid and aligned with the reference dimensions.
    let b: TelemetryBatch = batch(vec![]);
    let r: StimulusRect = b.rect;
    assert!(r.is_valid());
    assert_eq!(b.dims.width, 2 * r.width as usize);
    assert_eq!(b.dims.height, 2 * r.height as usize);
}
