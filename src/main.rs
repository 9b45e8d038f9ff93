use gaze_mapper::config;
use gaze_mapper::pipeline::process_source;
use log::warn;
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "gaze_mapper".to_string());
    let config = config::parse_cli(&program, env::args().skip(1))?;

    let sources = collect_sources(&config.telemetry)?;
    if sources.is_empty() {
        return Err(format!(
            "No telemetry tables found under {}",
            config.telemetry.display()
        ));
    }

    let mut processed_any = false;
    for source in &sources {
        match process_source(source, &config) {
            Ok(report) => {
                let processed = report
                    .images
                    .iter()
                    .filter(|i| i.is_processed())
                    .count();
                println!(
                    "{}: {} rows, {}/{} images processed",
                    source.display(),
                    report.rows.seen,
                    processed,
                    report.images.len()
                );
                processed_any |= report.processed_any();
            }
            Err(err) => warn!("Skipping source {}: {err}", source.display()),
        }
    }

    if !processed_any {
        return Err("No stimulus image was fully processed".to_string());
    }
    Ok(())
}

/// A single CSV file, or every `*.csv` directly under a directory, sorted
/// so artifact and log order is deterministic.
fn collect_sources(path: &Path) -> Result<Vec<PathBuf>, String> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let entries = std::fs::read_dir(path)
        .map_err(|e| format!("Failed to read telemetry dir {}: {e}", path.display()))?;
    let mut sources: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    sources.sort();
    Ok(sources)
}
