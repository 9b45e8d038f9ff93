//! Per-row parsing of the telemetry table.

use crate::types::{RawGazeSample, StimulusRect};
use csv::StringRecord;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column convention of a telemetry table, resolved from its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowFormat {
    /// Current collection phase: `original_filename` column.
    Current,
    /// Early collection phase: stimulus path under a `path` column.
    Legacy,
}

/// Resolved column indices for one table.
#[derive(Clone, Copy, Debug)]
pub struct ColumnMap {
    pub format: RowFormat,
    filename: usize,
    data: usize,
    targets: usize,
}

impl ColumnMap {
    /// Detect the row format from a CSV header record.
    pub fn detect(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let (format, filename) = if let Some(i) = find("original_filename") {
            (RowFormat::Current, i)
        } else if let Some(i) = find("path") {
            (RowFormat::Legacy, i)
        } else {
            return Err("No stimulus filename column (original_filename or path)".to_string());
        };
        let data = find("webgazer_data")
            .ok_or_else(|| "No webgazer_data column in telemetry header".to_string())?;
        let targets = find("webgazer_targets")
            .ok_or_else(|| "No webgazer_targets column in telemetry header".to_string())?;
        Ok(Self {
            format,
            filename,
            data,
            targets,
        })
    }
}

/// One telemetry row normalized for accumulation.
#[derive(Clone, Debug)]
pub struct ParsedRow {
    /// Stimulus image key: the base file name of the referenced image.
    pub image_key: String,
    /// Raw samples; entries whose coordinates failed to parse are carried
    /// as non-finite samples so the rasterizer tallies them uniformly.
    pub samples: Vec<RawGazeSample>,
    pub targets: BTreeMap<String, StimulusRect>,
}

/// Outcome of parsing one record.
#[derive(Debug)]
pub enum RowOutcome {
    Parsed(ParsedRow),
    /// A required field was absent/null: irrelevant row (e.g. a
    /// non-stimulus trial phase). Silent skip.
    Rejected,
    /// `webgazer_data` or `webgazer_targets` was present but unparsable.
    JsonMalformed,
}

fn field_present(value: Option<&str>) -> Option<&str> {
    let v = value?.trim();
    if v.is_empty() || v == "NA" || v == "null" {
        return None;
    }
    Some(v)
}

/// Base file name of a stimulus path (`/images/001.jpg` -> `001.jpg`).
fn image_key_of(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or(path).to_string()
}

/// Parse one CSV record against the resolved column map.
pub fn parse_row(record: &StringRecord, cols: &ColumnMap) -> RowOutcome {
    let Some(filename) = field_present(record.get(cols.filename)) else {
        return RowOutcome::Rejected;
    };
    let Some(data_json) = field_present(record.get(cols.data)) else {
        return RowOutcome::Rejected;
    };
    let Some(targets_json) = field_present(record.get(cols.targets)) else {
        return RowOutcome::Rejected;
    };
    let image_key = image_key_of(filename);

    let raw_samples: Vec<Value> = match serde_json::from_str(data_json) {
        Ok(v) => v,
        Err(e) => {
            warn!("row for {image_key}: webgazer_data malformed: {e}");
            return RowOutcome::JsonMalformed;
        }
    };
    let targets: BTreeMap<String, StimulusRect> = match serde_json::from_str(targets_json) {
        Ok(v) => v,
        Err(e) => {
            warn!("row for {image_key}: webgazer_targets malformed: {e}");
            return RowOutcome::JsonMalformed;
        }
    };

    let mut samples = Vec::with_capacity(raw_samples.len());
    for raw in raw_samples {
        match serde_json::from_value::<RawGazeSample>(raw.clone()) {
            Ok(s) => samples.push(s),
            Err(_) => {
                warn!("row for {image_key}: malformed gaze sample: {raw}");
                samples.push(RawGazeSample {
                    x: f64::NAN,
                    y: f64::NAN,
                    t: 0.0,
                });
            }
        }
    }

    debug!(
        "row for {image_key}: {} samples, {} targets",
        samples.len(),
        targets.len()
    );
    RowOutcome::Parsed(ParsedRow {
        image_key,
        samples,
        targets,
    })
}
