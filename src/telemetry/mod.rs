//! Telemetry ingestion: CSV rows -> normalized per-image batches.
//!
//! The geometry/column conventions changed across data-collection phases,
//! so the row format is resolved once per table from the CSV header and
//! the rest of the pipeline only ever sees normalized [`ParsedRow`] and
//! accumulator values, never raw row shapes.

mod batch;
mod row;

pub use batch::{BatchBuilder, ImageAccumulator};
pub use row::{parse_row, ColumnMap, ParsedRow, RowFormat, RowOutcome};
