//! CSV tokenization of task logs.
//!
//! Rows are passed through untouched: field-count and timestamp problems are
//! left for the reconciler to report as diagnostics. Only failures to open or
//! tokenize the file at all are errors here.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tl_core::RawRecord;

/// Reads every row of the CSV log at `path`.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_records_from(file).with_context(|| format!("failed to read {}", path.display()))
}

/// Reads every CSV row from `reader`.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV parse error at row {}", idx + 1))?;
        let line = row.position().map_or(idx as u64 + 1, csv::Position::line);
        records.push(RawRecord::new(line, row.iter()));
    }

    tracing::debug!(record_count = records.len(), "tokenized log");
    Ok(records)
}
