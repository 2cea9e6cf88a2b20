//! Raw CSV reading.

use std::path::Path;

use crate::error::ReportResult;
use crate::types::{DataSet, Schema, Value};

/// Read a CSV file into a raw [`DataSet`].
///
/// Rules:
///
/// - The first record is the header row; header names are kept exactly as written.
/// - Every cell is read as [`Value::Utf8`], verbatim. Typing and null handling belong to the
///   cleaning pipeline.
/// - Short records are padded with [`Value::Null`]; extra trailing cells are ignored.
pub fn read_raw_csv_from_path(path: impl AsRef<Path>) -> ReportResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    read_raw_csv_from_reader(&mut rdr)
}

/// Read raw CSV data from an existing CSV reader.
pub fn read_raw_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> ReportResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let schema = Schema::utf8(headers.iter());
    let width = schema.fields.len();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = (0..width)
            .map(|i| record.get(i).map(Value::text).unwrap_or(Value::Null))
            .collect();
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), columns = width, "read raw csv");
    Ok(DataSet::new(schema, rows))
}
