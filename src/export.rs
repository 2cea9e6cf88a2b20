//! Writing report tables as CSV.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ReportResult;
use crate::report::Reports;
use crate::types::{render_value, DataSet};

/// Write `dataset` as CSV: one header row, then one line per row with cells rendered by
/// [`render_value`] (nulls as empty cells).
pub fn write_table_csv<W: Write>(dataset: &DataSet, writer: W) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(dataset.schema.field_names())?;
    for row in &dataset.rows {
        wtr.write_record(row.iter().map(render_value))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every table of `reports` to `dir/{name}.csv`, creating `dir` if needed.
///
/// Returns the written paths in report order. Existing files are overwritten.
pub fn write_reports_to_dir(reports: &Reports, dir: impl AsRef<Path>) -> ReportResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(reports.len());
    for table in reports.iter() {
        let path = dir.join(format!("{}.csv", table.name()));
        let file = fs::File::create(&path)?;
        write_table_csv(table.data(), file)?;
        tracing::debug!(path = %path.display(), rows = table.data().row_count(), "wrote report");
        written.push(path);
    }
    Ok(written)
}
