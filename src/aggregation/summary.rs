//! Scalar summary statistics over a single numeric column.

use crate::error::{ReportError, ReportResult};
use crate::types::{round3, DataSet};

/// Summary of the non-null values of one column. All floats are rounded to 3 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    /// Number of non-null numeric values.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// The requested percentile, as a fraction in `[0, 1]`.
    pub q: f64,
    /// Value at percentile `q`.
    pub percentile: f64,
}

/// Statistics that can be asked of a [`ColumnSummary`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryStat {
    Count,
    Mean,
    Median,
    Min,
    Max,
    /// Percentile at the given fraction; `None` uses the configured default.
    Percentile(Option<f64>),
}

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (mean of the two middle values for even sizes); `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 0.5)
}

/// Percentile with linear interpolation between closest ranks.
///
/// `q` is clamped to `[0, 1]`. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let q = q.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let (a, b) = (sorted[lo], sorted[hi]);
    Some(a + (h - lo as f64) * (b - a))
}

/// Summarize the numeric values of `column` at percentile `q`.
///
/// Returns `Ok(None)` if the column has no non-null numeric values.
///
/// # Errors
///
/// [`ReportError::MissingColumn`] if `column` is not in the dataset.
pub fn summarize(dataset: &DataSet, column: &str, q: f64) -> ReportResult<Option<ColumnSummary>> {
    let idx = dataset
        .schema
        .index_of(column)
        .ok_or_else(|| ReportError::missing_column(column))?;
    let values = dataset.numeric_values(idx);
    Ok(summarize_values(&values, q))
}

/// Summarize a slice of values at percentile `q`; `None` if it is empty.
pub fn summarize_values(values: &[f64], q: f64) -> Option<ColumnSummary> {
    let mean = mean(values)?;
    let median = median(values)?;
    let percentile = percentile(values, q)?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(ColumnSummary {
        count: values.len(),
        mean: round3(mean),
        median: round3(median),
        min: round3(min),
        max: round3(max),
        q,
        percentile: round3(percentile),
    })
}

impl ColumnSummary {
    /// Read one statistic. `Percentile(Some(q))` with a different `q` than the summary was
    /// built with is not recomputed; use [`summarize`] with that `q` instead.
    pub fn get(&self, stat: SummaryStat) -> f64 {
        match stat {
            SummaryStat::Count => self.count as f64,
            SummaryStat::Mean => self.mean,
            SummaryStat::Median => self.median,
            SummaryStat::Min => self.min,
            SummaryStat::Max => self.max,
            SummaryStat::Percentile(_) => self.percentile,
        }
    }
}
