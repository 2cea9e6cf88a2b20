//! Resolution of nulls left in numeric columns.
//!
//! See [`NullPolicy`] for the two strategies. They are never combined.

use crate::aggregation::summary::median;
use crate::config::NullPolicy;
use crate::types::{DataSet, Value};

/// Output of [`apply_null_policy`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNulls {
    pub dataset: DataSet,
    /// Rows dropped by [`NullPolicy::Strict`].
    pub rows_dropped: usize,
    /// Cells filled by [`NullPolicy::Impute`].
    pub values_imputed: usize,
}

/// Apply `policy` to every numeric column of `dataset`.
pub fn apply_null_policy(dataset: &DataSet, policy: NullPolicy) -> ResolvedNulls {
    match policy {
        NullPolicy::Strict => drop_null_rows(dataset),
        NullPolicy::Impute => impute_medians(dataset),
    }
}

fn numeric_columns(dataset: &DataSet) -> Vec<usize> {
    dataset
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.data_type.is_numeric())
        .map(|(i, _)| i)
        .collect()
}

fn drop_null_rows(dataset: &DataSet) -> ResolvedNulls {
    let numeric = numeric_columns(dataset);
    let out = dataset.filter_rows(|row| {
        numeric
            .iter()
            .all(|&i| row.get(i).is_some_and(|v| !v.is_null()))
    });
    ResolvedNulls {
        rows_dropped: dataset.row_count() - out.row_count(),
        dataset: out,
        values_imputed: 0,
    }
}

fn impute_medians(dataset: &DataSet) -> ResolvedNulls {
    let numeric = numeric_columns(dataset);
    // Medians come from the input only, never from already-filled cells.
    let fills: Vec<(usize, f64)> = numeric
        .iter()
        .map(|&i| (i, median(&dataset.numeric_values(i)).unwrap_or(0.0)))
        .collect();

    let mut values_imputed = 0usize;
    let out = dataset.map_rows(|row| {
        let mut out = row.to_vec();
        for &(i, fill) in &fills {
            if let Some(cell) = out.get_mut(i) {
                if cell.is_null() {
                    *cell = Value::Float64(fill);
                    values_imputed += 1;
                }
            }
        }
        out
    });

    ResolvedNulls {
        dataset: out,
        rows_dropped: 0,
        values_imputed,
    }
}
