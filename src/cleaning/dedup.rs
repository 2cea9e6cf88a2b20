//! Exact-duplicate row removal.

use std::collections::HashSet;

use crate::types::{DataSet, Value, ValueKey};

/// Hashable key for a whole row (null positions included).
pub fn row_key(row: &[Value]) -> Vec<ValueKey> {
    row.iter().map(Value::key).collect()
}

/// Remove rows that repeat an earlier row cell-for-cell.
///
/// The first occurrence is kept and relative order is preserved, so running this twice is a
/// no-op.
pub fn deduplicate(dataset: &DataSet) -> DataSet {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(dataset.row_count());
    dataset.filter_rows(|row| seen.insert(row_key(row)))
}

/// Number of rows that [`deduplicate`] would drop.
pub fn count_duplicates(dataset: &DataSet) -> usize {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(dataset.row_count());
    dataset
        .rows
        .iter()
        .filter(|row| !seen.insert(row_key(row)))
        .count()
}
