//! Optional removal of all-null rows and columns.

use crate::types::DataSet;

/// Drop rows in which every cell is null.
pub fn drop_empty_rows(dataset: &DataSet) -> DataSet {
    dataset.filter_rows(|row| row.iter().any(|v| !v.is_null()))
}

/// Drop columns in which every cell is null.
///
/// A dataset with no rows keeps all of its columns.
pub fn drop_empty_columns(dataset: &DataSet) -> DataSet {
    if dataset.row_count() == 0 {
        return dataset.clone();
    }
    let keep: Vec<usize> = (0..dataset.column_count())
        .filter(|&i| dataset.column(i).any(|v| !v.is_null()))
        .collect();
    dataset.select_columns(&keep)
}
