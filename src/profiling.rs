//! Data-quality profile of a dataset: missingness, cardinality, types and duplicates.
//!
//! Works on raw or cleaned data. Numeric summaries are only produced for columns whose logical
//! type is numeric, so profile a cleaned dataset to see them.

use std::collections::HashSet;

use crate::aggregation::summary::{summarize_values, ColumnSummary};
use crate::cleaning::count_duplicates;
use crate::report::ReportTable;
use crate::types::{round_to, DataSet, DataType, Field, Schema, Value, ValueKey};

/// Profile of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DataProfile {
    pub rows: usize,
    /// Percent of null cells per column, 2 decimals, highest first.
    pub missing_percent: Vec<(String, f64)>,
    /// Distinct non-null values per column, highest first.
    pub unique_counts: Vec<(String, usize)>,
    /// Logical type per column, in schema order.
    pub dtypes: Vec<(String, DataType)>,
    pub duplicate_rows: usize,
    /// Summary per numeric column, in schema order; `None` when the column is all null.
    pub numeric_summary: Vec<(String, Option<ColumnSummary>)>,
}

/// Compute the profile of `dataset`.
pub fn profile(dataset: &DataSet) -> DataProfile {
    let rows = dataset.row_count();
    let fields = &dataset.schema.fields;

    let mut missing_percent: Vec<(String, f64)> = fields
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            let nulls = dataset.column(idx).filter(|v| v.is_null()).count();
            let pct = if rows == 0 {
                0.0
            } else {
                round_to(nulls as f64 / rows as f64 * 100.0, 2)
            };
            (f.name.clone(), pct)
        })
        .collect();
    missing_percent.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut unique_counts: Vec<(String, usize)> = fields
        .iter()
        .enumerate()
        .map(|(idx, f)| {
            let distinct: HashSet<ValueKey> = dataset
                .column(idx)
                .filter(|v| !v.is_null())
                .map(Value::key)
                .collect();
            (f.name.clone(), distinct.len())
        })
        .collect();
    unique_counts.sort_by(|a, b| b.1.cmp(&a.1));

    let numeric_summary = fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.data_type.is_numeric())
        .map(|(idx, f)| {
            let values = dataset.numeric_values(idx);
            (f.name.clone(), summarize_values(&values, 0.5))
        })
        .collect();

    DataProfile {
        rows,
        missing_percent,
        unique_counts,
        dtypes: fields.iter().map(|f| (f.name.clone(), f.data_type)).collect(),
        duplicate_rows: count_duplicates(dataset),
        numeric_summary,
    }
}

impl DataProfile {
    /// Render as report tables: `missing_percent`, `unique_counts`, `dtypes`, `numeric_summary`.
    pub fn to_tables(&self) -> Vec<ReportTable> {
        let column = || Field::new("column", DataType::Utf8);

        let missing = DataSet::new(
            Schema::new(vec![column(), Field::new("missing_percent", DataType::Float64)]),
            self.missing_percent
                .iter()
                .map(|(c, p)| vec![Value::text(c.clone()), Value::Float64(*p)])
                .collect(),
        );
        let unique = DataSet::new(
            Schema::new(vec![column(), Field::new("unique_count", DataType::Int64)]),
            self.unique_counts
                .iter()
                .map(|(c, n)| vec![Value::text(c.clone()), Value::Int64(*n as i64)])
                .collect(),
        );
        let dtypes = DataSet::new(
            Schema::new(vec![column(), Field::new("dtype", DataType::Utf8)]),
            self.dtypes
                .iter()
                .map(|(c, t)| vec![Value::text(c.clone()), Value::text(t.name())])
                .collect(),
        );

        let stat = |s: &Option<ColumnSummary>, f: fn(&ColumnSummary) -> f64| {
            s.as_ref().map(|s| Value::Float64(f(s))).unwrap_or(Value::Null)
        };
        let numeric = DataSet::new(
            Schema::new(vec![
                column(),
                Field::new("count", DataType::Int64),
                Field::new("mean", DataType::Float64),
                Field::new("min", DataType::Float64),
                Field::new("max", DataType::Float64),
                Field::new("median", DataType::Float64),
            ]),
            self.numeric_summary
                .iter()
                .map(|(c, s)| {
                    vec![
                        Value::text(c.clone()),
                        Value::Int64(s.as_ref().map_or(0, |s| s.count as i64)),
                        stat(s, |s| s.mean),
                        stat(s, |s| s.min),
                        stat(s, |s| s.max),
                        stat(s, |s| s.median),
                    ]
                })
                .collect(),
        );

        vec![
            ReportTable::new("missing_percent", missing),
            ReportTable::new("unique_counts", unique),
            ReportTable::new("dtypes", dtypes),
            ReportTable::new("numeric_summary", numeric),
        ]
    }
}
