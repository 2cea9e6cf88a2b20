//! Aggregations over a cleaned [`crate::types::DataSet`].
//!
//! - [`summary`]: count/mean/median/percentile of one numeric column
//! - [`frequency`]: top-N label counts of one categorical column
//! - [`grouped`]: per-partition means and counts over one or more key columns
//!
//! Empty inputs never raise and never produce NaN: summaries come back as `None` and grouped
//! means of partitions without numeric values come back as `Null`.
//!
//! ```rust
//! use rust_data_reports::aggregation::{grouped_mean, GroupSort};
//! use rust_data_reports::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let ds = DataSet::new(
//!     Schema::new(vec![
//!         Field::new("state", DataType::Utf8),
//!         Field::new("csat_score", DataType::Float64),
//!     ]),
//!     vec![
//!         vec![Value::text("ca"), Value::Float64(4.0)],
//!         vec![Value::text("ca"), Value::Float64(5.0)],
//!         vec![Value::Null, Value::Float64(1.0)],
//!     ],
//! );
//! let out = grouped_mean(
//!     &ds,
//!     &["state"],
//!     "csat_score",
//!     "avg_csat",
//!     "tickets",
//!     GroupSort::Ascending("avg_csat".to_string()),
//! )
//! .unwrap();
//! assert_eq!(out.rows, vec![vec![Value::text("ca"), Value::Float64(4.5), Value::Int64(2)]]);
//! ```

pub mod frequency;
pub mod grouped;
pub mod summary;

pub use frequency::{frequency_table, value_counts};
pub use grouped::{
    counts_with_group_share, grouped_mean, partition, Aggregation, GroupSort, GroupedAggregate,
};
pub use summary::{mean, median, percentile, summarize, summarize_values, ColumnSummary, SummaryStat};
