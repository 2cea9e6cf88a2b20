//! Grouped (single- and multi-key) aggregates.
//!
//! Rows are partitioned by their [`GroupKey`]; rows with a null in any key column are left out
//! of every partition. Each partition becomes one output row: the key values followed by one
//! column per [`Aggregation`].

use std::collections::HashMap;

use rayon::prelude::*;

use crate::aggregation::summary::mean;
use crate::error::{ReportError, ReportResult};
use crate::types::{compare_values, round3, DataSet, DataType, Field, GroupKey, Schema, Value};

/// One aggregate column of a grouped result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    /// Mean of the non-null numeric values of `column`, rounded to 3 decimals; `Null` when the
    /// partition has none.
    Mean { column: String, label: String },
    /// Number of rows in the partition.
    Count { label: String },
}

impl Aggregation {
    pub fn mean(column: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Mean {
            column: column.into(),
            label: label.into(),
        }
    }

    pub fn count(label: impl Into<String>) -> Self {
        Self::Count {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Mean { label, .. } | Self::Count { label } => label,
        }
    }

    fn data_type(&self) -> DataType {
        match self {
            Self::Mean { .. } => DataType::Float64,
            Self::Count { .. } => DataType::Int64,
        }
    }
}

/// Row order of a grouped result. Sorts are stable: ties keep first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupSort {
    /// Partitions in the order their key first appears.
    #[default]
    FirstSeen,
    /// Ascending by key columns.
    Keys,
    /// Ascending by the named output column (nulls last).
    Ascending(String),
    /// Descending by the named output column (nulls last).
    Descending(String),
}

/// Declarative description of a grouped aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedAggregate {
    pub keys: Vec<String>,
    pub aggregations: Vec<Aggregation>,
    pub sort: GroupSort,
}

impl GroupedAggregate {
    /// Group by `keys` with no aggregates yet.
    pub fn by<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            aggregations: Vec::new(),
            sort: GroupSort::default(),
        }
    }

    pub fn mean(mut self, column: impl Into<String>, label: impl Into<String>) -> Self {
        self.aggregations.push(Aggregation::mean(column, label));
        self
    }

    pub fn count(mut self, label: impl Into<String>) -> Self {
        self.aggregations.push(Aggregation::count(label));
        self
    }

    pub fn sort(mut self, sort: GroupSort) -> Self {
        self.sort = sort;
        self
    }

    /// Every input column this aggregate reads.
    pub fn required_columns(&self) -> Vec<String> {
        let mut cols = self.keys.clone();
        for agg in &self.aggregations {
            if let Aggregation::Mean { column, .. } = agg {
                if !cols.contains(column) {
                    cols.push(column.clone());
                }
            }
        }
        cols
    }

    /// Output schema; key types are taken from `dataset` when it has the key column.
    pub fn output_schema(&self, dataset: Option<&DataSet>) -> Schema {
        let mut fields: Vec<Field> = self
            .keys
            .iter()
            .map(|k| {
                let dt = dataset
                    .and_then(|ds| ds.schema.field(k))
                    .map(|f| f.data_type)
                    .unwrap_or(DataType::Utf8);
                Field::new(k.clone(), dt)
            })
            .collect();
        fields.extend(
            self.aggregations
                .iter()
                .map(|a| Field::new(a.label(), a.data_type())),
        );
        Schema::new(fields)
    }

    /// Evaluate against `dataset`.
    ///
    /// With `parallel` set, partitions are aggregated on the rayon pool; the output is identical
    /// to the sequential path.
    ///
    /// # Errors
    ///
    /// [`ReportError::MissingColumn`] if a key or aggregated column is absent.
    pub fn run(&self, dataset: &DataSet, parallel: bool) -> ReportResult<DataSet> {
        let key_idxs = column_indexes(dataset, &self.keys)?;
        let aggs = self
            .aggregations
            .iter()
            .map(|a| match a {
                Aggregation::Mean { column, .. } => dataset
                    .schema
                    .index_of(column)
                    .map(Some)
                    .ok_or_else(|| ReportError::missing_column(column)),
                Aggregation::Count { .. } => Ok(None),
            })
            .collect::<ReportResult<Vec<Option<usize>>>>()?;

        let parts = partition(dataset, &key_idxs);
        let eval = |(key, members): &(GroupKey, Vec<usize>)| -> Vec<Value> {
            let mut row: Vec<Value> = key.iter().map(|k| k.to_value()).collect();
            row.extend(aggs.iter().map(|target| match target {
                Some(idx) => {
                    let values: Vec<f64> = members
                        .iter()
                        .filter_map(|&r| dataset.rows.get(r)?.get(*idx)?.as_f64())
                        .collect();
                    mean(&values).map(|m| Value::Float64(round3(m))).unwrap_or(Value::Null)
                }
                None => Value::Int64(members.len() as i64),
            }));
            row
        };

        let rows: Vec<Vec<Value>> = if parallel {
            parts.par_iter().map(eval).collect()
        } else {
            parts.iter().map(eval).collect()
        };

        let schema = self.output_schema(Some(dataset));
        let mut out = DataSet::new(schema, rows);
        sort_rows(&mut out, &self.sort, self.keys.len());
        Ok(out)
    }
}

fn column_indexes(dataset: &DataSet, names: &[String]) -> ReportResult<Vec<usize>> {
    names
        .iter()
        .map(|n| {
            dataset
                .schema
                .index_of(n)
                .ok_or_else(|| ReportError::missing_column(n))
        })
        .collect()
}

/// Split row indexes into partitions by the values at `key_idxs`, in first-seen order.
///
/// Rows with a null key component are excluded.
pub fn partition(dataset: &DataSet, key_idxs: &[usize]) -> Vec<(GroupKey, Vec<usize>)> {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut parts: Vec<(GroupKey, Vec<usize>)> = Vec::new();
    for (r, row) in dataset.rows.iter().enumerate() {
        let key: GroupKey = key_idxs
            .iter()
            .map(|&i| row.get(i).unwrap_or(&Value::Null).key())
            .collect();
        if key.iter().any(|k| k.is_null()) {
            continue;
        }
        match slots.get(&key) {
            Some(&slot) => parts[slot].1.push(r),
            None => {
                slots.insert(key.clone(), parts.len());
                parts.push((key, vec![r]));
            }
        }
    }
    parts
}

fn sort_rows(out: &mut DataSet, sort: &GroupSort, n_keys: usize) {
    match sort {
        GroupSort::FirstSeen => {}
        GroupSort::Keys => out.rows.sort_by(|a, b| {
            a.iter()
                .zip(b.iter())
                .take(n_keys)
                .map(|(x, y)| compare_values(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        GroupSort::Ascending(col) | GroupSort::Descending(col) => {
            let Some(idx) = out.schema.index_of(col) else {
                return;
            };
            let descending = matches!(sort, GroupSort::Descending(_));
            out.rows.sort_by(|a, b| {
                let (x, y) = (&a[idx], &b[idx]);
                match (x.is_null(), y.is_null(), descending) {
                    (false, false, true) => compare_values(y, x),
                    _ => compare_values(x, y),
                }
            });
        }
    }
}

/// Mean of `target` and row count per partition of `keys`.
pub fn grouped_mean(
    dataset: &DataSet,
    keys: &[&str],
    target: &str,
    mean_label: &str,
    count_label: &str,
    sort: GroupSort,
) -> ReportResult<DataSet> {
    GroupedAggregate::by(keys.iter().copied())
        .mean(target, mean_label)
        .count(count_label)
        .sort(sort)
        .run(dataset, false)
}

/// Row counts per (`group`, `category`) pair with each pair's share of its group.
///
/// Output columns: `group`, `category`, `count`, `total`, `percent`, where `total` counts every
/// row of the group (including rows whose category is null) and
/// `percent = count / total * 100`, rounded to 3 decimals. Rows are ordered by key.
///
/// # Errors
///
/// [`ReportError::MissingColumn`] if either column is absent.
pub fn counts_with_group_share(
    dataset: &DataSet,
    group: &str,
    category: &str,
) -> ReportResult<DataSet> {
    let counts = GroupedAggregate::by([group, category])
        .count("count")
        .sort(GroupSort::Keys)
        .run(dataset, false)?;
    let totals = GroupedAggregate::by([group]).count("total").run(dataset, false)?;
    let totals: HashMap<_, i64> = totals
        .rows
        .iter()
        .filter_map(|r| match (r.first(), r.get(1)) {
            (Some(k), Some(Value::Int64(t))) => Some((k.key(), *t)),
            _ => None,
        })
        .collect();

    let mut fields = counts.schema.fields.clone();
    fields.push(Field::new("total", DataType::Int64));
    fields.push(Field::new("percent", DataType::Float64));

    let rows = counts
        .rows
        .iter()
        .map(|r| {
            let total = r.first().and_then(|k| totals.get(&k.key())).copied().unwrap_or(0);
            let count = r.get(2).and_then(Value::as_f64).unwrap_or(0.0);
            let percent = if total > 0 {
                Value::Float64(round3(count / total as f64 * 100.0))
            } else {
                Value::Null
            };
            let mut out = r.clone();
            out.push(Value::Int64(total));
            out.push(percent);
            out
        })
        .collect();
    Ok(DataSet::new(Schema::new(fields), rows))
}
