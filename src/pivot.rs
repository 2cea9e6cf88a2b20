//! Long-to-wide reshaping of grouped results, and its inverse.
//!
//! ```rust
//! use rust_data_reports::pivot::{pivot, PivotOptions};
//! use rust_data_reports::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let long = DataSet::new(
//!     Schema::new(vec![
//!         Field::new("call_center", DataType::Utf8),
//!         Field::new("reason", DataType::Utf8),
//!         Field::new("count", DataType::Int64),
//!     ]),
//!     vec![
//!         vec![Value::text("la"), Value::text("billing"), Value::Int64(3)],
//!         vec![Value::text("den"), Value::text("payments"), Value::Int64(1)],
//!     ],
//! );
//! let wide = pivot(&long, "call_center", "reason", "count", &PivotOptions::default()).unwrap();
//! assert_eq!(
//!     wide.schema.field_names().collect::<Vec<_>>(),
//!     vec!["call_center", "billing", "payments"]
//! );
//! assert_eq!(wide.rows[1], vec![Value::text("den"), Value::Int64(0), Value::Int64(1)]);
//! ```

use std::collections::{HashMap, HashSet};

use crate::error::{ReportError, ReportResult};
use crate::types::{value_label, DataSet, DataType, Field, Schema, Value, ValueKey};

/// Options for [`pivot`].
#[derive(Debug, Clone, PartialEq)]
pub struct PivotOptions {
    /// Cell value for (row, column) pairs with no long-form row, or a null value.
    pub fill: f64,
    /// Exact output row order. Keys not listed are dropped; listed keys with no data are filled.
    pub row_order: Option<Vec<Value>>,
    /// Exact output column order, by label. Same rules as `row_order`.
    pub column_order: Option<Vec<String>>,
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self {
            fill: 0.0,
            row_order: None,
            column_order: None,
        }
    }
}

impl PivotOptions {
    pub fn with_fill(fill: f64) -> Self {
        Self {
            fill,
            ..Default::default()
        }
    }
}

/// Reshape `long` into one row per distinct `row_key` and one column per distinct `column_key`.
///
/// Rows and columns follow first-seen order unless an explicit order is given. There is one
/// output column per distinct column-key value; its header is the unrounded text of the value
/// (see [`value_label`]), suffixed with `_2`, `_3`, ... if it would clash with the row-key name
/// or another header. An explicit `column_order` is matched against the unsuffixed labels.
/// Integer value columns stay integer when the fill value is whole.
///
/// # Errors
///
/// - [`ReportError::MissingColumn`] if any of the three columns is absent.
/// - [`ReportError::DuplicatePivotEntry`] if two long-form rows target the same cell.
pub fn pivot(
    long: &DataSet,
    row_key: &str,
    column_key: &str,
    value: &str,
    opts: &PivotOptions,
) -> ReportResult<DataSet> {
    let idx_of = |name: &str| {
        long.schema
            .index_of(name)
            .ok_or_else(|| ReportError::missing_column(name))
    };
    let (ri, ci, vi) = (idx_of(row_key)?, idx_of(column_key)?, idx_of(value)?);

    let integral = long.schema.fields[vi].data_type == DataType::Int64 && opts.fill.fract() == 0.0;
    let cell_type = if integral { DataType::Int64 } else { DataType::Float64 };
    let fill = if integral {
        Value::Int64(opts.fill as i64)
    } else {
        Value::Float64(opts.fill)
    };

    let mut row_keys: Vec<Value> = Vec::new();
    let mut row_slots: HashMap<ValueKey, usize> = HashMap::new();
    let mut col_labels: Vec<String> = Vec::new();
    let mut col_slots: HashMap<ValueKey, usize> = HashMap::new();
    let mut cells: HashMap<(usize, usize), Value> = HashMap::new();

    for row in &long.rows {
        let (Some(rk), Some(ck)) = (row.get(ri), row.get(ci)) else {
            continue;
        };
        if rk.is_null() || ck.is_null() {
            continue;
        }
        let r = *row_slots.entry(rk.key()).or_insert_with(|| {
            row_keys.push(rk.clone());
            row_keys.len() - 1
        });
        let c = *col_slots.entry(ck.key()).or_insert_with(|| {
            col_labels.push(value_label(ck));
            col_labels.len() - 1
        });
        let cell = match row.get(vi) {
            Some(Value::Null) | None => fill.clone(),
            Some(v) if integral => v.clone(),
            Some(v) => v.as_f64().map(Value::Float64).unwrap_or_else(|| fill.clone()),
        };
        if cells.insert((r, c), cell).is_some() {
            return Err(ReportError::DuplicatePivotEntry {
                row: value_label(rk),
                column: col_labels[c].clone(),
            });
        }
    }

    let out_rows: Vec<(Value, Option<usize>)> = match &opts.row_order {
        Some(order) => order
            .iter()
            .map(|k| (k.clone(), row_slots.get(&k.key()).copied()))
            .collect(),
        None => row_keys.into_iter().enumerate().map(|(i, k)| (k, Some(i))).collect(),
    };
    let out_cols: Vec<(String, Option<usize>)> = match &opts.column_order {
        Some(order) => order
            .iter()
            .map(|l| (l.clone(), col_labels.iter().position(|c| c == l)))
            .collect(),
        None => col_labels.into_iter().enumerate().map(|(i, l)| (l, Some(i))).collect(),
    };

    let headers = unique_headers(row_key, out_cols.iter().map(|(l, _)| l.as_str()));
    let mut fields = vec![Field::new(row_key, long.schema.fields[ri].data_type)];
    fields.extend(headers.into_iter().map(|h| Field::new(h, cell_type)));

    let rows = out_rows
        .into_iter()
        .map(|(key, r)| {
            let mut out = Vec::with_capacity(out_cols.len() + 1);
            out.push(key);
            for (_, c) in &out_cols {
                let cell = match (r, c) {
                    (Some(r), Some(c)) => cells.get(&(r, *c)).cloned(),
                    _ => None,
                };
                out.push(cell.unwrap_or_else(|| fill.clone()));
            }
            out
        })
        .collect();

    Ok(DataSet::new(Schema::new(fields), rows))
}

/// Value-column headers: each label as-is, or with `_2`, `_3`, ... appended when it would
/// repeat the row-key name or an earlier header.
fn unique_headers<'a>(row_key: &str, labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::from([row_key.to_string()]);
    labels
        .map(|label| {
            let mut header = label.to_string();
            let mut n = 2;
            while taken.contains(&header) {
                header = format!("{label}_{n}");
                n += 1;
            }
            taken.insert(header.clone());
            header
        })
        .collect()
}

/// Flatten a wide table back to long form: one (`row_key`, `column_name`, `value_name`) row per
/// cell, row-major. Column labels come back as text.
///
/// # Errors
///
/// [`ReportError::MissingColumn`] if `row_key` is absent.
pub fn melt(
    wide: &DataSet,
    row_key: &str,
    column_name: &str,
    value_name: &str,
) -> ReportResult<DataSet> {
    let ri = wide
        .schema
        .index_of(row_key)
        .ok_or_else(|| ReportError::missing_column(row_key))?;
    let value_cols: Vec<(usize, &Field)> = wide
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ri)
        .collect();
    let value_type = value_cols
        .first()
        .map(|(_, f)| f.data_type)
        .unwrap_or(DataType::Float64);

    let schema = Schema::new(vec![
        Field::new(row_key, wide.schema.fields[ri].data_type),
        Field::new(column_name, DataType::Utf8),
        Field::new(value_name, value_type),
    ]);
    let mut rows = Vec::with_capacity(wide.row_count() * value_cols.len());
    for row in &wide.rows {
        let key = row.get(ri).cloned().unwrap_or(Value::Null);
        for (i, field) in &value_cols {
            rows.push(vec![
                key.clone(),
                Value::text(field.name.clone()),
                row.get(*i).cloned().unwrap_or(Value::Null),
            ]);
        }
    }
    Ok(DataSet::new(schema, rows))
}
