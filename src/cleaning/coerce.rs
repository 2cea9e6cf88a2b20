//! Best-effort numeric coercion.
//!
//! Coercion is decided per value, then the column is retyped as a whole:
//!
//! - if at least one non-null cell parses (or the column was already numeric), the column
//!   becomes [`DataType::Float64`] and cells that fail to parse become `Null`;
//! - otherwise the column stays [`DataType::Utf8`] and keeps its cleaned strings.

use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Per-column outcome of [`coerce_types`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCoercion {
    pub column: String,
    /// Resulting column type.
    pub data_type: DataType,
    /// Non-null cells that parsed as numbers.
    pub parsed: usize,
    /// Non-null cells that were nulled because they did not parse (numeric columns only).
    pub failed: usize,
}

/// Output of [`coerce_types`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub dataset: DataSet,
    pub columns: Vec<ColumnCoercion>,
}

impl Coerced {
    /// Total number of cells nulled by failed parses.
    pub fn malformed_values(&self) -> usize {
        self.columns.iter().map(|c| c.failed).sum()
    }
}

/// Parse a cleaned text cell as a finite number.
///
/// Accepts integer and floating-point syntax including exponents (`"1e3"`, `"-2.5"`, `".5"`).
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Attempt numeric conversion for every column of `dataset`.
pub fn coerce_types(dataset: &DataSet) -> Coerced {
    let n_cols = dataset.column_count();
    let mut fields = Vec::with_capacity(n_cols);
    let mut columns = Vec::with_capacity(n_cols);
    // Column-major staging; transposed back to rows at the end.
    let mut converted: Vec<Vec<Value>> = Vec::with_capacity(n_cols);

    for (idx, field) in dataset.schema.fields.iter().enumerate() {
        let (cells, report) = coerce_column(dataset, idx, field);
        fields.push(Field::new(field.name.clone(), report.data_type));
        columns.push(report);
        converted.push(cells);
    }

    let rows = (0..dataset.row_count())
        .map(|r| {
            converted
                .iter()
                .map(|col| col.get(r).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Coerced {
        dataset: DataSet::new(Schema::new(fields), rows),
        columns,
    }
}

fn coerce_column(dataset: &DataSet, idx: usize, field: &Field) -> (Vec<Value>, ColumnCoercion) {
    let mut parsed = 0usize;
    let mut failed = 0usize;
    let attempted: Vec<Option<f64>> = dataset
        .column(idx)
        .map(|value| match value {
            Value::Null => None,
            Value::Int64(v) => {
                parsed += 1;
                Some(*v as f64)
            }
            Value::Float64(v) => {
                parsed += 1;
                Some(*v)
            }
            Value::Utf8(s) => {
                let out = parse_number(s);
                if out.is_some() {
                    parsed += 1;
                } else {
                    failed += 1;
                }
                out
            }
        })
        .collect();

    let numeric = parsed > 0 || field.data_type.is_numeric();
    if !numeric {
        // Nothing parsed: discard the attempts and keep the cleaned strings.
        let cells = dataset.column(idx).cloned().collect();
        return (
            cells,
            ColumnCoercion {
                column: field.name.clone(),
                data_type: DataType::Utf8,
                parsed: 0,
                failed: 0,
            },
        );
    }

    let cells = attempted
        .into_iter()
        .map(|v| v.map(Value::Float64).unwrap_or(Value::Null))
        .collect();
    (
        cells,
        ColumnCoercion {
            column: field.name.clone(),
            data_type: DataType::Float64,
            parsed,
            failed,
        },
    )
}
