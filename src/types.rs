//! Core data model types shared by cleaning and reporting.
//!
//! Raw records are held in an in-memory [`DataSet`] described by a [`Schema`] (a list of typed
//! [`Field`]s). Every stage produces a new [`DataSet`]; nothing is mutated in place across
//! stages.

use std::cmp::Ordering;
use std::fmt;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer (row counts in report tables).
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// `true` for the numeric kinds ([`DataType::Int64`] and [`DataType::Float64`]).
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// Short lowercase name used in profiling output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Utf8 => "utf8",
        }
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Convenience constructor for an all-[`DataType::Utf8`] schema.
    pub fn utf8<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|n| Field::new(n, DataType::Utf8))
                .collect(),
        )
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the field with `name`, if present.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns `true` when every name in `names` is a field of this schema.
    pub fn contains_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.index_of(n.as_ref()).is_some())
    }
}

/// A single typed value in a [`DataSet`].
///
/// `Null` is the only representation of a missing value once a dataset has been cleaned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Shorthand for a [`Value::Utf8`].
    pub fn text(s: impl Into<String>) -> Self {
        Self::Utf8(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the value; `None` for nulls and strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            Self::Null | Self::Utf8(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Hashable projection used for grouping and deduplication.
    pub fn key(&self) -> ValueKey {
        match self {
            Self::Null => ValueKey::Null,
            Self::Int64(v) => ValueKey::Int(*v),
            // -0.0 and 0.0 must land in the same group.
            Self::Float64(v) if *v == 0.0 => ValueKey::Float(0.0f64.to_bits()),
            Self::Float64(v) => ValueKey::Float(v.to_bits()),
            Self::Utf8(s) => ValueKey::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_value(self))
    }
}

/// Hashable, totally-equal projection of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Null,
    Int(i64),
    /// Bit pattern of a finite `f64`.
    Float(u64),
    Str(String),
}

impl ValueKey {
    /// Recover the [`Value`] this key was taken from.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Int(v) => Value::Int64(*v),
            Self::Float(bits) => Value::Float64(f64::from_bits(*bits)),
            Self::Str(s) => Value::Utf8(s.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Ordered tuple of key-column values identifying one partition.
pub type GroupKey = Vec<ValueKey>;

/// Total order over values used when sorting report rows.
///
/// Numbers sort before strings, and `Null` sorts after everything else.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Utf8(x), Value::Utf8(y)) => x.cmp(y),
        (Value::Utf8(_), _) => Ordering::Greater,
        (_, Value::Utf8(_)) => Ordering::Less,
        (x, y) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}

/// Round to 3 decimal places (half away from zero).
pub fn round3(v: f64) -> f64 {
    round_to(v, 3)
}

/// Round to `digits` decimal places (half away from zero).
pub fn round_to(v: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    let out = (v * scale).round() / scale;
    // Avoid "-0.0" leaking into report tables.
    if out == 0.0 { 0.0 } else { out }
}

/// Text form of a value for delimited output.
///
/// - `Null` renders as an empty cell.
/// - Whole floats keep one decimal (`4.0`); other floats show up to 3 decimals with trailing
///   zeros trimmed.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int64(v) => v.to_string(),
        Value::Float64(v) if v.fract() == 0.0 => format!("{v:.1}"),
        Value::Float64(v) => {
            let s = format!("{v:.3}");
            let s = s.trim_end_matches('0');
            s.strip_suffix('.').map(|p| format!("{p}.0")).unwrap_or_else(|| s.to_owned())
        }
        Value::Utf8(s) => s.clone(),
    }
}

/// Unrounded text form of a value, used where a value becomes a label (pivot headers,
/// frequency labels). Distinct floats always give distinct labels.
pub fn value_label(value: &Value) -> String {
    match value {
        Value::Float64(v) if v.fract() == 0.0 => format!("{v:.1}"),
        Value::Float64(v) => v.to_string(),
        other => render_value(other),
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// A dataset with the given schema and no rows.
    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Iterate the cells of one column, top to bottom.
    ///
    /// Rows shorter than the schema yield `Null` for the missing cell.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }

    /// Non-null numeric values of a column, in row order.
    pub fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.column(idx).filter_map(Value::as_f64).collect()
    }

    /// Look up a cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Create a new dataset by applying `mapper` to every row.
    ///
    /// The returned dataset preserves the original schema.
    ///
    /// # Panics
    ///
    /// Panics if `mapper` returns a row with a different length than the schema field count.
    pub fn map_rows<F>(&self, mut mapper: F) -> Self
    where
        F: FnMut(&[Value]) -> Vec<Value>,
    {
        let expected_len = self.schema.fields.len();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let out = mapper(row.as_slice());
                assert!(
                    out.len() == expected_len,
                    "mapped row length {} does not match schema length {}",
                    out.len(),
                    expected_len
                );
                out
            })
            .collect();

        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Keep only the columns at `keep` (in that order).
    pub fn select_columns(&self, keep: &[usize]) -> Self {
        let fields = keep
            .iter()
            .filter_map(|&i| self.schema.fields.get(i).cloned())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                keep.iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self::new(Schema::new(fields), rows)
    }
}
