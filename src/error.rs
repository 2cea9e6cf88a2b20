use thiserror::Error;

/// Convenience result type for cleaning and reporting operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Error type returned by the crate.
///
/// Per-cell coercion failures and empty aggregation inputs are *not* errors: the former become
/// [`crate::types::Value::Null`], the latter report as `None`.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration was parsed but is not valid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// An operation referenced a column that is not part of the dataset.
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    /// Two raw column names normalize to the same canonical name.
    #[error("duplicate column '{column}' after name normalization")]
    DuplicateColumn { column: String },

    /// A long-form table has more than one row for the same pivot cell.
    #[error("duplicate pivot entry for row '{row}' and column '{column}'")]
    DuplicatePivotEntry { row: String, column: String },
}

impl ReportError {
    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }
}

/// Invalid engine configuration, rejected before any data is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Both the strict and the impute null policies were selected.
    #[error("ambiguous null policy: strict and impute are mutually exclusive")]
    AmbiguousPolicy,

    /// `top_n` must be a positive integer.
    #[error("top_n must be > 0")]
    InvalidTopN,

    /// `percentile` must lie in `[0, 1]`.
    #[error("percentile must be within [0, 1] (got {0})")]
    InvalidPercentile(f64),

    /// `pivot_fill` must be a finite number.
    #[error("pivot_fill must be finite (got {0})")]
    InvalidPivotFill(f64),
}
