//! Column-name normalization.

use std::collections::HashSet;

use crate::error::{ReportError, ReportResult};
use crate::types::{DataSet, Field, Schema};

/// Canonical form of a column name.
///
/// Trims surrounding whitespace, lowercases, then collapses every maximal run of spaces and/or
/// hyphens into a single `_`. Never fails and is idempotent.
pub fn normalize_column_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_run = false;
    for ch in lowered.chars() {
        if ch == ' ' || ch == '-' {
            if !in_run {
                out.push('_');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Returns a copy of `dataset` with canonical column names (order preserved).
///
/// Fails with [`ReportError::DuplicateColumn`] when two names collapse to the same canonical
/// name; the input is left untouched.
pub fn normalize_columns(dataset: &DataSet) -> ReportResult<DataSet> {
    let mut seen = HashSet::with_capacity(dataset.column_count());
    let mut fields = Vec::with_capacity(dataset.column_count());
    for field in &dataset.schema.fields {
        let name = normalize_column_name(&field.name);
        if !seen.insert(name.clone()) {
            return Err(ReportError::DuplicateColumn { column: name });
        }
        fields.push(Field::new(name, field.data_type));
    }
    Ok(DataSet::new(Schema::new(fields), dataset.rows.clone()))
}

#[cfg(test)]
mod tests {
    use super::{normalize_column_name, normalize_columns};
    use crate::error::ReportError;
    use crate::types::{DataSet, Schema};

    #[test]
    fn trims_lowercases_and_collapses_runs() {
        assert_eq!(normalize_column_name("  CSAT Score "), "csat_score");
        assert_eq!(normalize_column_name("Call-Duration  In -- Minutes"), "call_duration_in_minutes");
        assert_eq!(normalize_column_name("Call_Center"), "call_center");
        assert_eq!(normalize_column_name(""), "");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["A - B", " x ", "Response Time", "--lead"] {
            let once = normalize_column_name(raw);
            assert_eq!(normalize_column_name(&once), once);
        }
    }

    #[test]
    fn preserves_column_order() {
        let ds = DataSet::empty(Schema::utf8(["State", "CSAT Score", "Channel"]));
        let out = normalize_columns(&ds).unwrap();
        assert_eq!(
            out.schema.field_names().collect::<Vec<_>>(),
            vec!["state", "csat_score", "channel"]
        );
    }

    #[test]
    fn colliding_names_fail_the_stage() {
        let ds = DataSet::empty(Schema::utf8(["State", " state"]));
        let err = normalize_columns(&ds).unwrap_err();
        assert!(matches!(err, ReportError::DuplicateColumn { ref column } if column == "state"));
    }
}
