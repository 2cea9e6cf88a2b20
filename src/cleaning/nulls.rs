//! Sentinel-null canonicalization for text columns.

use crate::types::{DataSet, Value};

/// Tokens that mean "missing" once trimmed and lowercased.
pub const SENTINEL_NULLS: [&str; 7] = ["", "none", "null", "nan", "na", "n/a", "undefined"];

/// `true` if `s` (already trimmed and lowercased) is a sentinel null token.
pub fn is_sentinel(s: &str) -> bool {
    SENTINEL_NULLS.contains(&s)
}

/// Trimmed, lowercased form of a text cell, or `None` for sentinel tokens.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = raw.trim().to_lowercase();
    if is_sentinel(&cleaned) {
        None
    } else {
        Some(cleaned)
    }
}

/// Output of [`canonicalize_nulls`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalizedNulls {
    pub dataset: DataSet,
    /// Number of cells that were rewritten to [`Value::Null`].
    pub nulls_found: usize,
}

/// Rewrite every text cell to its trimmed, lowercased form, and sentinel tokens to `Null`.
///
/// Numeric columns are left as they are, except that non-finite floats (NaN, ±inf) become
/// `Null` so that no placeholder ever reaches the output.
pub fn canonicalize_nulls(dataset: &DataSet) -> CanonicalizedNulls {
    let mut nulls_found = 0usize;
    let out = dataset.map_rows(|row| {
        row.iter()
            .map(|value| match value {
                Value::Utf8(s) => match clean_text(s) {
                    Some(cleaned) => Value::Utf8(cleaned),
                    None => {
                        nulls_found += 1;
                        Value::Null
                    }
                },
                Value::Float64(v) if !v.is_finite() => {
                    nulls_found += 1;
                    Value::Null
                }
                other => other.clone(),
            })
            .collect()
    });
    CanonicalizedNulls {
        dataset: out,
        nulls_found,
    }
}
