//! Top-N frequency tables for categorical columns.

use std::collections::HashMap;

use crate::cleaning::clean_text;
use crate::types::{value_label, DataSet, DataType, Field, Schema, Value};

/// Count distinct non-null labels of `column`, most frequent first, keeping at most `top_n`.
///
/// Labels are the unrounded string form of each value, trimmed and lowercased; sentinel tokens
/// and nulls are not counted. Ties keep first-seen order. The result always has the two columns
/// (`label_name`, `count_name`) and is empty when `column` is absent or entirely null.
pub fn frequency_table(
    dataset: &DataSet,
    column: &str,
    top_n: usize,
    label_name: &str,
    count_name: &str,
) -> DataSet {
    let schema = Schema::new(vec![
        Field::new(label_name, DataType::Utf8),
        Field::new(count_name, DataType::Int64),
    ]);
    let Some(idx) = dataset.schema.index_of(column) else {
        return DataSet::empty(schema);
    };

    let rows = value_counts(dataset, idx)
        .into_iter()
        .take(top_n)
        .map(|(label, count)| vec![Value::Utf8(label), Value::Int64(count as i64)])
        .collect();
    DataSet::new(schema, rows)
}

/// Every distinct label of column `idx` with its count, most frequent first.
pub fn value_counts(dataset: &DataSet, idx: usize) -> Vec<(String, usize)> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in dataset.column(idx) {
        if value.is_null() {
            continue;
        }
        let Some(label) = clean_text(&value_label(value)) else {
            continue;
        };
        match slots.get(&label) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(label.clone(), counts.len());
                counts.push((label, 1));
            }
        }
    }
    // Stable: equal counts stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
