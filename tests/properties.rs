//! Property-based tests for the cleaning stages, grouping and pivoting.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_data_reports::aggregation::{mean, GroupedAggregate};
use rust_data_reports::cleaning::{
    canonicalize_nulls, clean, coerce_types, deduplicate, is_sentinel, normalize_column_name,
    parse_number,
};
use rust_data_reports::config::{EngineConfig, NullPolicy};
use rust_data_reports::pivot::{melt, pivot, PivotOptions};
use rust_data_reports::types::{round3, DataSet, DataType, Field, Schema, Value};

fn raw_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        "[ A-Za-z/]{0,8}",
        (-50i32..50).prop_map(|v| v.to_string()),
        (-50.0f64..50.0).prop_map(|v| format!("{v:.2}")),
        prop::sample::select(vec!["n/a", " NULL", "None ", "", "NaN", "undefined"])
            .prop_map(str::to_string),
    ]
}

fn raw_tickets() -> impl Strategy<Value = DataSet> {
    let key = prop::sample::select(vec!["CA", "ca ", "NY", "n/a", ""]);
    let score = prop_oneof![
        (0i32..6).prop_map(|v| v.to_string()),
        Just("bad".to_string()),
        Just("".to_string()),
    ];
    prop::collection::vec((key, score), 0..40).prop_map(|rows| {
        DataSet::new(
            Schema::utf8(["State", "CSAT Score"]),
            rows.into_iter()
                .map(|(k, s)| vec![Value::text(k), Value::text(s)])
                .collect(),
        )
    })
}

proptest! {
    #[test]
    fn column_names_normalize_idempotently(raw in "[ A-Za-z0-9_-]{0,16}") {
        let once = normalize_column_name(&raw);
        prop_assert_eq!(normalize_column_name(&once), once.clone());
        prop_assert!(!once.contains(' ') && !once.contains('-'));
        prop_assert_eq!(once.to_lowercase(), once.clone());
    }

    #[test]
    fn canonicalized_text_is_trimmed_lowercase_and_never_a_sentinel(
        cells in prop::collection::vec(raw_cell(), 0..30)
    ) {
        let ds = DataSet::new(
            Schema::utf8(["c"]),
            cells.iter().map(|c| vec![Value::text(c.clone())]).collect(),
        );
        let out = canonicalize_nulls(&ds).dataset;
        for (raw, value) in cells.iter().zip(out.column(0)) {
            match value {
                Value::Utf8(s) => {
                    prop_assert_eq!(s, &raw.trim().to_lowercase());
                    prop_assert!(!is_sentinel(s));
                }
                Value::Null => prop_assert!(is_sentinel(&raw.trim().to_lowercase())),
                other => prop_assert!(false, "unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn integer_text_coerces_to_the_same_number(v in any::<i32>()) {
        prop_assert_eq!(parse_number(&v.to_string()), Some(f64::from(v)));

        let ds = DataSet::new(Schema::utf8(["n"]), vec![vec![Value::text(v.to_string())]]);
        let coerced = coerce_types(&ds);
        prop_assert_eq!(coerced.dataset.schema.fields[0].data_type, DataType::Float64);
        prop_assert_eq!(&coerced.dataset.rows[0][0], &Value::Float64(f64::from(v)));
    }

    #[test]
    fn deduplication_is_idempotent(ds in raw_tickets()) {
        let once = deduplicate(&ds);
        prop_assert_eq!(deduplicate(&once), once.clone());
        prop_assert!(once.row_count() <= ds.row_count());
    }

    #[test]
    fn no_null_survives_in_numeric_columns(ds in raw_tickets(), impute in any::<bool>()) {
        let cfg = EngineConfig {
            null_policy: if impute { NullPolicy::Impute } else { NullPolicy::Strict },
            ..Default::default()
        };
        let out = clean(&ds, &cfg).unwrap();
        for (idx, field) in out.schema.fields.iter().enumerate() {
            if field.data_type.is_numeric() {
                prop_assert!(out.column(idx).all(|v| !v.is_null()));
            }
        }
    }

    #[test]
    fn grouped_counts_cover_every_keyed_row(ds in raw_tickets()) {
        let cfg = EngineConfig::builder().impute_nulls().build().unwrap();
        let out = clean(&ds, &cfg).unwrap();
        let grouped = GroupedAggregate::by(["state"]).count("n").run(&out, false).unwrap();

        let total: i64 = grouped
            .rows
            .iter()
            .map(|r| match r[1] {
                Value::Int64(n) => n,
                _ => 0,
            })
            .sum();
        let keyed = out.column(0).filter(|v| !v.is_null()).count() as i64;
        prop_assert_eq!(total, keyed);

        if let Some(csat) = out.schema.index_of("csat_score") {
            let means = GroupedAggregate::by(["state"])
                .mean("csat_score", "avg")
                .run(&out, false)
                .unwrap();
            for row in &means.rows {
                let values: Vec<f64> = out
                    .rows
                    .iter()
                    .filter(|r| r[0] == row[0])
                    .filter_map(|r| r[csat].as_f64())
                    .collect();
                let expected = match mean(&values) {
                    Some(m) => Value::Float64(round3(m)),
                    None => Value::Null,
                };
                prop_assert_eq!(&row[1], &expected);
            }
        }
    }

    #[test]
    fn pivot_and_melt_round_trip(
        cells in prop::collection::btree_map((0u8..5, 0u8..5), -100i64..100, 0..20)
    ) {
        let long = long_form(&cells);
        let opts = PivotOptions::default();
        let wide = pivot(&long, "row", "col", "value", &opts).unwrap();
        let melted = melt(&wide, "row", "col", "value").unwrap();

        for row in &melted.rows {
            let (Value::Utf8(r), Value::Utf8(c), Value::Int64(v)) = (&row[0], &row[1], &row[2]) else {
                return Err(TestCaseError::fail(format!("unexpected row {row:?}")));
            };
            let key = (label_index(r), label_index(c));
            prop_assert_eq!(*v, cells.get(&key).copied().unwrap_or(0));
        }
        prop_assert_eq!(pivot(&melted, "row", "col", "value", &opts).unwrap(), wide);
    }
}

fn long_form(cells: &BTreeMap<(u8, u8), i64>) -> DataSet {
    DataSet::new(
        Schema::new(vec![
            Field::new("row", DataType::Utf8),
            Field::new("col", DataType::Utf8),
            Field::new("value", DataType::Int64),
        ]),
        cells
            .iter()
            .map(|((r, c), v)| {
                vec![
                    Value::text(format!("r{r}")),
                    Value::text(format!("c{c}")),
                    Value::Int64(*v),
                ]
            })
            .collect(),
    )
}

fn label_index(label: &str) -> u8 {
    label[1..].parse().unwrap_or(u8::MAX)
}
