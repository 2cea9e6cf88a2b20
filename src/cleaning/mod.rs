//! The cleaning pipeline: raw [`DataSet`] in, clean [`DataSet`] out.
//!
//! Stages always run in this order, each producing a new dataset:
//!
//! 1. [`normalize_columns`]: canonical column names
//! 2. [`canonicalize_nulls`]: trimmed/lowercased text, sentinel tokens to `Null`
//! 3. optional [`prune`] of all-null rows/columns (see [`EngineConfig`])
//! 4. [`coerce_types`]: best-effort numeric coercion with column retyping
//! 5. [`deduplicate`]: exact duplicate rows, first occurrence kept
//! 6. [`apply_null_policy`]: strict (drop) or impute (median) for numeric nulls
//!
//! Deduplication runs after canonicalization and coercion so rows that differ only by case,
//! padding or number formatting (`"4"` vs `"4.0"`) are recognized as duplicates.
//!
//! ```rust
//! use rust_data_reports::cleaning::CleaningPipeline;
//! use rust_data_reports::config::EngineConfig;
//! use rust_data_reports::types::{DataSet, Schema, Value};
//!
//! let raw = DataSet::new(
//!     Schema::utf8(["State", "CSAT Score"]),
//!     vec![
//!         vec![Value::text("CA"), Value::text("4")],
//!         vec![Value::text("ca "), Value::text("4")],
//!         vec![Value::text("NY"), Value::text("bad")],
//!     ],
//! );
//!
//! let out = CleaningPipeline::new(EngineConfig::default()).run(&raw).unwrap();
//! assert_eq!(out.dataset.row_count(), 1);
//! assert_eq!(out.summary.duplicates_removed, 1);
//! assert_eq!(out.summary.rows_dropped_by_policy, 1);
//! ```

pub mod coerce;
pub mod columns;
pub mod dedup;
pub mod nulls;
pub mod policy;
pub mod prune;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::error::ReportResult;
use crate::observability::{CleaningStage, PipelineEvent, PipelineObserver};
use crate::types::DataSet;

pub use coerce::{coerce_types, parse_number, Coerced, ColumnCoercion};
pub use columns::{normalize_column_name, normalize_columns};
pub use dedup::{count_duplicates, deduplicate};
pub use nulls::{canonicalize_nulls, clean_text, is_sentinel, SENTINEL_NULLS};
pub use policy::{apply_null_policy, ResolvedNulls};

/// Counters collected while cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleaningSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,
    /// Text cells rewritten to `Null` (sentinel tokens, non-finite floats).
    pub sentinel_nulls: usize,
    /// Cells nulled because they failed numeric coercion in a numeric column.
    pub malformed_values: usize,
    pub numeric_columns: usize,
    pub empty_rows_dropped: usize,
    pub empty_columns_dropped: usize,
    pub duplicates_removed: usize,
    pub rows_dropped_by_policy: usize,
    pub values_imputed: usize,
}

/// A cleaned dataset plus what happened to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOutput {
    pub dataset: DataSet,
    pub summary: CleaningSummary,
}

/// Runs the cleaning stages in their fixed order.
pub struct CleaningPipeline {
    config: EngineConfig,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for CleaningPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleaningPipeline")
            .field("config", &self.config)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl CleaningPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Attach an observer for stage events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clean `raw`.
    ///
    /// The input is never modified. On error no partially-cleaned dataset is returned.
    ///
    /// # Errors
    ///
    /// - [`crate::ReportError::Config`] if the configuration fails validation.
    /// - [`crate::ReportError::DuplicateColumn`] if two column names normalize to the same name.
    pub fn run(&self, raw: &DataSet) -> ReportResult<CleanOutput> {
        self.config.validate()?;
        let mut summary = CleaningSummary {
            rows_in: raw.row_count(),
            ..Default::default()
        };

        let started = Instant::now();
        let ds = normalize_columns(raw)?;
        self.stage_finished(CleaningStage::NormalizeColumns, raw, &ds, started);

        let started = Instant::now();
        let nulls = canonicalize_nulls(&ds);
        summary.sentinel_nulls = nulls.nulls_found;
        self.stage_finished(CleaningStage::CanonicalizeNulls, &ds, &nulls.dataset, started);
        let mut ds = nulls.dataset;

        if self.config.drop_empty_rows || self.config.drop_empty_columns {
            let started = Instant::now();
            let mut pruned = ds.clone();
            if self.config.drop_empty_rows {
                pruned = prune::drop_empty_rows(&pruned);
            }
            if self.config.drop_empty_columns {
                pruned = prune::drop_empty_columns(&pruned);
            }
            summary.empty_rows_dropped = ds.row_count() - pruned.row_count();
            summary.empty_columns_dropped = ds.column_count() - pruned.column_count();
            self.stage_finished(CleaningStage::PruneEmpty, &ds, &pruned, started);
            ds = pruned;
        }

        let started = Instant::now();
        let coerced = coerce_types(&ds);
        summary.malformed_values = coerced.malformed_values();
        for col in &coerced.columns {
            self.emit(PipelineEvent::ColumnCoerced {
                column: col.column.clone(),
                parsed: col.parsed,
                failed: col.failed,
                data_type: col.data_type,
            });
        }
        self.stage_finished(CleaningStage::CoerceTypes, &ds, &coerced.dataset, started);
        let ds = coerced.dataset;
        summary.numeric_columns = ds
            .schema
            .fields
            .iter()
            .filter(|f| f.data_type.is_numeric())
            .count();

        let started = Instant::now();
        let deduped = deduplicate(&ds);
        summary.duplicates_removed = ds.row_count() - deduped.row_count();
        self.stage_finished(CleaningStage::Deduplicate, &ds, &deduped, started);

        let started = Instant::now();
        let resolved = apply_null_policy(&deduped, self.config.null_policy);
        summary.rows_dropped_by_policy = resolved.rows_dropped;
        summary.values_imputed = resolved.values_imputed;
        self.stage_finished(CleaningStage::ResolveNulls, &deduped, &resolved.dataset, started);

        let dataset = resolved.dataset;
        summary.rows_out = dataset.row_count();
        summary.columns_out = dataset.column_count();
        Ok(CleanOutput { dataset, summary })
    }

    fn stage_finished(&self, stage: CleaningStage, before: &DataSet, after: &DataSet, started: Instant) {
        self.emit(PipelineEvent::StageFinished {
            stage,
            rows_in: before.row_count(),
            rows_out: after.row_count(),
            elapsed: started.elapsed(),
        });
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

/// Clean `raw` with `config` and no observer.
pub fn clean(raw: &DataSet, config: &EngineConfig) -> ReportResult<DataSet> {
    CleaningPipeline::new(config.clone())
        .run(raw)
        .map(|out| out.dataset)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{clean, CleaningPipeline};
    use crate::config::{EngineConfig, NullPolicy};
    use crate::error::ReportError;
    use crate::observability::{CleaningStage, PipelineEvent, RecordingObserver};
    use crate::types::{DataSet, DataType, Schema, Value};

    fn raw() -> DataSet {
        DataSet::new(
            Schema::utf8(["State", "CSAT Score"]),
            vec![
                vec![Value::text("CA"), Value::text("4")],
                vec![Value::text("ca "), Value::text("4")],
                vec![Value::text("NY"), Value::text("bad")],
            ],
        )
    }

    #[test]
    fn strict_pipeline_dedups_then_drops_malformed_rows() {
        let out = CleaningPipeline::new(EngineConfig::default()).run(&raw()).unwrap();

        assert_eq!(
            out.dataset.schema.field_names().collect::<Vec<_>>(),
            vec!["state", "csat_score"]
        );
        assert_eq!(out.dataset.schema.fields[1].data_type, DataType::Float64);
        assert_eq!(
            out.dataset.rows,
            vec![vec![Value::text("ca"), Value::Float64(4.0)]]
        );
        assert_eq!(out.summary.rows_in, 3);
        assert_eq!(out.summary.rows_out, 1);
        assert_eq!(out.summary.malformed_values, 1);
        assert_eq!(out.summary.duplicates_removed, 1);
        assert_eq!(out.summary.rows_dropped_by_policy, 1);
    }

    #[test]
    fn impute_pipeline_keeps_rows_and_fills_medians() {
        let cfg = EngineConfig {
            null_policy: NullPolicy::Impute,
            ..Default::default()
        };
        let out = CleaningPipeline::new(cfg).run(&raw()).unwrap();
        assert_eq!(
            out.dataset.rows,
            vec![
                vec![Value::text("ca"), Value::Float64(4.0)],
                vec![Value::text("ny"), Value::Float64(4.0)],
            ]
        );
        assert_eq!(out.summary.values_imputed, 1);
    }

    #[test]
    fn numeric_formatting_differences_dedup_after_coercion() {
        let raw = DataSet::new(
            Schema::utf8(["id", "score"]),
            vec![
                vec![Value::text("a"), Value::text("4")],
                vec![Value::text("A"), Value::text("4.0")],
            ],
        );
        let out = clean(&raw, &EngineConfig::default()).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn pruning_is_opt_in() {
        let raw = DataSet::new(
            Schema::utf8(["a", "b"]),
            vec![
                vec![Value::text("x"), Value::text("n/a")],
                vec![Value::text(""), Value::text("none")],
            ],
        );
        let plain = clean(&raw, &EngineConfig::default()).unwrap();
        assert_eq!(plain.column_count(), 2);
        assert_eq!(plain.row_count(), 2);

        let cfg = EngineConfig::builder()
            .drop_empty_rows(true)
            .drop_empty_columns(true)
            .build()
            .unwrap();
        let out = CleaningPipeline::new(cfg).run(&raw).unwrap();
        assert_eq!(out.dataset.schema.field_names().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(out.dataset.rows, vec![vec![Value::text("x")]]);
        assert_eq!(out.summary.empty_rows_dropped, 1);
        assert_eq!(out.summary.empty_columns_dropped, 1);
    }

    #[test]
    fn duplicate_columns_fail_without_output() {
        let raw = DataSet::empty(Schema::utf8(["Call Center", "call-center"]));
        let err = clean(&raw, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, ReportError::DuplicateColumn { .. }));
    }

    #[test]
    fn invalid_config_is_rejected_before_cleaning() {
        let cfg = EngineConfig {
            percentile: 2.0,
            ..Default::default()
        };
        let err = clean(&raw(), &cfg).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn observer_sees_stages_in_order() {
        let obs = Arc::new(RecordingObserver::default());
        CleaningPipeline::new(EngineConfig::default())
            .with_observer(obs.clone())
            .run(&raw())
            .unwrap();

        let stages: Vec<CleaningStage> = obs
            .events()
            .into_iter()
            .filter_map(|e| match e {
                PipelineEvent::StageFinished { stage, .. } => Some(stage),
                _ => None,
            })
            .collect();
        assert_eq!(
            stages,
            vec![
                CleaningStage::NormalizeColumns,
                CleaningStage::CanonicalizeNulls,
                CleaningStage::CoerceTypes,
                CleaningStage::Deduplicate,
                CleaningStage::ResolveNulls,
            ]
        );
    }
}
