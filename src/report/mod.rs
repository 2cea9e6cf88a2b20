//! Report assembly over a cleaned dataset.
//!
//! A [`ReportAssembler`] walks a list of [`ReportDefinition`]s. For each one it checks the
//! report's required columns once: if they are present the recipe runs, otherwise the report
//! is emitted empty with its declared headers. Missing columns are never an error.
//!
//! ```rust
//! use rust_data_reports::cleaning::clean;
//! use rust_data_reports::config::EngineConfig;
//! use rust_data_reports::report::ReportAssembler;
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
//! let cfg = EngineConfig::default();
//! let clean = clean(&raw, &cfg).unwrap();
//! let reports = ReportAssembler::new(cfg).assemble(&clean).unwrap();
//!
//! let by_state = reports.get("csat_by_state").unwrap();
//! assert_eq!(
//!     by_state.data().rows,
//!     vec![vec![Value::text("ca"), Value::Float64(4.0), Value::Int64(1)]]
//! );
//! // No "reason" column: the table exists, with headers and no rows.
//! assert_eq!(reports.get("top_reasons").unwrap().data().row_count(), 0);
//! ```

pub mod definition;

use std::fmt;
use std::sync::Arc;

use crate::aggregation::{
    counts_with_group_share, frequency_table, summarize, GroupSort, GroupedAggregate, SummaryStat,
};
use crate::config::EngineConfig;
use crate::error::ReportResult;
use crate::observability::{PipelineEvent, PipelineObserver};
use crate::pivot::{pivot, PivotOptions};
use crate::types::{DataSet, Value};

pub use definition::{
    default_kpi_metrics, default_report_definitions, percentile_label, KpiMetric,
    ReportDefinition, ReportRecipe,
};

/// A named result table. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    name: String,
    data: DataSet,
}

impl ReportTable {
    pub fn new(name: impl Into<String>, data: DataSet) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &DataSet {
        &self.data
    }

    /// Hand the table over (e.g. to a persistence layer).
    pub fn into_parts(self) -> (String, DataSet) {
        (self.name, self.data)
    }
}

/// The ordered set of tables produced by one assembly run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reports {
    tables: Vec<ReportTable>,
}

impl Reports {
    pub fn new(tables: Vec<ReportTable>) -> Self {
        Self { tables }
    }

    /// Look up a table by report name.
    pub fn get(&self, name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportTable> {
        self.tables.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl IntoIterator for Reports {
    type Item = ReportTable;
    type IntoIter = std::vec::IntoIter<ReportTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

/// Builds the report set for a cleaned dataset.
pub struct ReportAssembler {
    config: EngineConfig,
    definitions: Vec<ReportDefinition>,
    observer: Option<Arc<dyn PipelineObserver>>,
}

impl fmt::Debug for ReportAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportAssembler")
            .field("config", &self.config)
            .field("reports", &self.definitions.len())
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl ReportAssembler {
    /// Assembler for the default report set ([`default_report_definitions`]).
    pub fn new(config: EngineConfig) -> Self {
        Self::with_definitions(config, default_report_definitions())
    }

    /// Assembler for a caller-supplied report set.
    pub fn with_definitions(config: EngineConfig, definitions: Vec<ReportDefinition>) -> Self {
        Self {
            config,
            definitions,
            observer: None,
        }
    }

    /// Attach an observer for report events.
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn definitions(&self) -> &[ReportDefinition] {
        &self.definitions
    }

    /// Produce every report, in definition order.
    ///
    /// # Errors
    ///
    /// Only configuration errors ([`crate::ReportError::Config`]) and internal inconsistencies
    /// surface; absent columns yield empty tables.
    pub fn assemble(&self, dataset: &DataSet) -> ReportResult<Reports> {
        self.config.validate()?;
        let mut tables = Vec::with_capacity(self.definitions.len());
        for def in &self.definitions {
            let missing: Vec<String> = def
                .required_columns()
                .into_iter()
                .filter(|c| dataset.schema.index_of(c).is_none())
                .collect();

            let data = if missing.is_empty() {
                let data = self.build(&def.recipe, dataset)?;
                self.emit(PipelineEvent::ReportProduced {
                    name: def.name.clone(),
                    rows: data.row_count(),
                });
                data
            } else {
                tracing::debug!(report = %def.name, ?missing, "required columns absent");
                self.emit(PipelineEvent::ReportSkipped {
                    name: def.name.clone(),
                    missing,
                });
                DataSet::empty(def.declared_schema())
            };
            tables.push(ReportTable::new(def.name.clone(), data));
        }
        Ok(Reports::new(tables))
    }

    fn build(&self, recipe: &ReportRecipe, dataset: &DataSet) -> ReportResult<DataSet> {
        let parallel = self.config.parallel_groups;
        match recipe {
            ReportRecipe::KpiSummary { metrics } => self.kpi_summary(dataset, metrics),
            ReportRecipe::Frequency {
                column,
                top_n,
                label,
            } => Ok(frequency_table(
                dataset,
                column,
                self.config.top_n_or(*top_n),
                label,
                "count",
            )),
            ReportRecipe::Grouped(agg) => agg.run(dataset, parallel),
            ReportRecipe::PivotCounts {
                row_key,
                column_key,
            } => {
                let long = GroupedAggregate::by([row_key, column_key])
                    .count("count")
                    .run(dataset, parallel)?;
                pivot(&long, row_key, column_key, "count", &self.pivot_options())
            }
            ReportRecipe::PivotMean {
                row_key,
                column_key,
                target,
            } => {
                let long = GroupedAggregate::by([row_key, column_key])
                    .mean(target.clone(), "mean")
                    .sort(GroupSort::FirstSeen)
                    .run(dataset, parallel)?;
                pivot(&long, row_key, column_key, "mean", &self.pivot_options())
            }
            ReportRecipe::GroupShare { group, category } => {
                counts_with_group_share(dataset, group, category)
            }
        }
    }

    fn pivot_options(&self) -> PivotOptions {
        PivotOptions::with_fill(self.config.pivot_fill)
    }

    fn kpi_summary(&self, dataset: &DataSet, metrics: &[KpiMetric]) -> ReportResult<DataSet> {
        let q = self.config.percentile;
        let mut rows = vec![
            vec![
                Value::text("total_rows_loaded"),
                Value::Float64(dataset.row_count() as f64),
            ],
            vec![
                Value::text("total_columns"),
                Value::Float64(dataset.column_count() as f64),
            ],
        ];
        for metric in metrics {
            if dataset.schema.index_of(&metric.column).is_none() {
                continue;
            }
            let metric_q = match metric.stat {
                SummaryStat::Percentile(Some(fixed)) => fixed,
                _ => q,
            };
            let value = match summarize(dataset, &metric.column, metric_q)? {
                Some(s) => Value::Float64(s.get(metric.stat)),
                None if metric.stat == SummaryStat::Count => Value::Float64(0.0),
                None => Value::Null,
            };
            rows.push(vec![Value::text(metric.output_label(q)), value]);
        }
        Ok(DataSet::new(definition::kpi_schema(), rows))
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ReportAssembler, ReportDefinition, ReportRecipe};
    use crate::aggregation::SummaryStat;
    use crate::config::EngineConfig;
    use crate::observability::{PipelineEvent, RecordingObserver};
    use crate::report::KpiMetric;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn clean_tickets() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("call_center", DataType::Utf8),
            Field::new("reason", DataType::Utf8),
            Field::new("csat_score", DataType::Float64),
        ]);
        let row = |c: &str, r: &str, v: f64| vec![Value::text(c), Value::text(r), Value::Float64(v)];
        DataSet::new(
            schema,
            vec![
                row("la", "billing", 4.0),
                row("la", "billing", 2.0),
                row("den", "payments", 5.0),
                row("la", "service", 3.0),
            ],
        )
    }

    #[test]
    fn kpi_summary_reports_counts_and_present_metrics_only() {
        let reports = ReportAssembler::new(EngineConfig::default())
            .assemble(&clean_tickets())
            .unwrap();
        let kpi = reports.get("kpi_summary").unwrap().data();
        assert_eq!(
            kpi.rows,
            vec![
                vec![Value::text("total_rows_loaded"), Value::Float64(4.0)],
                vec![Value::text("total_columns"), Value::Float64(3.0)],
                vec![Value::text("avg_csat"), Value::Float64(3.5)],
                vec![Value::text("median_csat"), Value::Float64(3.5)],
            ]
        );
    }

    #[test]
    fn empty_metric_column_reports_null() {
        let ds = DataSet::new(
            Schema::new(vec![Field::new("call_duration_in_minutes", DataType::Float64)]),
            vec![vec![Value::Null]],
        );
        let defs = vec![ReportDefinition::new(
            "kpi",
            ReportRecipe::KpiSummary {
                metrics: vec![
                    KpiMetric::new("call_duration_in_minutes", "dur", SummaryStat::Percentile(None)),
                    KpiMetric::new("call_duration_in_minutes", "n", SummaryStat::Count),
                ],
            },
        )];
        let reports = ReportAssembler::with_definitions(EngineConfig::default(), defs)
            .assemble(&ds)
            .unwrap();
        let kpi = reports.get("kpi").unwrap().data();
        assert_eq!(kpi.rows[2], vec![Value::text("p95_dur"), Value::Null]);
        assert_eq!(kpi.rows[3], vec![Value::text("n"), Value::Float64(0.0)]);
        assert!(kpi.rows.iter().all(|r| !matches!(r[1], Value::Int64(_))));
    }

    #[test]
    fn pivots_fill_missing_combinations() {
        let reports = ReportAssembler::new(EngineConfig::default())
            .assemble(&clean_tickets())
            .unwrap();
        let counts = reports.get("pivot_query_counts").unwrap().data();
        assert_eq!(
            counts.schema.field_names().collect::<Vec<_>>(),
            vec!["call_center", "billing", "payments", "service"]
        );
        assert_eq!(
            counts.rows,
            vec![
                vec![Value::text("la"), Value::Int64(2), Value::Int64(0), Value::Int64(1)],
                vec![Value::text("den"), Value::Int64(0), Value::Int64(1), Value::Int64(0)],
            ]
        );

        let csat = reports.get("pivot_avg_csat_score").unwrap().data();
        assert_eq!(
            csat.rows[0],
            vec![
                Value::text("la"),
                Value::Float64(3.0),
                Value::Float64(0.0),
                Value::Float64(3.0),
            ]
        );
    }

    #[test]
    fn top_n_override_applies() {
        let cfg = EngineConfig::builder().top_n(1).build().unwrap();
        let reports = ReportAssembler::new(cfg).assemble(&clean_tickets()).unwrap();
        let top = reports.get("top_reasons").unwrap().data();
        assert_eq!(top.rows, vec![vec![Value::text("billing"), Value::Int64(2)]]);
    }

    #[test]
    fn missing_columns_emit_declared_headers_and_notify() {
        let obs = Arc::new(RecordingObserver::default());
        let reports = ReportAssembler::new(EngineConfig::default())
            .with_observer(obs.clone())
            .assemble(&clean_tickets())
            .unwrap();

        let share = reports.get("response_time_counts_and_percent").unwrap().data();
        assert_eq!(share.row_count(), 0);
        assert_eq!(
            share.schema.field_names().collect::<Vec<_>>(),
            vec!["call_center", "response_time", "count", "total", "percent"]
        );
        assert!(obs.events().iter().any(|e| matches!(
            e,
            PipelineEvent::ReportSkipped { name, missing }
                if name == "sentiment" && missing == &vec!["sentiment".to_string()]
        )));
        assert_eq!(reports.len(), super::default_report_definitions().len());
    }
}
