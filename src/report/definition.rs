//! Declarative report definitions.
//!
//! Each [`ReportDefinition`] names its output, the recipe that builds it, and (derived from the
//! recipe) the input columns it needs. The assembler checks that guard once per report.

use crate::aggregation::{GroupSort, GroupedAggregate, SummaryStat};
use crate::types::{render_value, DataType, Field, Schema, Value};

/// One row of the KPI summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiMetric {
    pub column: String,
    /// Row label; for [`SummaryStat::Percentile`] with no fixed fraction the label is
    /// `p{percent}_{label}`.
    pub label: String,
    pub stat: SummaryStat,
}

impl KpiMetric {
    pub fn new(column: impl Into<String>, label: impl Into<String>, stat: SummaryStat) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
            stat,
        }
    }

    /// Label as it appears in the output, given the configured percentile `q`.
    pub fn output_label(&self, q: f64) -> String {
        match self.stat {
            SummaryStat::Percentile(None) => percentile_label(q, &self.label),
            _ => self.label.clone(),
        }
    }
}

/// `p95_suffix` for `q = 0.95`, `p97.5_suffix` for `q = 0.975`.
pub fn percentile_label(q: f64, suffix: &str) -> String {
    let pct = crate::types::round3(q * 100.0);
    format!("p{}_{suffix}", render_value(&Value::Float64(pct)).trim_end_matches(".0"))
}

/// How a report is computed.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRecipe {
    /// Row/column counts plus one row per metric whose column is present.
    KpiSummary { metrics: Vec<KpiMetric> },
    /// Top-N label counts of `column`, emitted as (`label`, `count`).
    Frequency {
        column: String,
        top_n: usize,
        label: String,
    },
    Grouped(GroupedAggregate),
    /// Row counts per (`row_key`, `column_key`), pivoted wide.
    PivotCounts { row_key: String, column_key: String },
    /// Mean of `target` per (`row_key`, `column_key`), pivoted wide.
    PivotMean {
        row_key: String,
        column_key: String,
        target: String,
    },
    /// Counts per (`group`, `category`) with `total` and `percent` of group.
    GroupShare { group: String, category: String },
}

/// A named report and its recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDefinition {
    pub name: String,
    pub recipe: ReportRecipe,
}

impl ReportDefinition {
    pub fn new(name: impl Into<String>, recipe: ReportRecipe) -> Self {
        Self {
            name: name.into(),
            recipe,
        }
    }

    /// Input columns that must all be present for the report to have rows.
    pub fn required_columns(&self) -> Vec<String> {
        match &self.recipe {
            ReportRecipe::KpiSummary { .. } => Vec::new(),
            ReportRecipe::Frequency { column, .. } => vec![column.clone()],
            ReportRecipe::Grouped(agg) => agg.required_columns(),
            ReportRecipe::PivotCounts {
                row_key,
                column_key,
            }
            | ReportRecipe::GroupShare {
                group: row_key,
                category: column_key,
            } => vec![row_key.clone(), column_key.clone()],
            ReportRecipe::PivotMean {
                row_key,
                column_key,
                target,
            } => vec![row_key.clone(), column_key.clone(), target.clone()],
        }
    }

    /// Headers of the empty table emitted when required columns are missing.
    pub fn declared_schema(&self) -> Schema {
        match &self.recipe {
            ReportRecipe::KpiSummary { .. } => kpi_schema(),
            ReportRecipe::Frequency { label, .. } => Schema::new(vec![
                Field::new(label.clone(), DataType::Utf8),
                Field::new("count", DataType::Int64),
            ]),
            ReportRecipe::Grouped(agg) => agg.output_schema(None),
            ReportRecipe::PivotCounts { row_key, .. } | ReportRecipe::PivotMean { row_key, .. } => {
                Schema::utf8([row_key.clone()])
            }
            ReportRecipe::GroupShare { group, category } => Schema::new(vec![
                Field::new(group.clone(), DataType::Utf8),
                Field::new(category.clone(), DataType::Utf8),
                Field::new("count", DataType::Int64),
                Field::new("total", DataType::Int64),
                Field::new("percent", DataType::Float64),
            ]),
        }
    }
}

pub(crate) fn kpi_schema() -> Schema {
    Schema::new(vec![
        Field::new("metric", DataType::Utf8),
        Field::new("value", DataType::Float64),
    ])
}

/// Metric columns summarized in the KPI table when present.
pub fn default_kpi_metrics() -> Vec<KpiMetric> {
    vec![
        KpiMetric::new("csat_score", "avg_csat", SummaryStat::Mean),
        KpiMetric::new("csat_score", "median_csat", SummaryStat::Median),
        KpiMetric::new("call_duration_in_minutes", "avg_call_duration_min", SummaryStat::Mean),
        KpiMetric::new(
            "call_duration_in_minutes",
            "call_duration_min",
            SummaryStat::Percentile(None),
        ),
        KpiMetric::new("response_time", "avg_response_time", SummaryStat::Mean),
    ]
}

fn csat_by(keys: &[&str], sort: GroupSort) -> ReportRecipe {
    ReportRecipe::Grouped(
        GroupedAggregate::by(keys.iter().copied())
            .mean("csat_score", "avg_csat")
            .count("tickets")
            .sort(sort),
    )
}

/// The call-center report set, in output order.
///
/// Single-key CSAT views list the weakest segments first (ascending mean); multi-key
/// breakdowns list the busiest segments first (descending ticket count).
pub fn default_report_definitions() -> Vec<ReportDefinition> {
    let by_tickets = || GroupSort::Descending("tickets".to_string());
    vec![
        ReportDefinition::new(
            "kpi_summary",
            ReportRecipe::KpiSummary {
                metrics: default_kpi_metrics(),
            },
        ),
        ReportDefinition::new(
            "top_reasons",
            ReportRecipe::Frequency {
                column: "reason".to_string(),
                top_n: 15,
                label: "reason".to_string(),
            },
        ),
        ReportDefinition::new(
            "sentiment",
            ReportRecipe::Frequency {
                column: "sentiment".to_string(),
                top_n: 10,
                label: "sentiment".to_string(),
            },
        ),
        ReportDefinition::new(
            "csat_by_state",
            csat_by(&["state"], GroupSort::Ascending("avg_csat".to_string())),
        ),
        ReportDefinition::new(
            "csat_state_channel_sentiment",
            csat_by(&["state", "channel", "sentiment"], by_tickets()),
        ),
        ReportDefinition::new(
            "channel_callcenter_csat",
            csat_by(&["channel", "call_center"], by_tickets()),
        ),
        ReportDefinition::new(
            "performance_by_call_center",
            ReportRecipe::Grouped(
                GroupedAggregate::by(["call_center"])
                    .mean("csat_score", "avg_csat_score")
                    .mean("call_duration_in_minutes", "avg_call_duration")
                    .sort(GroupSort::Keys),
            ),
        ),
        ReportDefinition::new(
            "query_counts_by_center_and_reason",
            ReportRecipe::Grouped(
                GroupedAggregate::by(["call_center", "reason"])
                    .count("count")
                    .sort(GroupSort::Keys),
            ),
        ),
        ReportDefinition::new(
            "pivot_query_counts",
            ReportRecipe::PivotCounts {
                row_key: "call_center".to_string(),
                column_key: "reason".to_string(),
            },
        ),
        ReportDefinition::new(
            "query_summary",
            ReportRecipe::Grouped(
                GroupedAggregate::by(["call_center", "reason"])
                    .count("query_count")
                    .mean("csat_score", "avg_csat_score")
                    .sort(GroupSort::Keys),
            ),
        ),
        ReportDefinition::new(
            "pivot_avg_csat_score",
            ReportRecipe::PivotMean {
                row_key: "call_center".to_string(),
                column_key: "reason".to_string(),
                target: "csat_score".to_string(),
            },
        ),
        ReportDefinition::new(
            "avg_csat_per_reason",
            ReportRecipe::Grouped(
                GroupedAggregate::by(["reason"])
                    .mean("csat_score", "avg_csat_score")
                    .sort(GroupSort::Keys),
            ),
        ),
        ReportDefinition::new(
            "pivot_response_time_counts",
            ReportRecipe::PivotCounts {
                row_key: "call_center".to_string(),
                column_key: "response_time".to_string(),
            },
        ),
        ReportDefinition::new(
            "response_time_counts_and_percent",
            ReportRecipe::GroupShare {
                group: "call_center".to_string(),
                category: "response_time".to_string(),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{default_report_definitions, percentile_label, ReportRecipe};
    use std::collections::HashSet;

    #[test]
    fn percentile_labels() {
        assert_eq!(percentile_label(0.95, "call_duration_min"), "p95_call_duration_min");
        assert_eq!(percentile_label(0.975, "x"), "p97.5_x");
        assert_eq!(percentile_label(0.5, "x"), "p50_x");
    }

    #[test]
    fn default_names_are_unique() {
        let defs = default_report_definitions();
        let names: HashSet<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names.len(), defs.len());
    }

    #[test]
    fn guards_follow_the_recipe() {
        let defs = default_report_definitions();
        let find = |n: &str| defs.iter().find(|d| d.name == n).unwrap();

        assert!(find("kpi_summary").required_columns().is_empty());
        assert_eq!(find("top_reasons").required_columns(), vec!["reason"]);
        assert_eq!(
            find("csat_state_channel_sentiment").required_columns(),
            vec!["state", "channel", "sentiment", "csat_score"]
        );
        assert_eq!(
            find("pivot_avg_csat_score").required_columns(),
            vec!["call_center", "reason", "csat_score"]
        );
        assert!(matches!(find("sentiment").recipe, ReportRecipe::Frequency { top_n: 10, .. }));
    }

    #[test]
    fn declared_headers_for_grouped_reports() {
        let defs = default_report_definitions();
        let def = defs.iter().find(|d| d.name == "csat_by_state").unwrap();
        assert_eq!(
            def.declared_schema().field_names().collect::<Vec<_>>(),
            vec!["state", "avg_csat", "tickets"]
        );
    }
}
