//! `rust-data-reports` is a small library that turns raw tabular records into a clean, typed
//! in-memory [`types::DataSet`] and builds report tables from it.
//!
//! The input is either raw CSV text (every cell a string, see [`ingestion`]) or a typed result
//! set from a SQL source handed over as a [`types::DataSet`]. The output is a set of named
//! [`report::ReportTable`]s ready to be persisted by the caller (see [`export`]).
//!
//! ## Cleaning
//!
//! [`cleaning::CleaningPipeline`] runs a fixed sequence of stages:
//!
//! - column names become `snake_case` (`"CSAT Score"` → `csat_score`)
//! - text is trimmed and lowercased; sentinel tokens (`""`, `"n/a"`, `"none"`, ...) become
//!   [`types::Value::Null`]
//! - numeric-looking columns are coerced to [`types::DataType::Float64`]; unparseable cells
//!   become `Null` and are counted, never raised
//! - exact duplicate rows are removed
//! - nulls in numeric columns are resolved with the configured [`config::NullPolicy`]: `Strict`
//!   drops the row, `Impute` fills the column median
//!
//! ## Reports
//!
//! [`report::ReportAssembler`] evaluates a declarative list of [`report::ReportDefinition`]s.
//! A report whose required columns are absent is still produced, with its headers and no rows.
//!
//! ```rust
//! use rust_data_reports::cleaning::CleaningPipeline;
//! use rust_data_reports::config::EngineConfig;
//! use rust_data_reports::report::ReportAssembler;
//! use rust_data_reports::types::{DataSet, Schema, Value};
//!
//! # fn main() -> Result<(), rust_data_reports::ReportError> {
//! let raw = DataSet::new(
//!     Schema::utf8(["Reason", "CSAT Score"]),
//!     vec![
//!         vec![Value::text("Billing"), Value::text("4")],
//!         vec![Value::text("billing "), Value::text("2")],
//!         vec![Value::text("Payments"), Value::text("n/a")],
//!     ],
//! );
//!
//! let config = EngineConfig::builder().impute_nulls().build()?;
//! let clean = CleaningPipeline::new(config.clone()).run(&raw)?;
//! assert_eq!(clean.summary.values_imputed, 1);
//!
//! let reports = ReportAssembler::new(config).assemble(&clean.dataset)?;
//! let top = reports.get("top_reasons").unwrap().data();
//! assert_eq!(top.rows[0], vec![Value::text("billing"), Value::Int64(2)]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: schema, values and the in-memory dataset
//! - [`config`]: engine configuration (builder or JSON)
//! - [`cleaning`]: the cleaning pipeline and its individual stages
//! - [`aggregation`]: summaries, frequency tables, grouped aggregates
//! - [`pivot`]: long-to-wide reshaping
//! - [`report`]: report definitions and the assembler
//! - [`profiling`]: data-quality profile
//! - [`observability`]: pipeline events and observers
//! - [`ingestion`] / [`export`]: CSV in, CSV out
//! - [`error`]: error types

pub mod aggregation;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod observability;
pub mod pivot;
pub mod profiling;
pub mod report;
pub mod types;

pub use error::{ConfigError, ReportError, ReportResult};
