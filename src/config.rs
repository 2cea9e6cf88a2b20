//! Engine configuration.
//!
//! Everything the cleaning pipeline and report assembler need is passed in explicitly as an
//! [`EngineConfig`]; nothing is read from the environment.
//!
//! ```rust
//! use rust_data_reports::config::{EngineConfig, NullPolicy};
//!
//! let cfg = EngineConfig::builder().impute_nulls().top_n(5).build().unwrap();
//! assert_eq!(cfg.null_policy, NullPolicy::Impute);
//!
//! // Selecting both policies is rejected up front.
//! assert!(EngineConfig::builder().impute_nulls().drop_null_rows().build().is_err());
//! ```

use std::num::NonZeroUsize;

use serde::Deserialize;

use crate::error::{ConfigError, ReportResult};

/// How nulls remaining in numeric columns are resolved after coercion.
///
/// The two strategies are mutually exclusive and apply to every numeric column alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Drop every row that has a null in any numeric column.
    #[default]
    Strict,
    /// Replace nulls with the column median (all-null columns become 0).
    Impute,
}

/// Options shared by [`crate::cleaning::CleaningPipeline`] and
/// [`crate::report::ReportAssembler`].
///
/// Use [`Default`] for common cases, or [`EngineConfig::builder`] to get validation.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Null-resolution strategy for numeric columns.
    pub null_policy: NullPolicy,
    /// Overrides every frequency report's own top-N when set.
    pub top_n: Option<NonZeroUsize>,
    /// Percentile (in `[0, 1]`) reported by summary statistics.
    pub percentile: f64,
    /// Value written into pivot cells with no matching long-form row.
    pub pivot_fill: f64,
    /// Drop rows whose every cell is null (after null canonicalization).
    pub drop_empty_rows: bool,
    /// Drop columns whose every cell is null (after null canonicalization).
    pub drop_empty_columns: bool,
    /// Evaluate grouped aggregates partition-by-partition on the rayon pool.
    pub parallel_groups: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            null_policy: NullPolicy::default(),
            top_n: None,
            percentile: 0.95,
            pivot_fill: 0.0,
            drop_empty_rows: false,
            drop_empty_columns: false,
            parallel_groups: false,
        }
    }
}

impl EngineConfig {
    /// Start building a validated configuration.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse a JSON configuration document.
    ///
    /// `null_policy` may be a single policy name or a list of names; a list that selects both
    /// policies is rejected with [`ConfigError::AmbiguousPolicy`].
    pub fn from_json_str(s: &str) -> ReportResult<Self> {
        let raw: RawEngineConfig = serde_json::from_str(s)?;
        Ok(raw.into_config()?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.percentile) {
            return Err(ConfigError::InvalidPercentile(self.percentile));
        }
        if !self.pivot_fill.is_finite() {
            return Err(ConfigError::InvalidPivotFill(self.pivot_fill));
        }
        Ok(())
    }

    /// Top-N for a report, honoring the global override.
    pub fn top_n_or(&self, report_default: usize) -> usize {
        self.top_n.map(NonZeroUsize::get).unwrap_or(report_default)
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    policies: Vec<NullPolicy>,
    top_n: Option<usize>,
    percentile: Option<f64>,
    pivot_fill: Option<f64>,
    drop_empty_rows: bool,
    drop_empty_columns: bool,
    parallel_groups: bool,
}

impl EngineConfigBuilder {
    /// Select a null policy.
    pub fn null_policy(mut self, policy: NullPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Select [`NullPolicy::Impute`].
    pub fn impute_nulls(self) -> Self {
        self.null_policy(NullPolicy::Impute)
    }

    /// Select [`NullPolicy::Strict`].
    pub fn drop_null_rows(self) -> Self {
        self.null_policy(NullPolicy::Strict)
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn percentile(mut self, q: f64) -> Self {
        self.percentile = Some(q);
        self
    }

    pub fn pivot_fill(mut self, fill: f64) -> Self {
        self.pivot_fill = Some(fill);
        self
    }

    pub fn drop_empty_rows(mut self, on: bool) -> Self {
        self.drop_empty_rows = on;
        self
    }

    pub fn drop_empty_columns(mut self, on: bool) -> Self {
        self.drop_empty_columns = on;
        self
    }

    pub fn parallel_groups(mut self, on: bool) -> Self {
        self.parallel_groups = on;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        let defaults = EngineConfig::default();
        let top_n = match self.top_n {
            Some(n) => Some(NonZeroUsize::new(n).ok_or(ConfigError::InvalidTopN)?),
            None => None,
        };
        let cfg = EngineConfig {
            null_policy: resolve_policy(&self.policies)?,
            top_n,
            percentile: self.percentile.unwrap_or(defaults.percentile),
            pivot_fill: self.pivot_fill.unwrap_or(defaults.pivot_fill),
            drop_empty_rows: self.drop_empty_rows,
            drop_empty_columns: self.drop_empty_columns,
            parallel_groups: self.parallel_groups,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

fn resolve_policy(requested: &[NullPolicy]) -> Result<NullPolicy, ConfigError> {
    match requested.split_first() {
        None => Ok(NullPolicy::default()),
        Some((first, rest)) if rest.iter().all(|p| p == first) => Ok(*first),
        Some(_) => Err(ConfigError::AmbiguousPolicy),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PolicySelection {
    One(NullPolicy),
    Many(Vec<NullPolicy>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEngineConfig {
    #[serde(default)]
    null_policy: Option<PolicySelection>,
    #[serde(default)]
    top_n: Option<usize>,
    #[serde(default)]
    percentile: Option<f64>,
    #[serde(default)]
    pivot_fill: Option<f64>,
    #[serde(default)]
    drop_empty_rows: bool,
    #[serde(default)]
    drop_empty_columns: bool,
    #[serde(default)]
    parallel_groups: bool,
}

impl RawEngineConfig {
    fn into_config(self) -> Result<EngineConfig, ConfigError> {
        let mut b = EngineConfig::builder()
            .drop_empty_rows(self.drop_empty_rows)
            .drop_empty_columns(self.drop_empty_columns)
            .parallel_groups(self.parallel_groups);
        match self.null_policy {
            Some(PolicySelection::One(p)) => b = b.null_policy(p),
            Some(PolicySelection::Many(ps)) => {
                for p in ps {
                    b = b.null_policy(p);
                }
            }
            None => {}
        }
        if let Some(n) = self.top_n {
            b = b.top_n(n);
        }
        if let Some(q) = self.percentile {
            b = b.percentile(q);
        }
        if let Some(fill) = self.pivot_fill {
            b = b.pivot_fill(fill);
        }
        b.build()
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineConfig, NullPolicy};
    use crate::error::ConfigError;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.null_policy, NullPolicy::Strict);
        assert_eq!(cfg.percentile, 0.95);
        assert_eq!(cfg.pivot_fill, 0.0);
        assert_eq!(cfg.top_n_or(15), 15);
        assert_eq!(EngineConfig::builder().build().unwrap(), cfg);
    }

    #[test]
    fn repeating_the_same_policy_is_not_ambiguous() {
        let cfg = EngineConfig::builder()
            .impute_nulls()
            .null_policy(NullPolicy::Impute)
            .build()
            .unwrap();
        assert_eq!(cfg.null_policy, NullPolicy::Impute);
    }

    #[test]
    fn both_policies_are_rejected() {
        let err = EngineConfig::builder()
            .drop_null_rows()
            .impute_nulls()
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::AmbiguousPolicy);
    }

    #[test]
    fn range_checks() {
        assert_eq!(
            EngineConfig::builder().top_n(0).build().unwrap_err(),
            ConfigError::InvalidTopN
        );
        assert!(matches!(
            EngineConfig::builder().percentile(1.5).build().unwrap_err(),
            ConfigError::InvalidPercentile(_)
        ));
        assert!(matches!(
            EngineConfig::builder().pivot_fill(f64::NAN).build().unwrap_err(),
            ConfigError::InvalidPivotFill(_)
        ));
    }

    #[test]
    fn top_n_override_applies_to_every_report() {
        let cfg = EngineConfig::builder().top_n(3).build().unwrap();
        assert_eq!(cfg.top_n_or(15), 3);
        assert_eq!(cfg.top_n_or(10), 3);
    }
}
