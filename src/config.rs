//! Experiment configurations.
//!
//! Each struct deserializes from any serde format, filling omitted fields
//! with the defaults of the standard experiments, and is checked by
//! `validate` before any simulation starts.

use crate::base::{BaseDistribution, BaseName};
use crate::distr::{Method, MethodName, PredictiveMethod};
use crate::dp::PolyaPredictive;
use crate::error::{Result, UrnError};
use crate::prelude::*;
use crate::urn::PolyaParameters;

use serde::{Deserialize, Serialize};

fn default_method() -> MethodName {
    MethodName::PolyaDp
}

fn default_grid_size() -> usize {
    100
}

fn default_tmax() -> f64 {
    1.0
}

fn default_record_every() -> usize {
    1
}

fn default_stream_seed() -> u64 {
    2025
}

fn default_alpha() -> f64 {
    5.0
}

fn default_base() -> BaseName {
    BaseName::Uniform
}

fn default_replicates() -> usize {
    200
}

fn default_tail_length() -> usize {
    50_000
}

fn default_level() -> f64 {
    0.95
}

fn default_coverage_seed() -> u64 {
    123
}

fn default_workers() -> usize {
    1
}

fn default_panel_n() -> usize {
    150
}

fn default_panel_thresholds() -> Vec<f64> {
    vec![0.25, 0.5, 0.75]
}

fn default_panel_alphas() -> Vec<f64> {
    vec![1.0, 5.0, 20.0]
}

fn default_panel_target_length() -> usize {
    1000
}

fn default_panel_draws() -> usize {
    2000
}

fn default_panel_seed() -> u64 {
    20250101
}

/// One prequential evaluation stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_method")]
    pub method: MethodName,
    pub n: usize,
    /// Number of evaluation grid points J.
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default)]
    pub tmin: f64,
    #[serde(default = "default_tmax")]
    pub tmax: f64,
    /// Distances are computed every `record_every` steps and at the last step.
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default = "default_stream_seed")]
    pub seed: u64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_base")]
    pub base: BaseName,
}

impl StreamConfig {
    pub fn new(n: usize) -> Self {
        Self {
            method: default_method(),
            n,
            grid_size: default_grid_size(),
            tmin: 0.0,
            tmax: default_tmax(),
            record_every: default_record_every(),
            seed: default_stream_seed(),
            alpha: default_alpha(),
            base: default_base(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        Concentration::new(self.alpha)?;
        if self.grid_size == 0 {
            return Err(UrnError::EmptyGrid);
        }
        if self.record_every == 0 {
            return Err(UrnError::InvalidRecordEvery);
        }
        Ok(())
    }

    pub fn build_method(&self) -> Result<Method> {
        self.validate()?;
        match self.method {
            MethodName::PolyaDp => Ok(Method::PolyaDp(PolyaPredictive::new(
                PolyaParameters::new(
                    Concentration::new(self.alpha)?,
                    BaseDistribution::standard(self.base),
                ),
            ))),
        }
    }

    pub fn method_name(&self) -> Result<&'static str> {
        Ok(self.build_method()?.name())
    }
}

/// A batch of coverage replicates over the product `n_values x replicates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageConfig {
    pub n_values: Vec<usize>,
    /// Number of Monte Carlo replicates M per n.
    #[serde(default = "default_replicates")]
    pub replicates: usize,
    pub thresholds: Vec<f64>,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_base")]
    pub base: BaseName,
    /// Continuation length L used for the Monte Carlo target.
    #[serde(default = "default_tail_length")]
    pub tail_length: usize,
    #[serde(default = "default_level")]
    pub level: f64,
    #[serde(default = "default_coverage_seed")]
    pub seed: u64,
    /// 1 runs sequentially, 0 uses all available parallelism.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl CoverageConfig {
    pub fn new(n_values: Vec<usize>, thresholds: Vec<f64>, alpha: f64) -> Self {
        Self {
            n_values,
            replicates: default_replicates(),
            thresholds,
            alpha,
            base: default_base(),
            tail_length: default_tail_length(),
            level: default_level(),
            seed: default_coverage_seed(),
            workers: default_workers(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        Concentration::new(self.alpha)?;
        Level::new(self.level)?;
        if self.thresholds.is_empty() {
            return Err(UrnError::EmptyThresholds);
        }
        if self.tail_length == 0 {
            return Err(UrnError::ZeroContinuation);
        }
        if self.n_values.contains(&0) {
            return Err(UrnError::ZeroSampleSize);
        }
        Ok(())
    }
}

/// Continuation panels of P((-inf, t]) over a (threshold x alpha) grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Length of the observed prefix; 0 gives prior panels.
    #[serde(default = "default_panel_n")]
    pub n: usize,
    #[serde(default = "default_panel_thresholds")]
    pub thresholds: Vec<f64>,
    #[serde(default = "default_panel_alphas")]
    pub alphas: Vec<f64>,
    /// Total length M of each continued trajectory.
    #[serde(default = "default_panel_target_length")]
    pub target_length: usize,
    /// Continuations N per panel.
    #[serde(default = "default_panel_draws")]
    pub draws: usize,
    #[serde(default = "default_base")]
    pub base: BaseName,
    #[serde(default = "default_panel_seed")]
    pub seed: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            n: default_panel_n(),
            thresholds: default_panel_thresholds(),
            alphas: default_panel_alphas(),
            target_length: default_panel_target_length(),
            draws: default_panel_draws(),
            base: default_base(),
            seed: default_panel_seed(),
        }
    }
}

impl PanelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.thresholds.is_empty() {
            return Err(UrnError::EmptyThresholds);
        }
        if self.alphas.is_empty() {
            return Err(UrnError::EmptyConcentrations);
        }
        for &alpha in &self.alphas {
            Concentration::new(alpha)?;
        }
        if self.target_length < self.n {
            return Err(UrnError::ContinuationTooShort {
                target: self.target_length,
                have: self.n,
            });
        }
        if self.target_length == 0 {
            return Err(UrnError::ZeroContinuation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coverage_defaults_from_json() {
        let config: CoverageConfig =
            serde_json::from_str(r#"{"n_values": [100], "thresholds": [0.5], "alpha": 5.0}"#)
                .unwrap();
        assert_eq!(config.replicates, 200);
        assert_eq!(config.tail_length, 50_000);
        assert_eq!(config.level, 0.95);
        assert_eq!(config.seed, 123);
        assert_eq!(config.workers, 1);
        assert_eq!(config.base, BaseName::Uniform);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_coverage_validation() {
        let mut config = CoverageConfig::new(vec![100], vec![0.5], -1.0);
        assert!(matches!(
            config.validate(),
            Err(UrnError::NonPositiveConcentration(_))
        ));
        config.alpha = 5.0;
        config.thresholds.clear();
        assert!(matches!(config.validate(), Err(UrnError::EmptyThresholds)));
        config.thresholds.push(0.5);
        config.tail_length = 0;
        assert!(matches!(config.validate(), Err(UrnError::ZeroContinuation)));
        config.tail_length = 10;
        config.n_values.push(0);
        assert!(matches!(config.validate(), Err(UrnError::ZeroSampleSize)));
    }

    #[test]
    fn test_stream_config() {
        let config: StreamConfig =
            serde_json::from_str(r#"{"n": 50, "base": "normal", "method": "polya_dp"}"#).unwrap();
        assert_eq!(config.grid_size, 100);
        assert_eq!(config.record_every, 1);
        assert_eq!(config.base, BaseName::Normal);
        assert_eq!(config.method_name().unwrap(), "polya_dp");
        let bad: std::result::Result<StreamConfig, _> =
            serde_json::from_str(r#"{"n": 50, "base": "beta"}"#);
        assert!(bad.is_err());
        let mut config = StreamConfig::new(10);
        config.record_every = 0;
        assert!(matches!(config.validate(), Err(UrnError::InvalidRecordEvery)));
    }

    #[test]
    fn test_panel_config() {
        let config = PanelConfig::default();
        assert!(config.validate().is_ok());
        let config = PanelConfig {
            n: 50,
            target_length: 20,
            ..PanelConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(UrnError::ContinuationTooShort { .. })
        ));
    }
}
