//! Report configuration
//!
//! Simulation parameters and method thresholds. Loaded from TOML with every
//! field defaulted, so a partial file only overrides what it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters for the synthetic repeated-trials cohort
///
/// `baseline_means`, `follow_up_means` and `trial_sds` hold one entry per
/// trial; their common length is the number of trials per timepoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the deterministic generator
    pub seed: u64,
    pub athletes: usize,
    pub baseline_means: Vec<f64>,
    pub follow_up_means: Vec<f64>,
    pub trial_sds: Vec<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 2024,
            athletes: 15,
            baseline_means: vec![1500.0, 1510.0, 1490.0],
            follow_up_means: vec![1550.0, 1560.0, 1540.0],
            trial_sds: vec![200.0, 125.0, 130.0],
        }
    }
}

impl SimulationConfig {
    pub fn trials(&self) -> usize {
        self.trial_sds.len()
    }
}

/// Multipliers used by the change-detection methods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Critical z value for MDC
    ///
    /// - 1.645 (default): MDC90, 90% two-sided / 95% one-sided confidence
    /// - 1.96: MDC95
    /// - 1.282: MDC80
    pub z_critical: f64,

    /// Fraction of an athlete's standard deviation that counts as worthwhile
    pub swc_fraction: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            z_critical: 1.645,
            swc_fraction: 0.2,
        }
    }
}

impl ThresholdConfig {
    /// Create a strict configuration (MDC95)
    pub fn strict() -> Self {
        Self {
            z_critical: 1.96,
            ..Self::default()
        }
    }

    /// Create a lenient configuration (MDC80)
    pub fn lenient() -> Self {
        Self {
            z_critical: 1.282,
            ..Self::default()
        }
    }

    /// Confidence level implied by `z_critical`, for labels like "MDC90"
    pub fn mdc_label(&self) -> String {
        let known = [(1.282, 80), (1.645, 90), (1.96, 95), (2.576, 99)];
        known
            .iter()
            .find(|(z, _)| (z - self.z_critical).abs() < 1e-9)
            .map(|(_, level)| format!("MDC{}", level))
            .unwrap_or_else(|| format!("MDC(z={})", self.z_critical))
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub simulation: SimulationConfig,
    pub thresholds: ThresholdConfig,
}

impl ReportConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read, isn't valid TOML, or fails
    /// validation.
    ///
    /// # Example TOML
    /// ```toml
    /// [simulation]
    /// seed = 7
    /// athletes = 20
    ///
    /// [thresholds]
    /// z_critical = 1.96
    /// ```
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ReportConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let sim = &self.simulation;

        if sim.athletes == 0 {
            return Err("athletes must be >= 1, got 0".to_string());
        }

        if sim.trial_sds.is_empty() {
            return Err("trial_sds must list at least one trial".to_string());
        }

        if sim.baseline_means.len() != sim.trials() || sim.follow_up_means.len() != sim.trials() {
            return Err(format!(
                "baseline_means ({}), follow_up_means ({}) and trial_sds ({}) must have the same length",
                sim.baseline_means.len(),
                sim.follow_up_means.len(),
                sim.trial_sds.len()
            ));
        }

        if let Some(m) = sim
            .baseline_means
            .iter()
            .chain(&sim.follow_up_means)
            .find(|m| !m.is_finite())
        {
            return Err(format!("trial means must be finite, got {}", m));
        }

        if let Some(sd) = sim.trial_sds.iter().find(|sd| !(sd.is_finite() && **sd > 0.0)) {
            return Err(format!("trial_sds must be positive and finite, got {}", sd));
        }

        let t = &self.thresholds;
        if !(t.z_critical.is_finite() && t.z_critical > 0.0) {
            return Err(format!("z_critical must be positive, got {}", t.z_critical));
        }

        if !(t.swc_fraction.is_finite() && t.swc_fraction > 0.0) {
            return Err(format!("swc_fraction must be positive, got {}", t.swc_fraction));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ReportConfig::default();
        assert_eq!(config.simulation.athletes, 15);
        assert_eq!(config.simulation.trials(), 3);
        assert_eq!(config.simulation.trial_sds, vec![200.0, 125.0, 130.0]);
        assert_eq!(config.thresholds.z_critical, 1.645);
        assert_eq!(config.thresholds.swc_fraction, 0.2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mdc_labels() {
        assert_eq!(ThresholdConfig::default().mdc_label(), "MDC90");
        assert_eq!(ThresholdConfig::strict().mdc_label(), "MDC95");
        assert_eq!(ThresholdConfig::lenient().mdc_label(), "MDC80");
        let custom = ThresholdConfig {
            z_critical: 2.0,
            swc_fraction: 0.2,
        };
        assert_eq!(custom.mdc_label(), "MDC(z=2)");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ReportConfig::from_toml_str(
            r#"
            [simulation]
            seed = 7
            athletes = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.athletes, 20);
        assert_eq!(config.simulation.trials(), 3);
        assert_eq!(config.thresholds, ThresholdConfig::default());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds]\nz_critical = 1.96\nswc_fraction = 0.3").unwrap();

        let config = ReportConfig::from_toml(file.path()).unwrap();
        assert_eq!(config.thresholds.z_critical, 1.96);
        assert_eq!(config.thresholds.swc_fraction, 0.3);
    }

    #[test]
    fn test_missing_file() {
        let err = ReportConfig::from_toml("/nonexistent/realchange.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ReportConfig::from_toml_str("[simulation\nseed = ").is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_athletes() {
        let mut config = ReportConfig::default();
        config.simulation.athletes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_mismatched_trial_vectors() {
        let mut config = ReportConfig::default();
        config.simulation.follow_up_means = vec![1500.0];
        let err = config.validate().unwrap_err();
        assert!(err.contains("same length"));
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_non_positive_sd() {
        let mut config = ReportConfig::default();
        config.simulation.trial_sds = vec![200.0, 0.0, 130.0];
        assert!(config.validate().is_err());
    }

    #[test]
    #[allow(clippy::field_reassign_with_default)]
    fn test_invalid_thresholds() {
        let mut config = ReportConfig::default();
        config.thresholds.z_critical = -1.0;
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.thresholds.swc_fraction = f64::NAN;
        assert!(config.validate().is_err());
    }
}
