//! Simulate, reshape, run each method independently
//!
//! A method that fails keeps its error in its [`MethodOutcome`]; the others
//! still run.

use crate::config::{ReportConfig, ThresholdConfig};
use crate::dataset::{Dataset, WideRecord};
use crate::error::MetricError;
use crate::methods::{self, Method, MethodReport};
use crate::simulate::simulate;
use anyhow::{Context, Result};

/// Result of one method over the dataset
#[derive(Debug, Clone)]
pub struct MethodOutcome {
    pub method: Method,
    pub result: std::result::Result<MethodReport, MetricError>,
}

/// Everything a presenter needs for one run
#[derive(Debug, Clone)]
pub struct Report {
    pub config: ReportConfig,
    /// Simulated wide rows
    pub wide: Vec<WideRecord>,
    pub dataset: Dataset,
    pub outcomes: Vec<MethodOutcome>,
}

impl Report {
    pub fn failed_methods(&self) -> Vec<Method> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.method)
            .collect()
    }
}

/// Run every requested method over the same dataset
pub fn analyze(dataset: &Dataset, thresholds: &ThresholdConfig, selected: &[Method]) -> Vec<MethodOutcome> {
    selected
        .iter()
        .map(|&method| {
            let result = methods::evaluate(method, dataset, thresholds);
            match &result {
                Ok(report) => tracing::info!(
                    %method,
                    flagged = report.flagged_count(),
                    "method complete"
                ),
                Err(e) => tracing::warn!(%method, error = %e, "method failed"),
            }
            MethodOutcome { method, result }
        })
        .collect()
}

/// Full run: simulate a cohort from `config` and analyze it
///
/// An empty `selected` runs all four methods.
pub fn run(config: &ReportConfig, selected: &[Method]) -> Result<Report> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let wide = simulate(&config.simulation)?;
    let dataset = Dataset::from_wide(&wide).context("Failed to reshape simulated cohort")?;

    let selected = if selected.is_empty() {
        &Method::ALL[..]
    } else {
        selected
    };
    let outcomes = analyze(&dataset, &config.thresholds, selected);

    let report = Report {
        config: config.clone(),
        wide,
        dataset,
        outcomes,
    };
    tracing::info!(
        methods = report.outcomes.len(),
        failed = ?report.failed_methods(),
        "analysis complete"
    );
    Ok(report)
}
