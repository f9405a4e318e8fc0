// Standard Error of Measurement and Minimal Detectable Change
//
// SEM = sqrt(MSE_resid) from a one-way ANOVA on the baseline trials with
// athlete as the grouping factor. MDC = SEM x z x sqrt(2); the sqrt(2)
// accounts for the variance of a difference of two measurements.
//
// Classification uses SEM. MDC is reported next to it and flagged per
// athlete, never substituted into the rule.

use crate::config::ThresholdConfig;
use crate::dataset::{group_by_athlete, AthleteId, Dataset, TrialRecord};
use crate::error::{MetricError, Result};
use crate::stats::{one_way_anova, AnovaTable};
use serde::Serialize;
use std::f64::consts::SQRT_2;

/// Classification of a change score against the group SEM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SemClass {
    WithinNormalVariability,
    SignificantIncrease,
    SignificantDecrease,
}

impl SemClass {
    pub fn classify(change_score: f64, sem: f64) -> Self {
        if change_score > sem {
            SemClass::SignificantIncrease
        } else if change_score < -sem {
            SemClass::SignificantDecrease
        } else {
            SemClass::WithinNormalVariability
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SemClass::WithinNormalVariability => "Within Normal Variability",
            SemClass::SignificantIncrease => "Significant Increase",
            SemClass::SignificantDecrease => "Significant Decrease",
        }
    }
}

/// Group SEM with the ANOVA it was taken from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemEstimate {
    pub sem: f64,
    pub anova: AnovaTable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemRow {
    pub athlete: AthleteId,
    pub change_score: f64,
    pub classification: SemClass,
    /// `|change_score| > MDC`
    pub exceeds_mdc: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemReport {
    pub sem: f64,
    pub mdc: f64,
    pub z_critical: f64,
    pub mdc_label: String,
    pub anova: AnovaTable,
    pub rows: Vec<SemRow>,
}

/// Estimate SEM from baseline trial records
///
/// # Errors
/// `DegenerateModel` with fewer than two athletes or any athlete with fewer
/// than two baseline trials, where the residual term is undefined.
pub fn standard_error_of_measurement(baseline: &[TrialRecord]) -> Result<SemEstimate> {
    let groups: Vec<Vec<f64>> = group_by_athlete(baseline).into_values().collect();

    if groups.len() < 2 {
        return Err(MetricError::DegenerateModel {
            reason: format!("one-way ANOVA needs at least 2 athletes, got {}", groups.len()),
        });
    }
    if let Some(smallest) = groups.iter().map(Vec::len).min().filter(|&n| n < 2) {
        return Err(MetricError::DegenerateModel {
            reason: format!(
                "one-way ANOVA needs at least 2 trials per athlete, got {}",
                smallest
            ),
        });
    }

    let anova = one_way_anova(&groups).ok_or_else(|| MetricError::DegenerateModel {
        reason: "residual mean square has zero degrees of freedom".to_string(),
    })?;

    Ok(SemEstimate {
        sem: anova.ms_within.sqrt(),
        anova,
    })
}

/// MDC = SEM x z x sqrt(2)
pub fn minimal_detectable_change(sem: f64, z_critical: f64) -> f64 {
    sem * z_critical * SQRT_2
}

/// Classify every athlete's change score against the group SEM
pub fn evaluate_sem(dataset: &Dataset, thresholds: &ThresholdConfig) -> Result<SemReport> {
    let SemEstimate { sem, anova } = standard_error_of_measurement(&dataset.baseline())?;
    let mdc = minimal_detectable_change(sem, thresholds.z_critical);

    tracing::debug!(sem, mdc, df_within = anova.df_within, "group SEM estimated");

    let rows = dataset
        .summaries()
        .iter()
        .map(|s| SemRow {
            athlete: s.athlete,
            change_score: s.change_score,
            classification: SemClass::classify(s.change_score, sem),
            exceeds_mdc: s.change_score.abs() > mdc,
        })
        .collect();

    Ok(SemReport {
        sem,
        mdc,
        z_critical: thresholds.z_critical,
        mdc_label: thresholds.mdc_label(),
        anova,
        rows,
    })
}
