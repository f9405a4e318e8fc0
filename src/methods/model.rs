// Model Statistic: athlete-level SEM
//
// Every trial of one athlete, both timepoints pooled, is treated as repeated
// measures of that athlete. SS over the athlete's own mean, df = n - 1,
// SEM_athlete = sqrt(SS / df). Unlike the group SEM, the error term follows
// each athlete's own variability.

use crate::config::ThresholdConfig;
use crate::dataset::{aggregate_by_athlete, AthleteId, Dataset};
use crate::error::{MetricError, Result};
use crate::methods::sem::minimal_detectable_change;
use crate::stats::sum_squared_deviations;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelClass {
    TrueDifference,
    TrivialDifference,
}

impl ModelClass {
    pub fn classify(mean_diff: f64, sem: f64) -> Self {
        if mean_diff.abs() > sem {
            ModelClass::TrueDifference
        } else {
            ModelClass::TrivialDifference
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelClass::TrueDifference => "True Difference",
            ModelClass::TrivialDifference => "Trivial Difference",
        }
    }
}

/// Presentation split of `TrueDifference` by sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelDirection {
    PositiveChange,
    NegativeChange,
    TrivialDifference,
}

impl ModelDirection {
    pub fn from_class(class: ModelClass, mean_diff: f64) -> Self {
        match class {
            ModelClass::TrivialDifference => ModelDirection::TrivialDifference,
            ModelClass::TrueDifference if mean_diff > 0.0 => ModelDirection::PositiveChange,
            ModelClass::TrueDifference => ModelDirection::NegativeChange,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelDirection::PositiveChange => "Positive Change",
            ModelDirection::NegativeChange => "Negative Change",
            ModelDirection::TrivialDifference => "Trivial Difference",
        }
    }
}

/// Error term of one athlete's pooled trials
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AthleteErrorTerm {
    pub ss: f64,
    pub df: usize,
    pub mse: f64,
    pub sem: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRow {
    pub athlete: AthleteId,
    pub trials: usize,
    #[serde(flatten)]
    pub error_term: AthleteErrorTerm,
    /// Athlete-level MDC = SEM_athlete x z x sqrt(2)
    pub mdc: f64,
    pub mean_diff: f64,
    pub classification: ModelClass,
    pub direction: ModelDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub z_critical: f64,
    pub rows: Vec<ModelRow>,
}

/// SS, df, MSE and SEM of one athlete's measurements
///
/// # Errors
/// `InsufficientTrials` with fewer than two measurements (df would be zero).
pub fn athlete_error_term(athlete: AthleteId, values: &[f64]) -> Result<AthleteErrorTerm> {
    if values.len() < 2 {
        return Err(MetricError::insufficient(
            format!("measurements for athlete {athlete}"),
            2,
            values.len(),
        ));
    }
    let ss = sum_squared_deviations(values).unwrap_or_default();
    let df = values.len() - 1;
    let mse = ss / df as f64;
    Ok(AthleteErrorTerm {
        ss,
        df,
        mse,
        sem: mse.sqrt(),
    })
}

/// Classify each athlete's mean difference against their own SEM
pub fn evaluate_model(dataset: &Dataset, thresholds: &ThresholdConfig) -> Result<ModelReport> {
    let error_terms = aggregate_by_athlete(dataset.records(), athlete_error_term)?;

    let rows = dataset
        .summaries()
        .iter()
        .map(|summary| {
            let error_term = *error_terms.get(&summary.athlete).ok_or_else(|| {
                MetricError::insufficient(format!("measurements for athlete {}", summary.athlete), 2, 0)
            })?;
            let mean_diff = summary.timepoint_2_mean - summary.timepoint_1_mean;
            let classification = ModelClass::classify(mean_diff, error_term.sem);

            Ok(ModelRow {
                athlete: summary.athlete,
                trials: error_term.df + 1,
                error_term,
                mdc: minimal_detectable_change(error_term.sem, thresholds.z_critical),
                mean_diff,
                classification,
                direction: ModelDirection::from_class(classification, mean_diff),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(athletes = rows.len(), "athlete-level SEM computed");

    Ok(ModelReport {
        z_critical: thresholds.z_critical,
        rows,
    })
}
