// Coefficient of Variation
//
// CV% = sd(baseline trials) / mean(baseline trials) x 100, per athlete,
// sample sd (n - 1). The only method whose threshold is athlete-specific
// and compared on the percentage scale: |percent_change| against CV%.

use crate::dataset::{aggregate_by_athlete, AthleteId, Dataset};
use crate::error::{MetricError, Result};
use crate::stats::{mean, sample_sd};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CvClass {
    WithinNormalVariability,
    BeyondNormalVariability,
}

impl CvClass {
    /// A CV% of zero is exceeded by any nonzero percent change.
    pub fn classify(percent_change: f64, cv_percent: f64) -> Self {
        if percent_change.abs() > cv_percent {
            CvClass::BeyondNormalVariability
        } else {
            CvClass::WithinNormalVariability
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CvClass::WithinNormalVariability => "Within Normal Variability",
            CvClass::BeyondNormalVariability => "Beyond Normal Variability",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvRow {
    pub athlete: AthleteId,
    pub baseline_mean: f64,
    pub baseline_sd: f64,
    pub cv_percent: f64,
    pub percent_change: f64,
    pub classification: CvClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CvReport {
    /// Mean of the athlete CV% values
    pub mean_cv_percent: f64,
    pub rows: Vec<CvRow>,
}

/// CV% of a sample
///
/// # Errors
/// `InsufficientTrials` with fewer than two values, `UndefinedRatio` when the
/// mean is zero or negative.
pub fn coefficient_of_variation(athlete: AthleteId, values: &[f64]) -> Result<(f64, f64, f64)> {
    let sd = sample_sd(values).ok_or_else(|| {
        MetricError::insufficient(
            format!("baseline trials for athlete {athlete}"),
            2,
            values.len(),
        )
    })?;
    // sample_sd succeeded, so values is non-empty
    let m = mean(values).unwrap_or(f64::NAN);
    if m.is_nan() || m <= 0.0 {
        return Err(MetricError::UndefinedRatio { athlete, mean: m });
    }
    Ok((m, sd, sd / m * 100.0))
}

/// Compare each athlete's percent change to their own baseline CV%
pub fn evaluate_cv(dataset: &Dataset) -> Result<CvReport> {
    let baseline = aggregate_by_athlete(&dataset.baseline(), coefficient_of_variation)?;

    let mut rows = Vec::with_capacity(dataset.athlete_count());
    for summary in dataset.summaries() {
        let &(baseline_mean, baseline_sd, cv_percent) =
            baseline.get(&summary.athlete).ok_or_else(|| {
                MetricError::insufficient(
                    format!("baseline trials for athlete {}", summary.athlete),
                    2,
                    0,
                )
            })?;
        let percent_change = summary.percent_change.ok_or(MetricError::UndefinedRatio {
            athlete: summary.athlete,
            mean: summary.timepoint_1_mean,
        })?;

        rows.push(CvRow {
            athlete: summary.athlete,
            baseline_mean,
            baseline_sd,
            cv_percent,
            percent_change,
            classification: CvClass::classify(percent_change, cv_percent),
        });
    }

    let cvs: Vec<f64> = rows.iter().map(|r| r.cv_percent).collect();
    let mean_cv_percent = mean(&cvs).ok_or_else(|| MetricError::insufficient("athletes", 1, 0))?;
    tracing::debug!(mean_cv_percent, athletes = rows.len(), "athlete CV% computed");

    Ok(CvReport {
        mean_cv_percent,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_support::dataset;

    #[test]
    fn test_cv_of_constant_baseline_is_zero() {
        let (m, sd, cv) = coefficient_of_variation(AthleteId(1), &[1500.0, 1500.0, 1500.0]).unwrap();
        assert_eq!(m, 1500.0);
        assert_eq!(sd, 0.0);
        assert_eq!(cv, 0.0);
    }

    #[test]
    fn test_cv_value() {
        let (_, sd, cv) = coefficient_of_variation(AthleteId(1), &[1500.0, 1520.0, 1480.0]).unwrap();
        assert!((sd - 20.0).abs() < 1e-12);
        assert!((cv - 20.0 / 1500.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_cv_with_nonzero_change_is_beyond() {
        let ds = dataset(&[(&[1500.0, 1500.0, 1500.0], &[1501.0, 1501.0, 1501.0])]);
        let report = evaluate_cv(&ds).unwrap();
        assert_eq!(report.rows[0].cv_percent, 0.0);
        assert_eq!(report.rows[0].classification, CvClass::BeyondNormalVariability);
    }

    #[test]
    fn test_zero_cv_with_zero_change_is_within() {
        assert_eq!(CvClass::classify(0.0, 0.0), CvClass::WithinNormalVariability);
    }

    #[test]
    fn test_negative_change_uses_magnitude() {
        assert_eq!(CvClass::classify(-5.0, 2.0), CvClass::BeyondNormalVariability);
        assert_eq!(CvClass::classify(-1.0, 2.0), CvClass::WithinNormalVariability);
    }

    #[test]
    fn test_zero_mean_is_undefined_ratio() {
        let ds = dataset(&[(&[-1.0, 0.0, 1.0], &[2.0, 2.0, 2.0])]);
        assert!(matches!(
            evaluate_cv(&ds),
            Err(MetricError::UndefinedRatio {
                athlete: AthleteId(1),
                ..
            })
        ));
    }

    #[test]
    fn test_negative_mean_is_undefined_ratio() {
        let err = coefficient_of_variation(AthleteId(2), &[-10.0, -12.0]).unwrap_err();
        assert_eq!(err.kind(), "UndefinedRatio");
    }

    #[test]
    fn test_single_baseline_trial_is_insufficient() {
        let ds = dataset(&[(&[1500.0], &[1600.0])]);
        assert!(matches!(
            evaluate_cv(&ds),
            Err(MetricError::InsufficientTrials { .. })
        ));
    }

    #[test]
    fn test_mean_cv_across_athletes() {
        let ds = dataset(&[
            (&[90.0, 110.0], &[100.0, 100.0]),
            (&[100.0, 100.0], &[100.0, 100.0]),
        ]);
        let report = evaluate_cv(&ds).unwrap();
        let expected = (200.0_f64).sqrt() / 100.0 * 100.0 / 2.0;
        assert!((report.mean_cv_percent - expected).abs() < 1e-9);
    }
}
