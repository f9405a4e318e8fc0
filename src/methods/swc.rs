// Smallest Worthwhile Change
//
// SWC_athlete = fraction x sd(all of the athlete's trials, both timepoints).
// |change_score| > SWC is a meaningful change.
//
// Typical Error is a group-level noise estimate from adjacent baseline
// trials: sd across athletes of (trial k+1 - trial k) for every adjacent
// pair, averaged, divided by sqrt(2). It only drives presentation: a
// meaningful change whose change +/- TE interval touches the +/-SWC band is
// shown as unclear.

use crate::config::ThresholdConfig;
use crate::dataset::{sd_by_athlete, AthleteId, Dataset, TrialRecord};
use crate::error::{MetricError, Result};
use crate::stats::{mean, sample_sd};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::SQRT_2;

/// Primary classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwcClass {
    MeaningfulChange,
    TrivialChange,
}

impl SwcClass {
    pub fn classify(change_score: f64, swc: f64) -> Self {
        if change_score.abs() > swc {
            SwcClass::MeaningfulChange
        } else {
            SwcClass::TrivialChange
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SwcClass::MeaningfulChange => "Meaningful Change",
            SwcClass::TrivialChange => "Trivial Change",
        }
    }
}

/// Presentation category after the typical-error check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwcBand {
    /// Meaningful, and the error bar stays clear of the SWC band
    Clear,
    /// Meaningful point estimate whose error bar touches the SWC band
    Unclear,
    Trivial,
}

impl SwcBand {
    pub fn from_class(class: SwcClass, contacts_swc: bool) -> Self {
        match (class, contacts_swc) {
            (SwcClass::MeaningfulChange, false) => SwcBand::Clear,
            (SwcClass::MeaningfulChange, true) => SwcBand::Unclear,
            (SwcClass::TrivialChange, _) => SwcBand::Trivial,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SwcBand::Clear => "Clear",
            SwcBand::Unclear => "Unclear",
            SwcBand::Trivial => "Trivial",
        }
    }
}

/// Spread of one adjacent baseline trial pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialPairSd {
    pub from_trial: usize,
    pub to_trial: usize,
    /// Athletes with both trials
    pub athletes: usize,
    pub sd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypicalError {
    pub pairs: Vec<TrialPairSd>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwcRow {
    pub athlete: AthleteId,
    pub athlete_sd: f64,
    pub swc: f64,
    pub change_score: f64,
    pub lower_range: f64,
    pub upper_range: f64,
    /// [lower_range, upper_range] overlaps [-swc, swc]
    pub contacts_swc: bool,
    pub classification: SwcClass,
    pub band: SwcBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwcReport {
    pub swc_fraction: f64,
    pub typical_error: TypicalError,
    pub rows: Vec<SwcRow>,
}

/// fraction x the athlete's sample sd
pub fn smallest_worthwhile_change(athlete_sd: f64, fraction: f64) -> f64 {
    fraction * athlete_sd
}

/// Closed-interval overlap of change +/- TE with [-swc, swc]
///
/// An interval edge landing exactly on the band counts as contact.
pub fn touches_swc_band(lower_range: f64, upper_range: f64, swc: f64) -> bool {
    lower_range <= swc && upper_range >= -swc
}

/// Group typical error from adjacent baseline trial differences
///
/// # Errors
/// `InsufficientTrials` with fewer than two distinct baseline trials, or when
/// a trial pair has fewer than two athletes to take a standard deviation over.
pub fn typical_error(baseline: &[TrialRecord]) -> Result<TypicalError> {
    let trials: BTreeSet<usize> = baseline.iter().map(|r| r.trial).collect();
    if trials.len() < 2 {
        return Err(MetricError::insufficient(
            "distinct baseline trials for typical error",
            2,
            trials.len(),
        ));
    }

    let cells: BTreeMap<(AthleteId, usize), f64> =
        baseline.iter().map(|r| ((r.athlete, r.trial), r.value)).collect();
    let athletes: BTreeSet<AthleteId> = baseline.iter().map(|r| r.athlete).collect();
    let trials: Vec<usize> = trials.into_iter().collect();

    let mut pairs = Vec::with_capacity(trials.len() - 1);
    for window in trials.windows(2) {
        let (from_trial, to_trial) = (window[0], window[1]);
        let diffs: Vec<f64> = athletes
            .iter()
            .filter_map(|&a| Some(cells.get(&(a, to_trial))? - cells.get(&(a, from_trial))?))
            .collect();

        let sd = sample_sd(&diffs).ok_or_else(|| {
            MetricError::insufficient(
                format!("athletes with baseline trials {from_trial} and {to_trial}"),
                2,
                diffs.len(),
            )
        })?;
        pairs.push(TrialPairSd {
            from_trial,
            to_trial,
            athletes: diffs.len(),
            sd,
        });
    }

    let sds: Vec<f64> = pairs.iter().map(|p| p.sd).collect();
    let value = mean(&sds).map(|m| m / SQRT_2).unwrap_or_default();

    Ok(TypicalError { pairs, value })
}

/// Classify every athlete against their own SWC
pub fn evaluate_swc(dataset: &Dataset, thresholds: &ThresholdConfig) -> Result<SwcReport> {
    let typical_error = typical_error(&dataset.baseline())?;
    let te = typical_error.value;
    tracing::debug!(typical_error = te, pairs = typical_error.pairs.len(), "group TE estimated");

    let athlete_sds = sd_by_athlete(dataset.records())?;
    let mut rows = Vec::with_capacity(dataset.athlete_count());
    for summary in dataset.summaries() {
        let athlete_sd = *athlete_sds.get(&summary.athlete).ok_or_else(|| {
            MetricError::insufficient(format!("trials for athlete {}", summary.athlete), 2, 0)
        })?;
        let swc = smallest_worthwhile_change(athlete_sd, thresholds.swc_fraction);

        let change_score = summary.change_score;
        let lower_range = change_score - te;
        let upper_range = change_score + te;
        let contacts_swc = touches_swc_band(lower_range, upper_range, swc);
        let classification = SwcClass::classify(change_score, swc);

        rows.push(SwcRow {
            athlete: summary.athlete,
            athlete_sd,
            swc,
            change_score,
            lower_range,
            upper_range,
            contacts_swc,
            classification,
            band: SwcBand::from_class(classification, contacts_swc),
        });
    }

    Ok(SwcReport {
        swc_fraction: thresholds.swc_fraction,
        typical_error,
        rows,
    })
}
