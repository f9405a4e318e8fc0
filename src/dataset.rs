//! Trial records, reshaping and per-athlete aggregation
//!
//! The simulator produces wide rows (one row per athlete and timepoint with
//! one column per trial). Everything downstream works on long
//! [`TrialRecord`]s, grouped by athlete through the aggregation functions
//! in this module.

use crate::error::{MetricError, Result};
use crate::stats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Athlete identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AthleteId(pub u32);

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{:02}", self.0)
    }
}

/// Testing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timepoint {
    /// Timepoint 1, the source of every variability estimate
    Baseline,
    /// Timepoint 2
    FollowUp,
}

impl Timepoint {
    pub const ALL: [Timepoint; 2] = [Timepoint::Baseline, Timepoint::FollowUp];

    /// 1-based timepoint number
    pub fn number(self) -> u8 {
        match self {
            Timepoint::Baseline => 1,
            Timepoint::FollowUp => 2,
        }
    }
}

/// A single measurement: one athlete, one timepoint, one trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub athlete: AthleteId,
    pub timepoint: Timepoint,
    /// 1-based trial number within the timepoint
    pub trial: usize,
    pub value: f64,
}

/// One athlete at one timepoint with a column per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideRecord {
    pub athlete: AthleteId,
    pub timepoint: Timepoint,
    /// Trial values in trial order (index 0 is trial 1)
    pub trials: Vec<f64>,
}

impl WideRecord {
    pub fn mean(&self) -> Option<f64> {
        stats::mean(&self.trials)
    }
}

/// Per-athlete two-timepoint summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteSummary {
    pub athlete: AthleteId,
    pub timepoint_1_mean: f64,
    pub timepoint_2_mean: f64,
    /// `timepoint_2_mean - timepoint_1_mean`
    pub change_score: f64,
    /// `change_score / timepoint_1_mean * 100`, absent when the baseline mean is zero
    pub percent_change: Option<f64>,
}

/// Convert wide rows into long trial records
pub fn to_long(rows: &[WideRecord]) -> Vec<TrialRecord> {
    rows.iter()
        .flat_map(|row| {
            row.trials
                .iter()
                .enumerate()
                .map(move |(idx, &value)| TrialRecord {
                    athlete: row.athlete,
                    timepoint: row.timepoint,
                    trial: idx + 1,
                    value,
                })
        })
        .collect()
}

/// Convert long trial records back into wide rows
///
/// Rows come out ordered by athlete then timepoint; trial columns are
/// ordered by trial number.
pub fn to_wide(records: &[TrialRecord]) -> Vec<WideRecord> {
    let mut cells: BTreeMap<(AthleteId, Timepoint), Vec<(usize, f64)>> = BTreeMap::new();
    for record in records {
        cells
            .entry((record.athlete, record.timepoint))
            .or_default()
            .push((record.trial, record.value));
    }

    cells
        .into_iter()
        .map(|((athlete, timepoint), mut trials)| {
            trials.sort_by_key(|(trial, _)| *trial);
            WideRecord {
                athlete,
                timepoint,
                trials: trials.into_iter().map(|(_, value)| value).collect(),
            }
        })
        .collect()
}

/// Records from timepoint 1
pub fn baseline(records: &[TrialRecord]) -> Vec<TrialRecord> {
    records
        .iter()
        .filter(|r| r.timepoint == Timepoint::Baseline)
        .copied()
        .collect()
}

/// Group measurement values by athlete
///
/// Values inside each group are ordered by `(timepoint, trial)` regardless
/// of input order, so downstream sums are reproducible.
pub fn group_by_athlete(records: &[TrialRecord]) -> BTreeMap<AthleteId, Vec<f64>> {
    let mut sorted: Vec<&TrialRecord> = records.iter().collect();
    sorted.sort_by_key(|r| (r.athlete, r.timepoint, r.trial));

    let mut groups: BTreeMap<AthleteId, Vec<f64>> = BTreeMap::new();
    for record in sorted {
        groups.entry(record.athlete).or_default().push(record.value);
    }
    groups
}

/// Apply a per-athlete summary to every athlete group
///
/// Fails with `InsufficientTrials` on empty input; errors from `summary`
/// (for example a singleton group fed to a standard deviation) propagate.
pub fn aggregate_by_athlete<T, F>(records: &[TrialRecord], summary: F) -> Result<BTreeMap<AthleteId, T>>
where
    F: Fn(AthleteId, &[f64]) -> Result<T>,
{
    if records.is_empty() {
        return Err(MetricError::insufficient("trial records", 1, 0));
    }

    group_by_athlete(records)
        .into_iter()
        .map(|(athlete, values)| summary(athlete, &values).map(|v| (athlete, v)))
        .collect()
}

/// Per-athlete sample standard deviation
pub fn sd_by_athlete(records: &[TrialRecord]) -> Result<BTreeMap<AthleteId, f64>> {
    aggregate_by_athlete(records, |athlete, values| {
        stats::sample_sd(values).ok_or_else(|| {
            MetricError::insufficient(
                format!("standard deviation for athlete {athlete}"),
                2,
                values.len(),
            )
        })
    })
}

/// Derive the two-timepoint summary for every athlete
pub fn summarize(records: &[TrialRecord]) -> Result<Vec<AthleteSummary>> {
    if records.is_empty() {
        return Err(MetricError::insufficient("trial records", 1, 0));
    }

    let mut by_timepoint: BTreeMap<AthleteId, [Vec<TrialRecord>; 2]> = BTreeMap::new();
    for record in records {
        let slot = by_timepoint.entry(record.athlete).or_default();
        slot[(record.timepoint.number() - 1) as usize].push(*record);
    }

    by_timepoint
        .into_iter()
        .map(|(athlete, [t1, t2])| {
            let t1_mean = timepoint_mean(athlete, Timepoint::Baseline, t1)?;
            let t2_mean = timepoint_mean(athlete, Timepoint::FollowUp, t2)?;
            let change_score = t2_mean - t1_mean;
            let percent_change = (t1_mean != 0.0).then(|| change_score / t1_mean * 100.0);

            Ok(AthleteSummary {
                athlete,
                timepoint_1_mean: t1_mean,
                timepoint_2_mean: t2_mean,
                change_score,
                percent_change,
            })
        })
        .collect()
}

fn timepoint_mean(athlete: AthleteId, timepoint: Timepoint, mut records: Vec<TrialRecord>) -> Result<f64> {
    records.sort_by_key(|r| r.trial);
    let values: Vec<f64> = records.iter().map(|r| r.value).collect();
    stats::mean(&values).ok_or(MetricError::MissingTimepoint {
        athlete,
        timepoint: timepoint.number(),
    })
}

/// Long-format trial records together with their athlete summaries
///
/// This is the shared output of the reshaping step; every method reads it
/// and none mutates it.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<TrialRecord>,
    summaries: Vec<AthleteSummary>,
}

impl Dataset {
    /// Build from long records
    ///
    /// # Errors
    /// `MissingTimepoint` when an athlete lacks either timepoint,
    /// `InsufficientTrials` when there are no records at all.
    pub fn from_records(records: Vec<TrialRecord>) -> Result<Self> {
        let summaries = summarize(&records)?;
        tracing::debug!(
            records = records.len(),
            athletes = summaries.len(),
            "reshaped trial records"
        );
        Ok(Self { records, summaries })
    }

    /// Build from wide rows
    pub fn from_wide(rows: &[WideRecord]) -> Result<Self> {
        Self::from_records(to_long(rows))
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn summaries(&self) -> &[AthleteSummary] {
        &self.summaries
    }

    /// The baseline subset (timepoint 1 records)
    pub fn baseline(&self) -> Vec<TrialRecord> {
        baseline(&self.records)
    }

    pub fn athlete_count(&self) -> usize {
        self.summaries.len()
    }

    pub fn summary(&self, athlete: AthleteId) -> Option<&AthleteSummary> {
        self.summaries.iter().find(|s| s.athlete == athlete)
    }
}
