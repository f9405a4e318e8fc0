//! Synthetic repeated-trials cohort
//!
//! Draws every trial column independently from a normal distribution with a
//! timepoint/trial-specific mean and a trial-specific standard deviation.
//! The generator is `ChaCha8Rng`, so a seed reproduces the same cohort on
//! every platform.

use crate::config::SimulationConfig;
use crate::dataset::{AthleteId, Timepoint, WideRecord};
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Generate the wide dataset described by `config`
///
/// Columns are drawn timepoint by timepoint, trial by trial, one value per
/// athlete. Rows come out ordered by athlete then timepoint.
///
/// # Example
/// ```
/// use realchange::config::SimulationConfig;
/// use realchange::simulate::simulate;
///
/// let rows = simulate(&SimulationConfig::default()).unwrap();
/// assert_eq!(rows.len(), 15 * 2);
/// assert!(rows.iter().all(|r| r.trials.len() == 3));
/// ```
pub fn simulate(config: &SimulationConfig) -> Result<Vec<WideRecord>> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let trials = config.trials();

    // columns[timepoint][trial][athlete]
    let mut columns: Vec<Vec<Vec<f64>>> = Vec::with_capacity(Timepoint::ALL.len());
    for timepoint in Timepoint::ALL {
        let means = match timepoint {
            Timepoint::Baseline => &config.baseline_means,
            Timepoint::FollowUp => &config.follow_up_means,
        };
        if means.len() != trials {
            anyhow::bail!(
                "Timepoint {} has {} trial means but {} trial sds",
                timepoint.number(),
                means.len(),
                trials
            );
        }

        let mut trial_columns = Vec::with_capacity(trials);
        for (trial, (&mean, &sd)) in means.iter().zip(&config.trial_sds).enumerate() {
            let normal = Normal::new(mean, sd).with_context(|| {
                format!(
                    "Invalid distribution for timepoint {} trial {}: mean={}, sd={}",
                    timepoint.number(),
                    trial + 1,
                    mean,
                    sd
                )
            })?;
            let column: Vec<f64> = (0..config.athletes).map(|_| normal.sample(&mut rng)).collect();
            trial_columns.push(column);
        }
        columns.push(trial_columns);
    }

    let mut rows = Vec::with_capacity(config.athletes * Timepoint::ALL.len());
    for athlete in 0..config.athletes {
        for (tp_idx, timepoint) in Timepoint::ALL.into_iter().enumerate() {
            rows.push(WideRecord {
                athlete: AthleteId(athlete as u32 + 1),
                timepoint,
                trials: columns[tp_idx].iter().map(|column| column[athlete]).collect(),
            });
        }
    }

    tracing::info!(
        seed = config.seed,
        athletes = config.athletes,
        trials,
        "simulated cohort"
    );
    Ok(rows)
}
