//! Property-based tests for the change-detection methods
//!
//! Core properties covered:
//! 1. Reshaping: long -> wide -> change score is exact
//! 2. Group SEM: order invariance, ANOVA residual, MDC formula
//! 3. CV: zero-variability baselines
//! 4. SWC: scale invariance of the per-athlete classification
//! 5. Model statistic: zero-SEM athletes
//! 6. Simulation determinism

use proptest::prelude::*;
use realchange::config::{SimulationConfig, ThresholdConfig};
use realchange::dataset::{to_long, to_wide, AthleteId, Dataset, Timepoint, WideRecord};
use realchange::methods::{
    athlete_error_term, evaluate_cv, evaluate_sem, evaluate_swc, CvClass, ModelClass,
};
use realchange::simulate::simulate;
use std::f64::consts::SQRT_2;

/// (baseline trials, follow-up trials) per athlete, all with `trials` trials
fn cohort_strategy() -> impl Strategy<Value = Vec<(Vec<f64>, Vec<f64>)>> {
    (2usize..6, 2usize..5).prop_flat_map(|(athletes, trials)| {
        prop::collection::vec(
            (
                prop::collection::vec(500.0f64..2500.0, trials),
                prop::collection::vec(500.0f64..2500.0, trials),
            ),
            athletes,
        )
    })
}

fn wide_rows(cohort: &[(Vec<f64>, Vec<f64>)], ids: impl Iterator<Item = u32>) -> Vec<WideRecord> {
    cohort
        .iter()
        .zip(ids)
        .flat_map(|((baseline, follow_up), id)| {
            [
                WideRecord {
                    athlete: AthleteId(id),
                    timepoint: Timepoint::Baseline,
                    trials: baseline.clone(),
                },
                WideRecord {
                    athlete: AthleteId(id),
                    timepoint: Timepoint::FollowUp,
                    trials: follow_up.clone(),
                },
            ]
        })
        .collect()
}

fn relative_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(f64::MIN_POSITIVE)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_change_score_round_trip(cohort in cohort_strategy()) {
        // Property: long -> wide -> summary reproduces t2 mean - t1 mean exactly
        let rows = wide_rows(&cohort, 1..);
        let dataset = Dataset::from_wide(&rows).unwrap();

        prop_assert_eq!(to_wide(&to_long(&rows)), rows.clone());
        for pair in rows.chunks(2) {
            let summary = dataset.summary(pair[0].athlete).unwrap();
            let expected = pair[1].mean().unwrap() - pair[0].mean().unwrap();
            prop_assert_eq!(summary.change_score, expected);
            prop_assert_eq!(summary.change_score, summary.timepoint_2_mean - summary.timepoint_1_mean);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_sem_invariant_to_athlete_order(cohort in cohort_strategy()) {
        // Property: relabelling athletes in reverse order leaves the group SEM unchanged
        let n = cohort.len() as u32;
        let forward = Dataset::from_wide(&wide_rows(&cohort, 1..)).unwrap();
        let reversed = Dataset::from_wide(&wide_rows(&cohort, (1..=n).rev())).unwrap();

        let thresholds = ThresholdConfig::default();
        let a = evaluate_sem(&forward, &thresholds).unwrap();
        let b = evaluate_sem(&reversed, &thresholds).unwrap();

        prop_assert!(relative_eq(a.sem, b.sem), "{} vs {}", a.sem, b.sem);
        prop_assert!(relative_eq(a.sem, a.anova.ms_within.sqrt()));
    }

    #[test]
    fn prop_mdc_formula(cohort in cohort_strategy(), z in 0.5f64..3.5) {
        // Property: MDC is exactly SEM x z x sqrt(2)
        let dataset = Dataset::from_wide(&wide_rows(&cohort, 1..)).unwrap();
        let thresholds = ThresholdConfig { z_critical: z, ..ThresholdConfig::default() };
        let report = evaluate_sem(&dataset, &thresholds).unwrap();

        prop_assert_eq!(report.mdc, report.sem * z * SQRT_2);
        for row in &report.rows {
            prop_assert_eq!(row.exceeds_mdc, row.change_score.abs() > report.mdc);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_constant_baseline_has_zero_cv(level in 100i32..3000, shift in 1i32..200) {
        // Property: identical baseline trials give CV 0, so any change is beyond it
        let level = level as f64;
        let rows = wide_rows(
            &[(vec![level; 3], vec![level + shift as f64; 3])],
            1..,
        );
        let report = evaluate_cv(&Dataset::from_wide(&rows).unwrap()).unwrap();

        prop_assert_eq!(report.rows[0].cv_percent, 0.0);
        prop_assert_eq!(report.rows[0].classification, CvClass::BeyondNormalVariability);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_swc_scale_invariance(cohort in cohort_strategy(), target in 0usize..5) {
        // Property: doubling one athlete's measurements doubles SWC and change
        // score and keeps the classification
        let target = target % cohort.len();
        let mut scaled = cohort.clone();
        let (baseline, follow_up) = &mut scaled[target];
        for v in baseline.iter_mut().chain(follow_up.iter_mut()) {
            *v *= 2.0;
        }

        let thresholds = ThresholdConfig::default();
        let before = evaluate_swc(&Dataset::from_wide(&wide_rows(&cohort, 1..)).unwrap(), &thresholds).unwrap();
        let after = evaluate_swc(&Dataset::from_wide(&wide_rows(&scaled, 1..)).unwrap(), &thresholds).unwrap();

        let (b, a) = (&before.rows[target], &after.rows[target]);
        prop_assert_eq!(a.swc, 2.0 * b.swc);
        prop_assert_eq!(a.change_score, 2.0 * b.change_score);
        prop_assert_eq!(a.classification, b.classification);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_identical_trials_zero_model_sem(level in -1000i32..1000, n in 2usize..10, diff in -50.0f64..50.0) {
        // Property: an athlete with identical trials has SEM 0 and any nonzero
        // difference is a true difference
        let term = athlete_error_term(AthleteId(1), &vec![level as f64; n]).unwrap();
        prop_assert_eq!(term.sem, 0.0);
        prop_assert_eq!(term.df, n - 1);

        let expected = if diff != 0.0 { ModelClass::TrueDifference } else { ModelClass::TrivialDifference };
        prop_assert_eq!(ModelClass::classify(diff, term.sem), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn prop_simulation_deterministic(seed in any::<u64>(), athletes in 1usize..20) {
        // Property: same seed gives the same cohort, the next seed a different one
        let config = SimulationConfig { seed, athletes, ..SimulationConfig::default() };
        let first = simulate(&config).unwrap();
        let second = simulate(&config).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), athletes * 2);

        let other = simulate(&SimulationConfig { seed: seed.wrapping_add(1), ..config }).unwrap();
        prop_assert_ne!(first, other);
    }
}
