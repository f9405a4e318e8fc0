//! Descriptive statistics and one-way ANOVA
//!
//! All functions work in `f64` and return `None` when the statistic is
//! undefined for the input (empty slice, zero degrees of freedom). Callers
//! turn `None` into the domain error that fits their context.

// Plain f64 loops rather than trueno vectors: trueno works in f32, too coarse
// for SEM agreement within 1e-9 relative.

use serde::Serialize;

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sum of squared deviations from the mean
pub fn sum_squared_deviations(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m) * (v - m)).sum())
}

/// Sample variance (divisor n - 1)
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(sum_squared_deviations(values)? / (values.len() - 1) as f64)
}

/// Sample standard deviation (divisor n - 1)
pub fn sample_sd(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// One-way analysis of variance table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaTable {
    /// Number of groups (levels of the factor)
    pub groups: usize,
    /// Total number of observations
    pub observations: usize,
    pub grand_mean: f64,
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ms_between: f64,
    /// Residual mean square (MSE)
    pub ms_within: f64,
    /// `None` when the residual mean square is zero
    pub f_statistic: Option<f64>,
}

/// Fit a one-way ANOVA with each slice as one level of the factor
///
/// Returns `None` when there are fewer than two groups, any group is empty,
/// or the residual term has zero degrees of freedom.
///
/// # Example
/// ```
/// use realchange::stats::one_way_anova;
///
/// let groups = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
/// let table = one_way_anova(&groups).unwrap();
/// assert_eq!(table.df_within, 4);
/// assert!((table.ms_within - 1.0).abs() < 1e-12);
/// ```
pub fn one_way_anova(groups: &[Vec<f64>]) -> Option<AnovaTable> {
    if groups.len() < 2 || groups.iter().any(|g| g.is_empty()) {
        return None;
    }

    let observations: usize = groups.iter().map(Vec::len).sum();
    let df_between = groups.len() - 1;
    let df_within = observations - groups.len();
    if df_within == 0 {
        return None;
    }

    let grand_mean = groups.iter().flatten().sum::<f64>() / observations as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let group_mean = mean(group)?;
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += sum_squared_deviations(group)?;
    }

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f_statistic = (ms_within > 0.0).then(|| ms_between / ms_within);

    Some(AnovaTable {
        groups: groups.len(),
        observations,
        grand_mean,
        ss_between,
        ss_within,
        df_between,
        df_within,
        ms_between,
        ms_within,
        f_statistic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_sd_uses_n_minus_one() {
        // mean=5, ss=20, n-1=3
        let sd = sample_sd(&[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((sd - (20.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_sd_constant() {
        assert_eq!(sample_sd(&[1500.0, 1500.0, 1500.0]), Some(0.0));
    }

    #[test]
    fn test_sample_variance_singleton() {
        assert_eq!(sample_variance(&[42.0]), None);
        assert_eq!(sample_sd(&[]), None);
    }

    #[test]
    fn test_sum_squared_deviations() {
        assert_eq!(sum_squared_deviations(&[1500.0, 1520.0, 1480.0]), Some(800.0));
    }

    #[test]
    fn test_anova_partitions_total_sum_of_squares() {
        let groups = vec![
            vec![10.0, 12.0, 11.0],
            vec![20.0, 22.0, 21.0],
            vec![15.0, 14.0, 16.0],
        ];
        let table = one_way_anova(&groups).unwrap();

        let all: Vec<f64> = groups.iter().flatten().copied().collect();
        let ss_total = sum_squared_deviations(&all).unwrap();
        assert!((table.ss_between + table.ss_within - ss_total).abs() < 1e-9);

        assert_eq!(table.groups, 3);
        assert_eq!(table.observations, 9);
        assert_eq!(table.df_between, 2);
        assert_eq!(table.df_within, 6);
        // Each group has ss=2
        assert!((table.ms_within - 1.0).abs() < 1e-12);
        assert!(table.f_statistic.unwrap() > 50.0);
    }

    #[test]
    fn test_anova_equal_sized_groups_pool_variances() {
        let groups = vec![vec![1500.0, 1520.0, 1480.0], vec![1300.0, 1500.0, 1700.0]];
        let table = one_way_anova(&groups).unwrap();
        // (400 + 40000) / 2
        assert!((table.ms_within - 20200.0).abs() < 1e-9);
    }

    #[test]
    fn test_anova_degenerate_inputs() {
        assert!(one_way_anova(&[vec![1.0, 2.0, 3.0]]).is_none());
        assert!(one_way_anova(&[vec![1.0], vec![2.0]]).is_none());
        assert!(one_way_anova(&[vec![1.0, 2.0], vec![]]).is_none());
    }

    #[test]
    fn test_anova_zero_residual_has_no_f() {
        let table = one_way_anova(&[vec![5.0, 5.0], vec![7.0, 7.0]]).unwrap();
        assert_eq!(table.ms_within, 0.0);
        assert!(table.f_statistic.is_none());
    }
}
