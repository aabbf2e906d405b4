//! Summary statistics and the Gini coefficient.
//!
//! Every function returns zero for empty input, and [`gini`] also returns
//! zero when all values are zero, so reported metrics are never NaN.

/// Convert a count to `f64`.
///
/// Counts in this simulation stay far below 2^53.
#[allow(clippy::cast_precision_loss)]
pub(crate) const fn count_to_f64(n: usize) -> f64 {
    n as f64
}

/// Convert a tally to `f64`.
#[allow(clippy::cast_precision_loss)]
pub(crate) const fn tally_to_f64(n: u64) -> f64 {
    n as f64
}

/// Arithmetic mean, zero for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / count_to_f64(values.len())
}

/// Population standard deviation, zero for empty input.
pub fn stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / count_to_f64(values.len());
    variance.sqrt()
}

/// Gini coefficient of `values`.
///
/// With `Y` sorted non-decreasingly and 1-based ranks `i`:
/// `G = 2 * sum(i * Y[i]) / (n * sum(Y)) - (n + 1) / n`.
///
/// Zero for equal values, `(n - 1) / n` when one value holds everything.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = sorted
        .iter()
        .zip(1_u32..)
        .map(|(y, rank)| f64::from(rank) * y)
        .sum();
    let n = count_to_f64(n);
    let g = 2.0 * weighted / (n * total) - (n + 1.0) / n;
    if g.is_finite() { g } else { 0.0 }
}

/// Mean and Gini coefficient in one call.
pub fn mean_and_gini(values: &[f64]) -> (f64, f64) {
    (mean(values), gini(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gini_perfect_equality() {
        assert!(gini(&[3.0, 3.0, 3.0, 3.0]).abs() < 1e-12);
    }

    #[test]
    fn gini_maximum_inequality() {
        for n in [2_u32, 5, 10, 100] {
            let mut values = vec![0.0; usize::try_from(n - 1).unwrap_or(0)];
            values.push(7.0);
            let expected = f64::from(n - 1) / f64::from(n);
            assert!((gini(&values) - expected).abs() < 1e-12, "n = {n}");
        }
        let mut large = vec![0.0; 9999];
        large.push(1.0);
        assert!(gini(&large) > 0.999);
    }

    #[test]
    fn gini_ignores_input_order() {
        let a = gini(&[1.0, 5.0, 2.0, 0.0]);
        let b = gini(&[0.0, 1.0, 2.0, 5.0]);
        assert!((a - b).abs() < 1e-12);
        assert!(a > 0.0 && a < 1.0);
    }

    #[test]
    fn gini_empty_population() {
        let (m, g) = mean_and_gini(&[]);
        assert!(m.abs() < f64::EPSILON);
        assert!(g.abs() < f64::EPSILON);
    }

    #[test]
    fn gini_zero_wealth() {
        let (m, g) = mean_and_gini(&[0.0, 0.0, 0.0]);
        assert!(m.abs() < f64::EPSILON);
        assert!(g.abs() < f64::EPSILON);
        assert!(!g.is_nan());
    }

    #[test]
    fn stdev_is_population_stdev() {
        assert!((stdev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-12);
        assert!(stdev(&[]).abs() < f64::EPSILON);
        assert!(stdev(&[4.2]).abs() < f64::EPSILON);
    }
}
