//! Random draws shared by the lab state machine and the lotteries.
//!
//! Every draw takes the caller's generator so that a whole run consumes a
//! single seeded stream.

use core::f64::consts::TAU;

use rand::Rng;

/// Return `true` with probability `p`.
///
/// Values of `p` outside `[0, 1]` saturate instead of panicking.
pub fn chance(rng: &mut impl Rng, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Return `1` or `-1` with equal probability.
pub fn random_sign(rng: &mut impl Rng) -> i64 {
    if rng.random::<bool>() { 1 } else { -1 }
}

/// Draw from the standard normal distribution.
///
/// Box-Muller transform over two uniform draws.
pub fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Pick an index with probability proportional to its weight.
///
/// Zero weights are never drawn. Returns `None` when every weight is zero
/// or the slice is empty. Uses cumulative weights and a binary search.
pub fn weighted_index(weights: &[u32], rng: &mut impl Rng) -> Option<usize> {
    let mut cumulative = Vec::with_capacity(weights.len());
    let mut total: u64 = 0;
    for &w in weights {
        total = total.saturating_add(u64::from(w));
        cumulative.push(total);
    }
    if total == 0 {
        return None;
    }
    let ticket = rng.random_range(0..total);
    let idx = cumulative.partition_point(|&c| c <= ticket);
    (idx < weights.len()).then_some(idx)
}

/// Draw `count` distinct indices from `0..len` in draw order.
///
/// Duplicates are redrawn. `count` is capped at `len`.
pub fn sample_distinct(len: usize, count: usize, rng: &mut impl Rng) -> Vec<usize> {
    let wanted = count.min(len);
    let mut drawn: Vec<usize> = Vec::with_capacity(wanted);
    while drawn.len() < wanted {
        let candidate = rng.random_range(0..len);
        if !drawn.contains(&candidate) {
            drawn.push(candidate);
        }
    }
    drawn
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn chance_saturates_outside_unit_interval() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert!((0..100).all(|_| chance(&mut rng, 1.5)));
        assert!((0..100).all(|_| !chance(&mut rng, -0.5)));
        assert!((0..100).all(|_| !chance(&mut rng, 0.0)));
    }

    #[test]
    fn standard_normal_has_unit_moments() {
        let mut rng = SmallRng::seed_from_u64(42);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / f64::from(n);
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / f64::from(n);
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
        assert!(draws.iter().all(|d| d.is_finite()));
    }

    #[test]
    fn weighted_index_skips_zero_weights() {
        let mut rng = SmallRng::seed_from_u64(42);
        let weights = [0, 3, 0, 1];
        let mut counts = [0_u32; 4];
        for _ in 0..4000 {
            let idx = weighted_index(&weights, &mut rng).unwrap();
            if let Some(c) = counts.get_mut(idx) {
                *c += 1;
            }
        }
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
        // Roughly 3:1.
        assert!(counts[1] > 2700 && counts[1] < 3300, "{counts:?}");
    }

    #[test]
    fn weighted_index_none_without_weight() {
        let mut rng = SmallRng::seed_from_u64(42);
        assert_eq!(weighted_index(&[], &mut rng), None);
        assert_eq!(weighted_index(&[0, 0, 0], &mut rng), None);
    }

    #[test]
    fn sample_distinct_caps_and_has_no_duplicates() {
        let mut rng = SmallRng::seed_from_u64(42);
        let drawn = sample_distinct(5, 10, &mut rng);
        assert_eq!(drawn.len(), 5);
        let mut sorted = drawn.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        assert!(sample_distinct(0, 10, &mut rng).is_empty());
    }
}
