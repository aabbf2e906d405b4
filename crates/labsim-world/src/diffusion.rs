//! Distance-decayed spread of base-rate increases.
//!
//! [`increase_and_disperse`] adds an amount to one cell and spreads a
//! decaying share of it outwards. A cell at Euclidean distance `d` from the
//! origin receives `amount^d`. The spread walks the 8-neighbourhood
//! breadth-first from the origin and stops along every path where the
//! addition drops below [`DISPERSAL_THRESHOLD`] or where the cell value no
//! longer changes (it is already saturated).
//!
//! Since the addition depends only on the distance to the origin, the set
//! of changed cells does not depend on traversal order. The walk uses an
//! explicit FIFO frontier and a visited bitmap, so large amounts on large
//! grids cannot exhaust the stack.

use std::collections::VecDeque;

use labsim_types::Topic;
use tracing::trace;

use crate::error::WorldError;
use crate::landscape::Landscape;

/// Smallest addition that still changes a neighbouring cell.
pub const DISPERSAL_THRESHOLD: f64 = 1e-8;

/// Add `amount` to the base rate at `origin` and disperse it to the
/// surrounding topics.
///
/// Every write is clamped to `[0, MAX_BASE_RATE]`. The origin is never
/// revisited. An `amount` of zero leaves the grid unchanged.
///
/// Returns the number of neighbouring cells that changed.
///
/// # Errors
///
/// Returns [`WorldError::OutOfBounds`] if `origin` lies outside the grid.
///
/// [`MAX_BASE_RATE`]: crate::MAX_BASE_RATE
pub fn increase_and_disperse(
    landscape: &mut Landscape,
    origin: Topic,
    amount: f64,
) -> Result<usize, WorldError> {
    let current = landscape.base_rate(origin)?;
    landscape.set_base_rate(origin, current + amount)?;

    let Some(origin_idx) = landscape.index_of(origin) else {
        return Ok(0);
    };

    let mut visited = vec![false; landscape.cell_count()];
    if let Some(slot) = visited.get_mut(origin_idx) {
        *slot = true;
    }
    let mut frontier = VecDeque::from([origin]);
    let mut changed: usize = 0;

    while let Some(cell) = frontier.pop_front() {
        for neighbor in landscape.neighbors8(cell) {
            let Some(idx) = landscape.index_of(neighbor) else {
                continue;
            };
            if visited.get(idx).copied().unwrap_or(true) {
                continue;
            }
            let Some(old) = landscape.base_rate_at(idx) else {
                continue;
            };

            let addition = amount.powf(origin.distance(neighbor));
            if addition.is_nan() || addition < DISPERSAL_THRESHOLD {
                continue;
            }
            landscape.set_base_rate_at(idx, old + addition);
            let new = landscape.base_rate_at(idx).unwrap_or(old);
            if (new - old).abs() > 0.0 {
                if let Some(slot) = visited.get_mut(idx) {
                    *slot = true;
                }
                changed = changed.saturating_add(1);
                frontier.push_back(neighbor);
            }
        }
    }

    trace!(
        x = origin.x,
        y = origin.y,
        amount,
        changed,
        "dispersed base-rate increase"
    );
    Ok(changed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::landscape::MAX_BASE_RATE;

    fn rate(land: &Landscape, x: u32, y: u32) -> f64 {
        land.base_rate(Topic::new(x, y)).unwrap()
    }

    #[test]
    fn zero_amount_is_noop() {
        let mut land = Landscape::new(5, 0.1).unwrap();
        let before = land.clone();
        let changed = increase_and_disperse(&mut land, Topic::new(2, 2), 0.0).unwrap();
        assert_eq!(changed, 0);
        assert_eq!(land, before);
    }

    #[test]
    fn neighbors_receive_amount_to_the_distance() {
        let mut land = Landscape::new(5, 0.0).unwrap();
        increase_and_disperse(&mut land, Topic::new(2, 2), 0.1).unwrap();
        assert!((rate(&land, 2, 2) - 0.1).abs() < 1e-12);
        // Orthogonal neighbour at distance 1.
        assert!((rate(&land, 3, 2) - 0.1).abs() < 1e-12);
        // Diagonal neighbour at distance sqrt(2).
        let diagonal = 0.1_f64.powf(2.0_f64.sqrt());
        assert!((rate(&land, 3, 3) - diagonal).abs() < 1e-12);
        // Distance 2 along an axis.
        assert!((rate(&land, 4, 2) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn spread_stops_below_threshold() {
        let mut land = Landscape::new(41, 0.0).unwrap();
        increase_and_disperse(&mut land, Topic::new(20, 20), 0.1).unwrap();
        // 0.1^7 still qualifies, 0.1^9 does not.
        assert!(rate(&land, 27, 20) > 0.0);
        assert!(rate(&land, 29, 20).abs() < f64::EPSILON);
        assert!(rate(&land, 40, 40).abs() < f64::EPSILON);
    }

    #[test]
    fn origin_and_neighbors_are_clamped() {
        let mut land = Landscape::new(7, 0.1).unwrap();
        increase_and_disperse(&mut land, Topic::new(3, 3), 0.499).unwrap();
        assert!((rate(&land, 3, 3) - MAX_BASE_RATE).abs() < f64::EPSILON);
        assert!((rate(&land, 4, 3) - MAX_BASE_RATE).abs() < f64::EPSILON);
        assert!(land.base_rates().iter().all(|r| (0.0..=MAX_BASE_RATE).contains(r)));
    }

    #[test]
    fn repeated_dispersal_stays_in_bounds() {
        let mut land = Landscape::new(15, 0.1).unwrap();
        for i in 0..200_u32 {
            let t = Topic::new(i % 15, (i * 7) % 15);
            let amount = f64::from(i % 10) / 10.0;
            increase_and_disperse(&mut land, t, amount).unwrap();
        }
        assert!(land.base_rates().iter().all(|r| (0.0..=MAX_BASE_RATE).contains(r)));
    }

    #[test]
    fn saturated_cells_block_the_spread() {
        let mut land = Landscape::new(1, 0.1).unwrap();
        assert_eq!(increase_and_disperse(&mut land, Topic::new(0, 0), 0.3).unwrap(), 0);

        let mut strip = Landscape::new(5, 0.0).unwrap();
        // Saturate the whole column at x = 3 so nothing reaches x = 4.
        for y in 0..5 {
            strip.set_base_rate(Topic::new(3, y), MAX_BASE_RATE).unwrap();
        }
        increase_and_disperse(&mut strip, Topic::new(2, 2), 0.5).unwrap();
        assert!(rate(&strip, 4, 2).abs() < f64::EPSILON);
        assert!(rate(&strip, 1, 2) > 0.0);
    }

    #[test]
    fn out_of_bounds_origin_errors() {
        let mut land = Landscape::new(3, 0.1).unwrap();
        assert!(increase_and_disperse(&mut land, Topic::new(5, 5), 0.1).is_err());
    }
}
