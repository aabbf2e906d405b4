//! The death lottery.
//!
//! Once per tick a sample of distinct labs is drawn uniformly and the
//! oldest of the sample dies. When several sampled labs share the highest
//! age, the one drawn last dies. A population smaller than the sample is
//! sampled completely, so its oldest lab always dies.

use rand::Rng;

use crate::lab::Lab;
use crate::sampling::sample_distinct;

/// Pick the index of the lab that dies this tick.
///
/// Returns `None` for an empty population or a zero sample size.
pub fn select_for_death(labs: &[Lab], sample_size: usize, rng: &mut impl Rng) -> Option<usize> {
    let drawn = sample_distinct(labs.len(), sample_size, rng);
    let mut oldest: Option<(usize, u64)> = None;
    for idx in drawn {
        let Some(lab) = labs.get(idx) else {
            continue;
        };
        let age = lab.age();
        if oldest.is_none_or(|(_, best)| age >= best) {
            oldest = Some((idx, age));
        }
    }
    oldest.map(|(idx, _)| idx)
}
