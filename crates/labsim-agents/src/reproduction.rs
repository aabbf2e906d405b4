//! The birth lottery and offspring creation.
//!
//! Every lab holds one lottery ticket per postdoc, so labs without postdocs
//! never reproduce. The newborn starts near its parent's topic, shifted on
//! each axis by a uniform offset in `[0, max_topic_mutation]` with an
//! independent random sign and clamped to the grid. It inherits the
//! parent's effort; with some probability a Gaussian perturbation is then
//! applied, by default to the parent.

use labsim_types::{EffortMutationTarget, LabId};
use labsim_world::Landscape;
use rand::Rng;
use tracing::debug;

use crate::config::PopulationConfig;
use crate::lab::{Lab, clamp_effort};
use crate::sampling::{chance, random_sign, standard_normal, weighted_index};

/// Pick the index of the lab that reproduces, weighted by postdoc count.
///
/// Returns `None` if no lab holds a postdoc.
pub fn select_parent(labs: &[Lab], rng: &mut impl Rng) -> Option<usize> {
    let weights: Vec<u32> = labs.iter().map(Lab::postdocs).collect();
    weighted_index(&weights, rng)
}

/// Create the offspring of `parent`, born during `tick` with identifier
/// `id`.
///
/// May perturb the parent's effort, depending on
/// [`PopulationConfig::effort_mutation_target`].
pub fn spawn_offspring(
    parent: &mut Lab,
    id: LabId,
    tick: u64,
    landscape: &Landscape,
    config: &PopulationConfig,
    rng: &mut impl Rng,
) -> Lab {
    let max = i64::from(config.max_topic_mutation);
    let dx = rng.random_range(0..=max);
    let dy = rng.random_range(0..=max);
    let dx = dx.saturating_mul(random_sign(rng));
    let dy = dy.saturating_mul(random_sign(rng));
    let topic = landscape.offset_clamped(parent.topic(), dx, dy);

    let mut effort = parent.effort();
    if chance(rng, config.effort_mutation_probability) {
        let delta = standard_normal(rng) * config.effort_mutation_stdev;
        match config.effort_mutation_target {
            EffortMutationTarget::Parent => parent.perturb_effort(delta),
            EffortMutationTarget::Offspring => effort = clamp_effort(effort + delta),
        }
        debug!(
            parent = %parent.id(),
            child = %id,
            delta,
            target = %config.effort_mutation_target,
            "effort mutated"
        );
    }

    Lab::offspring(id, parent.id(), topic, effort, tick)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use labsim_types::Topic;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn lab_with_postdocs(id: u64, postdocs: u32) -> Lab {
        Lab::seed(LabId::new(id), Topic::new(5, 5), 50.0, postdocs)
    }

    #[test]
    fn labs_without_postdocs_never_reproduce() {
        let mut rng = SmallRng::seed_from_u64(42);
        let labs = vec![lab_with_postdocs(0, 0), lab_with_postdocs(1, 2), lab_with_postdocs(2, 0)];
        for _ in 0..200 {
            assert_eq!(select_parent(&labs, &mut rng), Some(1));
        }
        let barren = vec![lab_with_postdocs(0, 0)];
        assert_eq!(select_parent(&barren, &mut rng), None);
    }

    #[test]
    fn offspring_lands_within_mutation_distance() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig::default();
        let mut parent = lab_with_postdocs(0, 1);
        for i in 0..200 {
            let child = spawn_offspring(&mut parent, LabId::new(100 + i), 3, &land, &config, &mut rng);
            let dx = child.topic().x.abs_diff(5);
            let dy = child.topic().y.abs_diff(5);
            assert!(dx <= 2 && dy <= 2);
            assert_eq!(child.parent(), Some(LabId::new(0)));
            assert!(!child.is_active(3));
        }
    }

    #[test]
    fn offspring_is_clamped_at_the_border() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(3, 0.1).unwrap();
        let config = PopulationConfig {
            max_topic_mutation: 10,
            ..PopulationConfig::default()
        };
        let mut parent = Lab::seed(LabId::new(0), Topic::new(0, 2), 50.0, 1);
        for i in 0..100 {
            let child = spawn_offspring(&mut parent, LabId::new(i + 1), 0, &land, &config, &mut rng);
            assert!(child.topic().x < 3 && child.topic().y < 3);
        }
    }

    #[test]
    fn parent_mutation_leaves_child_with_old_effort() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig {
            effort_mutation_probability: 1.0,
            effort_mutation_target: EffortMutationTarget::Parent,
            ..PopulationConfig::default()
        };
        let mut parent = lab_with_postdocs(0, 1);
        let child = spawn_offspring(&mut parent, LabId::new(1), 0, &land, &config, &mut rng);
        assert!((child.effort() - 50.0).abs() < f64::EPSILON);
        assert!((parent.effort() - 50.0).abs() > 0.0);
        assert!((1.0..=100.0).contains(&parent.effort()));
    }

    #[test]
    fn offspring_mutation_leaves_parent_untouched() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig {
            effort_mutation_probability: 1.0,
            effort_mutation_stdev: 1000.0,
            effort_mutation_target: EffortMutationTarget::Offspring,
            ..PopulationConfig::default()
        };
        let mut parent = lab_with_postdocs(0, 1);
        let child = spawn_offspring(&mut parent, LabId::new(1), 0, &land, &config, &mut rng);
        assert!((parent.effort() - 50.0).abs() < f64::EPSILON);
        assert!((1.0..=100.0).contains(&child.effort()));
    }
}
