//! The live lab population and its per-tick turnover.
//!
//! [`Population`] owns every live lab, hands out monotonic identifiers and
//! keeps the highest-prestige record that labs read while scoring
//! themselves. The record is taken at the start of a tick, before any lab
//! publishes, so labs always compare against the previous tick's leader.
//!
//! Turnover is one death and at most one birth per tick. The dying lab is
//! chosen first but still holds its birth-lottery tickets; it leaves the
//! population only once the newborn has been created. When no lab holds a
//! postdoc there is no birth and the population shrinks by one.

use labsim_types::{LabId, LabView, Topic};
use labsim_world::Landscape;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::PopulationConfig;
use crate::death::select_for_death;
use crate::error::AgentError;
use crate::lab::Lab;
use crate::reproduction::{select_parent, spawn_offspring};

/// Who left and who joined during one turnover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Turnover {
    /// Lab removed by the death lottery.
    pub died: Option<LabId>,
    /// Lab created by the birth lottery.
    pub born: Option<LabId>,
    /// Lab the newborn descends from.
    pub parent: Option<LabId>,
}

/// Every live lab.
#[derive(Debug, Clone)]
pub struct Population {
    labs: Vec<Lab>,
    next_id: LabId,
    highest_prestige: f64,
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl Population {
    /// Create an empty population whose first lab will get id 0.
    pub const fn new() -> Self {
        Self {
            labs: Vec::new(),
            next_id: LabId::new(0),
            highest_prestige: 0.0,
        }
    }

    /// Reserve the next unused lab identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::IdsExhausted`] if the counter would overflow.
    pub fn allocate_id(&mut self) -> Result<LabId, AgentError> {
        let id = self.next_id;
        self.next_id = id.next().ok_or(AgentError::IdsExhausted(id))?;
        Ok(id)
    }

    /// Add a seed lab and return its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::IdsExhausted`] if no identifier is left.
    pub fn add_seed(
        &mut self,
        topic: Topic,
        effort: f64,
        initial_postdocs: u32,
    ) -> Result<LabId, AgentError> {
        let id = self.allocate_id()?;
        self.labs.push(Lab::seed(id, topic, effort, initial_postdocs));
        Ok(id)
    }

    /// Number of live labs.
    pub fn len(&self) -> usize {
        self.labs.len()
    }

    /// Whether no lab is alive.
    pub fn is_empty(&self) -> bool {
        self.labs.is_empty()
    }

    /// All live labs in scheduling order.
    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    /// All live labs, mutably.
    pub fn labs_mut(&mut self) -> &mut [Lab] {
        &mut self.labs
    }

    /// Look up a lab by identifier.
    pub fn get(&self, id: LabId) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.id() == id)
    }

    /// Look up a lab by identifier, mutably.
    pub fn get_mut(&mut self, id: LabId) -> Option<&mut Lab> {
        self.labs.iter_mut().find(|lab| lab.id() == id)
    }

    /// Read-only views of every live lab.
    pub fn views(&self) -> Vec<LabView> {
        self.labs.iter().map(Lab::view).collect()
    }

    /// Highest prestige recorded by the last call to
    /// [`Self::update_highest_prestige`].
    pub const fn highest_prestige(&self) -> f64 {
        self.highest_prestige
    }

    /// Record the highest prestige among live labs (zero when empty).
    pub fn update_highest_prestige(&mut self) -> f64 {
        self.highest_prestige = self
            .labs
            .iter()
            .map(Lab::prestige)
            .fold(0.0_f64, f64::max);
        self.highest_prestige
    }

    /// Run the death and birth lotteries once.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::IdsExhausted`] if the newborn cannot get an
    /// identifier.
    pub fn turnover(
        &mut self,
        tick: u64,
        landscape: &Landscape,
        config: &PopulationConfig,
        rng: &mut impl Rng,
    ) -> Result<Turnover, AgentError> {
        let Some(dying_idx) = select_for_death(&self.labs, config.death_sample_size, rng) else {
            return Ok(Turnover::default());
        };
        let died = self.labs.get(dying_idx).map(Lab::id);

        let mut result = Turnover {
            died,
            ..Turnover::default()
        };

        let newborn = if let Some(parent_idx) = select_parent(&self.labs, rng) {
            let id = self.allocate_id()?;
            self.labs.get_mut(parent_idx).map(|parent| {
                result.parent = Some(parent.id());
                result.born = Some(id);
                spawn_offspring(parent, id, tick, landscape, config, rng)
            })
        } else {
            warn!(tick, "no lab holds a postdoc, population shrinks");
            None
        };

        self.labs.swap_remove(dying_idx);
        if let Some(child) = newborn {
            self.labs.push(child);
        }

        debug!(
            tick,
            died = ?result.died,
            born = ?result.born,
            parent = ?result.parent,
            labs = self.labs.len(),
            "population turnover"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn seeded(n: u32, postdocs: u32) -> Population {
        let mut pop = Population::new();
        for _ in 0..n {
            pop.add_seed(Topic::new(5, 5), 75.0, postdocs).unwrap();
        }
        pop
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig::default();
        let mut pop = seeded(3, 1);
        assert_eq!(pop.labs().iter().map(|l| l.id().into_inner()).collect::<Vec<_>>(), vec![0, 1, 2]);

        let first = pop.turnover(0, &land, &config, &mut rng).unwrap();
        assert_eq!(first.born, Some(LabId::new(3)));
        let second = pop.turnover(1, &land, &config, &mut rng).unwrap();
        assert_eq!(second.born, Some(LabId::new(4)));
        assert!(pop.get(first.died.unwrap()).is_none());
    }

    #[test]
    fn turnover_keeps_size_when_someone_has_a_postdoc() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig::default();
        let mut pop = seeded(20, 1);
        for tick in 0..5 {
            pop.turnover(tick, &land, &config, &mut rng).unwrap();
            assert_eq!(pop.len(), 20);
        }
    }

    #[test]
    fn turnover_shrinks_without_postdocs() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig::default();
        let mut pop = seeded(5, 0);
        let result = pop.turnover(0, &land, &config, &mut rng).unwrap();
        assert!(result.died.is_some());
        assert_eq!(result.born, None);
        assert_eq!(pop.len(), 4);
    }

    #[test]
    fn dying_lab_can_still_reproduce() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let config = PopulationConfig::default();
        let mut pop = seeded(1, 1);
        let result = pop.turnover(0, &land, &config, &mut rng).unwrap();
        assert_eq!(result.died, Some(LabId::new(0)));
        assert_eq!(result.parent, Some(LabId::new(0)));
        assert_eq!(pop.len(), 1);
        assert_eq!(pop.labs().first().map(Lab::id), Some(LabId::new(1)));
    }

    #[test]
    fn empty_population_is_left_alone() {
        let mut rng = SmallRng::seed_from_u64(42);
        let land = Landscape::new(11, 0.1).unwrap();
        let mut pop = Population::new();
        let result = pop.turnover(0, &land, &PopulationConfig::default(), &mut rng).unwrap();
        assert_eq!(result, Turnover::default());
        assert!(pop.is_empty());
        assert!(pop.update_highest_prestige().abs() < f64::EPSILON);
    }
}
