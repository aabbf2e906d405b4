//! Seeded construction of the initial simulation state.
//!
//! Setup draws from the same generator the run continues with, so a seed
//! fixes both the starting landscape and every later tick.
//!
//! 1. The landscape is filled with `world.initial_base_rate`.
//! 2. `world.established_topics` distinct random cells each receive
//!    `world.established_topic_boost`, dispersed to their surroundings.
//! 3. `population.initial_labs` seed labs are placed near a random
//!    established topic (or a uniform random cell when there is none),
//!    offset per axis by up to `population.initial_topic_spread`.

use labsim_agents::sampling::{chance, random_sign, sample_distinct};
use labsim_agents::{AgentError, Population};
use labsim_types::Topic;
use labsim_world::{Landscape, WorldError, increase_and_disperse};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::{ConfigError, SimulationConfig};
use crate::tick::SimulationState;

/// Errors that can occur while building the initial state.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// A landscape operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A seed lab could not be created.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },
}

/// Validate `config` and build the state the first tick starts from.
///
/// # Errors
///
/// Returns [`SetupError::Config`] if the configuration is invalid.
pub fn build_state(config: &SimulationConfig) -> Result<SimulationState, SetupError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.world.seed);

    let mut landscape = Landscape::new(config.world.size, config.world.initial_base_rate)?;
    let established = establish_topics(&mut landscape, config, &mut rng)?;
    let population = seed_population(&landscape, &established, config, &mut rng)?;

    info!(
        seed = config.world.seed,
        size = landscape.size(),
        established_topics = established.len(),
        labs = population.len(),
        "Initial state built"
    );
    Ok(SimulationState::with_rng(landscape, population, config, rng))
}

/// Boost `world.established_topics` distinct cells and return them.
fn establish_topics(
    landscape: &mut Landscape,
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Topic>, WorldError> {
    let count = usize::try_from(config.world.established_topics).unwrap_or(usize::MAX);
    let cells = sample_distinct(landscape.cell_count(), count, rng);
    let mut topics = Vec::with_capacity(cells.len());
    for idx in cells {
        let Some(topic) = landscape.topic_at(idx) else {
            continue;
        };
        let changed =
            increase_and_disperse(landscape, topic, config.world.established_topic_boost)?;
        debug!(x = topic.x, y = topic.y, changed, "Established topic");
        topics.push(topic);
    }
    Ok(topics)
}

fn seed_population(
    landscape: &Landscape,
    established: &[Topic],
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Population, AgentError> {
    let pop = &config.population;
    let mut population = Population::new();
    for _ in 0..pop.initial_labs {
        let anchor = match established.choose(rng) {
            Some(&topic) => topic,
            None => random_topic(landscape, rng),
        };
        let topic = offset_topic(landscape, anchor, pop.initial_topic_spread, rng);
        let postdocs = u32::from(chance(rng, pop.initial_postdoc_probability));
        population.add_seed(topic, pop.initial_effort, postdocs)?;
    }
    Ok(population)
}

fn random_topic(landscape: &Landscape, rng: &mut impl Rng) -> Topic {
    let size = landscape.size();
    let x = rng.random_range(0..size);
    let y = rng.random_range(0..size);
    Topic::new(x, y)
}

/// Move `topic` by up to `spread` on each axis, clamped to the grid.
fn offset_topic(landscape: &Landscape, topic: Topic, spread: u32, rng: &mut impl Rng) -> Topic {
    let dx = i64::from(rng.random_range(0..=spread)).saturating_mul(random_sign(rng));
    let dy = i64::from(rng.random_range(0..=spread)).saturating_mul(random_sign(rng));
    landscape.offset_clamped(topic, dx, dy)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(size: u32, labs: u32) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.size = size;
        config.population.initial_labs = labs;
        config
    }

    #[test]
    fn seeds_get_sequential_ids() {
        let state = build_state(&config(20, 8)).unwrap();
        let ids: Vec<u64> = state
            .population
            .labs()
            .iter()
            .map(|l| l.id().into_inner())
            .collect();
        assert_eq!(ids, (0..8).collect::<Vec<_>>());
        assert!(state.population.labs().iter().all(|l| l.age() == 0));
        assert!(
            state
                .population
                .labs()
                .iter()
                .all(|l| (l.effort() - 75.0).abs() < f64::EPSILON)
        );
    }

    #[test]
    fn landscape_is_flat_without_established_topics() {
        let state = build_state(&config(10, 3)).unwrap();
        assert!(
            state
                .landscape
                .base_rates()
                .iter()
                .all(|r| (r - 0.1).abs() < 1e-12)
        );
    }

    #[test]
    fn established_topics_raise_base_rates() {
        let mut cfg = config(30, 10);
        cfg.world.established_topics = 2;
        cfg.population.initial_topic_spread = 0;
        let state = build_state(&cfg).unwrap();
        let saturated = state
            .landscape
            .base_rates()
            .iter()
            .filter(|&&r| r >= 0.5 - 1e-12)
            .count();
        assert!(saturated >= 2);
        // With no spread every seed sits on a saturated topic.
        for lab in state.population.labs() {
            let rate = state.landscape.base_rate(lab.topic()).unwrap();
            assert!(rate >= 0.5 - 1e-12);
        }
    }

    #[test]
    fn initial_postdocs_follow_probability() {
        let mut cfg = config(10, 50);
        cfg.population.initial_postdoc_probability = 1.0;
        let state = build_state(&cfg).unwrap();
        assert!(state.population.labs().iter().all(|l| l.postdocs() == 1));

        cfg.population.initial_postdoc_probability = 0.0;
        let state = build_state(&cfg).unwrap();
        assert!(state.population.labs().iter().all(|l| l.postdocs() == 0));
    }

    #[test]
    fn same_seed_same_layout() {
        let cfg = config(50, 20);
        let a = build_state(&cfg).unwrap();
        let b = build_state(&cfg).unwrap();
        let topics = |s: &SimulationState| {
            s.population
                .labs()
                .iter()
                .map(labsim_agents::Lab::topic)
                .collect::<Vec<_>>()
        };
        assert_eq!(topics(&a), topics(&b));
    }

    #[test]
    fn invalid_config_fails_fast() {
        let result = build_state(&config(0, 5));
        assert!(matches!(result, Err(SetupError::Config { .. })));
    }
}
