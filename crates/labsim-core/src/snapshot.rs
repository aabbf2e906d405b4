//! Read-only view of the simulation for external collaborators.

use labsim_types::SimulationSnapshot;

use crate::tick::SimulationState;

impl SimulationState {
    /// Capture the current state.
    ///
    /// Taken between ticks, `tick` is the number of ticks completed and
    /// `latest` holds the metrics of the last of them.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.clock.tick(),
            labs: self.population.views(),
            landscape: self.landscape.snapshot(),
            latest: self.stats.latest(),
            report: self.stats.report(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use labsim_agents::Population;
    use labsim_types::Topic;
    use labsim_world::Landscape;

    use crate::config::SimulationConfig;
    use crate::tick::{SimulationState, run_tick};

    fn state() -> SimulationState {
        let mut population = Population::new();
        for _ in 0..4 {
            population.add_seed(Topic::new(2, 2), 50.0, 1).unwrap();
        }
        let landscape = Landscape::new(5, 0.1).unwrap();
        SimulationState::from_parts(landscape, population, &SimulationConfig::default())
    }

    #[test]
    fn snapshot_before_first_tick() {
        let snap = state().snapshot();
        assert_eq!(snap.tick, 0);
        assert_eq!(snap.labs.len(), 4);
        assert_eq!(snap.landscape.base_rates.len(), 25);
        assert!(snap.latest.is_none());
    }

    #[test]
    fn snapshot_tracks_completed_ticks() {
        let mut s = state();
        run_tick(&mut s).unwrap();
        run_tick(&mut s).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.tick, 2);
        assert_eq!(snap.latest.map(|t| t.tick), Some(1));
        assert_eq!(snap.report.tick, 1);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let snap = state().snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let back: labsim_types::SimulationSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.labs, snap.labs);
    }
}
