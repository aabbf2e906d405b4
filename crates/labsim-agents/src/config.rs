//! Configuration for lab behaviour and population turnover.
//!
//! These values correspond to the `research` and `population` sections of
//! `labsim-config.yaml`. The core crate builds both structs from the YAML
//! sections at simulation start; tests construct them directly and
//! override single fields.

use labsim_types::EffortMutationTarget;

/// Parameters governing a lab's per-tick behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchConfig {
    /// Probability that a lab changes topic in a tick (default: 0.5).
    pub move_probability: f64,
    /// Probability that a move is a jump to a uniformly random topic
    /// rather than a diagonal step (default: 0.1).
    pub random_jump_probability: f64,
    /// Probability of detecting a true effect (default: 0.8).
    pub power: f64,
    /// How strongly effort lowers the chance of completing research
    /// (default: 0.2).
    pub effort_cost: f64,
    /// Multiplier on the principal investigator's research probability in
    /// ticks when the lab applied for funding (default: 0.2).
    pub application_cost_factor: f64,
    /// Probability that a lab submits an application in a tick
    /// (default: 1.0).
    pub apply_probability: f64,
    /// Probability that an attempt is a replication on an already
    /// published topic (default: 0.3).
    pub replication_probability: f64,
    /// Probability that a negative result is published (default: 0.5).
    pub publish_negative_probability: f64,
    /// Probability that peer review rejects a wrong result (default: 0.2).
    pub peer_review_effectiveness: f64,
    /// Base-rate increase dispersed from a topic on every publication
    /// (default: 0.0).
    pub discovery_power: f64,
    /// Weight of topic innovativeness in the application score
    /// (default: 0.0).
    pub innovation_weight: f64,
    /// Weight of relative prestige in the application score (default: 1.0).
    pub prestige_weight: f64,
    /// Base rate the landscape was initialized with; anchors the
    /// innovativeness scale (default: 0.1).
    pub initial_base_rate: f64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            move_probability: 0.5,
            random_jump_probability: 0.1,
            power: 0.8,
            effort_cost: 0.2,
            application_cost_factor: 0.2,
            apply_probability: 1.0,
            replication_probability: 0.3,
            publish_negative_probability: 0.5,
            peer_review_effectiveness: 0.2,
            discovery_power: 0.0,
            innovation_weight: 0.0,
            prestige_weight: 1.0,
            initial_base_rate: 0.1,
        }
    }
}

/// Parameters governing the death and birth lotteries.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationConfig {
    /// Number of distinct labs drawn for the death lottery (default: 10).
    pub death_sample_size: usize,
    /// Largest per-axis topic offset of a newborn lab (default: 2).
    pub max_topic_mutation: u32,
    /// Probability that reproduction perturbs effort (default: 0.1).
    pub effort_mutation_probability: f64,
    /// Standard deviation of the effort perturbation (default: 10.0).
    pub effort_mutation_stdev: f64,
    /// Which lab receives the perturbation (default: parent).
    pub effort_mutation_target: EffortMutationTarget,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            death_sample_size: 10,
            max_topic_mutation: 2,
            effort_mutation_probability: 0.1,
            effort_mutation_stdev: 10.0,
            effort_mutation_target: EffortMutationTarget::Parent,
        }
    }
}
