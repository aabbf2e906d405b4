//! Configuration loading and typed config structures for the lab funding
//! simulation.
//!
//! The canonical configuration lives in `labsim-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader, and [`SimulationConfig::validate`], which rejects
//! out-of-range values before the run loop starts.
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use labsim_funding::FundingConfig;
use labsim_stats::StatisticsConfig;
use labsim_types::EffortMutationTarget;
use serde::Deserialize;

/// Environment variable that overrides `world.seed`.
pub const SEED_ENV_VAR: &str = "LABSIM_SEED";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `labsim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Landscape and run-length settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Seed labs and the death and birth lotteries.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Per-tick lab behaviour.
    #[serde(default)]
    pub research: ResearchConfig,

    /// Funding agency budget and grant shape.
    #[serde(default)]
    pub funding: FundingConfig,

    /// Statistics window sizes.
    #[serde(default)]
    pub statistics: StatisticsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Tabular log and final snapshot output.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `LABSIM_SEED`, when set to an integer, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var(SEED_ENV_VAR)
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
        {
            self.world.seed = seed;
        }
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.size == 0 {
            return Err(invalid("world.size must be at least 1"));
        }
        let rate = world.initial_base_rate;
        if !(rate > 0.0 && rate < labsim_world::MAX_BASE_RATE) {
            return Err(invalid(format!(
                "world.initial_base_rate must lie in (0, {}), got {rate}",
                labsim_world::MAX_BASE_RATE
            )));
        }
        let cells = u64::from(world.size).saturating_mul(u64::from(world.size));
        if u64::from(world.established_topics) > cells {
            return Err(invalid(format!(
                "world.established_topics ({}) exceeds the {cells} landscape cells",
                world.established_topics
            )));
        }
        non_negative("world.established_topic_boost", world.established_topic_boost)?;

        let pop = &self.population;
        if pop.initial_labs == 0 {
            return Err(invalid("population.initial_labs must be at least 1"));
        }
        if !(labsim_agents::MIN_EFFORT..=labsim_agents::MAX_EFFORT).contains(&pop.initial_effort) {
            return Err(invalid(format!(
                "population.initial_effort must lie in [{}, {}], got {}",
                labsim_agents::MIN_EFFORT,
                labsim_agents::MAX_EFFORT,
                pop.initial_effort
            )));
        }
        if pop.death_sample_size == 0 {
            return Err(invalid("population.death_sample_size must be at least 1"));
        }
        probability(
            "population.initial_postdoc_probability",
            pop.initial_postdoc_probability,
        )?;
        probability(
            "population.effort_mutation_probability",
            pop.effort_mutation_probability,
        )?;
        non_negative("population.effort_mutation_stdev", pop.effort_mutation_stdev)?;

        let r = &self.research;
        for (name, value) in [
            ("research.move_probability", r.move_probability),
            ("research.random_jump_probability", r.random_jump_probability),
            ("research.power", r.power),
            ("research.apply_probability", r.apply_probability),
            ("research.replication_probability", r.replication_probability),
            (
                "research.publish_negative_probability",
                r.publish_negative_probability,
            ),
            (
                "research.peer_review_effectiveness",
                r.peer_review_effectiveness,
            ),
            ("research.application_cost_factor", r.application_cost_factor),
        ] {
            probability(name, value)?;
        }
        for (name, value) in [
            ("research.effort_cost", r.effort_cost),
            ("research.discovery_power", r.discovery_power),
            ("research.innovation_weight", r.innovation_weight),
            ("research.prestige_weight", r.prestige_weight),
        ] {
            non_negative(name, value)?;
        }

        let f = &self.funding;
        probability("funding.big_grant_probability", f.big_grant_probability)?;
        non_negative("funding.noise_stdev", f.noise_stdev)?;

        if self.statistics.window_size == 0 {
            return Err(invalid("statistics.window_size must be at least 1"));
        }
        if self.statistics.landscape_window_size == 0 {
            return Err(invalid(
                "statistics.landscape_window_size must be at least 1",
            ));
        }
        if self.output.report_interval == 0 {
            return Err(invalid("output.report_interval must be at least 1"));
        }
        Ok(())
    }

    /// Lab behaviour parameters for the agents crate.
    pub fn lab_research(&self) -> labsim_agents::ResearchConfig {
        let r = &self.research;
        labsim_agents::ResearchConfig {
            move_probability: r.move_probability,
            random_jump_probability: r.random_jump_probability,
            power: r.power,
            effort_cost: r.effort_cost,
            application_cost_factor: r.application_cost_factor,
            apply_probability: r.apply_probability,
            replication_probability: r.replication_probability,
            publish_negative_probability: r.publish_negative_probability,
            peer_review_effectiveness: r.peer_review_effectiveness,
            discovery_power: r.discovery_power,
            innovation_weight: r.innovation_weight,
            prestige_weight: r.prestige_weight,
            initial_base_rate: self.world.initial_base_rate,
        }
    }

    /// Turnover parameters for the agents crate.
    pub const fn lab_population(&self) -> labsim_agents::PopulationConfig {
        let p = &self.population;
        labsim_agents::PopulationConfig {
            death_sample_size: p.death_sample_size,
            max_topic_mutation: p.max_topic_mutation,
            effort_mutation_probability: p.effort_mutation_probability,
            effort_mutation_stdev: p.effort_mutation_stdev,
            effort_mutation_target: p.effort_mutation_target,
        }
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

fn probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!("{name} must lie in [0, 1], got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

/// Landscape and run-length configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of ticks the engine runs.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Side length of the square landscape.
    #[serde(default = "default_size")]
    pub size: u32,

    /// Base rate every cell starts with.
    #[serde(default = "default_initial_base_rate")]
    pub initial_base_rate: f64,

    /// Number of random cells boosted at setup.
    #[serde(default)]
    pub established_topics: u32,

    /// Base-rate increase dispersed from each established topic.
    #[serde(default = "default_established_topic_boost")]
    pub established_topic_boost: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_ticks: default_max_ticks(),
            size: default_size(),
            initial_base_rate: default_initial_base_rate(),
            established_topics: 0,
            established_topic_boost: default_established_topic_boost(),
        }
    }
}

/// Seed labs and turnover configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Number of labs created at setup.
    #[serde(default = "default_initial_labs")]
    pub initial_labs: u32,

    /// Effort of every seed lab.
    #[serde(default = "default_initial_effort")]
    pub initial_effort: f64,

    /// Probability that a seed lab starts with one postdoc.
    #[serde(default = "default_initial_postdoc_probability")]
    pub initial_postdoc_probability: f64,

    /// Largest per-axis distance of a seed lab from its anchor topic.
    #[serde(default = "default_topic_offset")]
    pub initial_topic_spread: u32,

    /// Labs drawn for the death lottery.
    #[serde(default = "default_death_sample_size")]
    pub death_sample_size: usize,

    /// Largest per-axis topic offset of a newborn lab.
    #[serde(default = "default_topic_offset")]
    pub max_topic_mutation: u32,

    /// Probability that reproduction perturbs effort.
    #[serde(default = "default_effort_mutation_probability")]
    pub effort_mutation_probability: f64,

    /// Standard deviation of the effort perturbation.
    #[serde(default = "default_effort_mutation_stdev")]
    pub effort_mutation_stdev: f64,

    /// Which lab receives the effort perturbation.
    #[serde(default)]
    pub effort_mutation_target: EffortMutationTarget,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_labs: default_initial_labs(),
            initial_effort: default_initial_effort(),
            initial_postdoc_probability: default_initial_postdoc_probability(),
            initial_topic_spread: default_topic_offset(),
            death_sample_size: default_death_sample_size(),
            max_topic_mutation: default_topic_offset(),
            effort_mutation_probability: default_effort_mutation_probability(),
            effort_mutation_stdev: default_effort_mutation_stdev(),
            effort_mutation_target: EffortMutationTarget::default(),
        }
    }
}

/// Per-tick lab behaviour configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResearchConfig {
    /// Probability that a lab changes topic in a tick.
    #[serde(default = "default_half")]
    pub move_probability: f64,

    /// Probability that a move is a random jump.
    #[serde(default = "default_random_jump_probability")]
    pub random_jump_probability: f64,

    /// Probability of detecting a true effect.
    #[serde(default = "default_power")]
    pub power: f64,

    /// How strongly effort lowers the chance of completing research.
    #[serde(default = "default_cost_factor")]
    pub effort_cost: f64,

    /// PI research probability multiplier in ticks the lab applied.
    #[serde(default = "default_cost_factor")]
    pub application_cost_factor: f64,

    /// Probability that a lab applies for funding in a tick.
    #[serde(default = "default_one")]
    pub apply_probability: f64,

    /// Probability that an attempt replicates a published topic.
    #[serde(default = "default_replication_probability")]
    pub replication_probability: f64,

    /// Probability that a negative result is published.
    #[serde(default = "default_half")]
    pub publish_negative_probability: f64,

    /// Probability that peer review rejects a wrong result.
    #[serde(default = "default_cost_factor")]
    pub peer_review_effectiveness: f64,

    /// Base-rate increase dispersed on every publication.
    #[serde(default)]
    pub discovery_power: f64,

    /// Weight of innovativeness in the application score.
    #[serde(default)]
    pub innovation_weight: f64,

    /// Weight of relative prestige in the application score.
    #[serde(default = "default_one")]
    pub prestige_weight: f64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            move_probability: default_half(),
            random_jump_probability: default_random_jump_probability(),
            power: default_power(),
            effort_cost: default_cost_factor(),
            application_cost_factor: default_cost_factor(),
            apply_probability: default_one(),
            replication_probability: default_replication_probability(),
            publish_negative_probability: default_half(),
            peer_review_effectiveness: default_cost_factor(),
            discovery_power: 0.0,
            innovation_weight: 0.0,
            prestige_weight: default_one(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Output configuration for the engine binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the tabular log and the final snapshot.
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Ticks between two rows of the tabular log.
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,

    /// Write a JSON snapshot after the last tick.
    #[serde(default = "default_true")]
    pub write_final_snapshot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            report_interval: default_report_interval(),
            write_final_snapshot: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_max_ticks() -> u64 {
    1000
}

const fn default_size() -> u32 {
    200
}

const fn default_initial_base_rate() -> f64 {
    0.1
}

const fn default_established_topic_boost() -> f64 {
    0.499
}

const fn default_initial_labs() -> u32 {
    100
}

const fn default_initial_effort() -> f64 {
    75.0
}

const fn default_initial_postdoc_probability() -> f64 {
    0.05
}

const fn default_topic_offset() -> u32 {
    2
}

const fn default_death_sample_size() -> usize {
    10
}

const fn default_effort_mutation_probability() -> f64 {
    0.1
}

const fn default_effort_mutation_stdev() -> f64 {
    10.0
}

const fn default_half() -> f64 {
    0.5
}

const fn default_random_jump_probability() -> f64 {
    0.1
}

const fn default_power() -> f64 {
    0.8
}

const fn default_cost_factor() -> f64 {
    0.2
}

const fn default_one() -> f64 {
    1.0
}

const fn default_replication_probability() -> f64 {
    0.3
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_output_directory() -> String {
    "output".to_owned()
}

const fn default_report_interval() -> u64 {
    10
}

const fn default_true() -> bool {
    true
}
