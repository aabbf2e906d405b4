//! Funding agency parameters.
//!
//! Mirrors the `funding` section of `labsim-config.yaml`.

use serde::{Deserialize, Serialize};

/// Budget and grant shape for one funding round.
///
/// The budget is counted in units of one big grant. Each unit is spent
/// either as one big grant or as several small grants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    /// Budget units spent per tick (default: 10).
    pub budget: u32,
    /// Probability that a unit becomes a big grant (default: 0.2).
    pub big_grant_probability: f64,
    /// Years of funding in a big grant (default: 5).
    pub big_grant_years: u32,
    /// Years of funding in a small grant (default: 1).
    pub small_grant_years: u32,
    /// Small grants a unit is split into (default: 4).
    pub small_grants_per_unit: u32,
    /// Allocate in random order instead of by score (default: false).
    pub lottery: bool,
    /// Add Gaussian noise to scores before ranking (default: false).
    pub evaluation_noise: bool,
    /// Standard deviation of the evaluation noise (default: 0.001).
    pub noise_stdev: f64,
}

impl Default for FundingConfig {
    fn default() -> Self {
        Self {
            budget: 10,
            big_grant_probability: 0.2,
            big_grant_years: 5,
            small_grant_years: 1,
            small_grants_per_unit: 4,
            lottery: false,
            evaluation_noise: false,
            noise_stdev: 0.001,
        }
    }
}
