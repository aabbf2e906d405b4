//! The funding agency.
//!
//! The applicant pool lives for a single tick: labs register during the
//! Labs phase and [`FundingAgency::allocate`] drains it during the Funding
//! phase, whether or not the budget was used up.
//!
//! Ranking is ascending by score, then applicants are served from the top
//! of the ranking. Among equal scores the applicant registered last is
//! served first. In lottery mode the pool is shuffled instead.
//!
//! The scores actually ranked, evaluation noise included, stay readable
//! through [`FundingAgency::evaluated`] until the next round.

use labsim_agents::sampling::{chance, standard_normal};
use labsim_types::LabId;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FundingConfig;

/// A lab waiting for funding this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    /// Applying lab.
    pub lab: LabId,
    /// Score the lab submitted.
    pub score: f64,
}

/// One grant handed to one lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Award {
    /// Funded lab.
    pub lab: LabId,
    /// Years of funding.
    pub years: u32,
}

/// Ranks applicants and spends the per-tick budget.
#[derive(Debug, Clone)]
pub struct FundingAgency {
    config: FundingConfig,
    applicants: Vec<Applicant>,
    evaluated: Vec<Applicant>,
}

impl FundingAgency {
    /// Create an agency with an empty pool.
    pub const fn new(config: FundingConfig) -> Self {
        Self {
            config,
            applicants: Vec::new(),
            evaluated: Vec::new(),
        }
    }

    /// The agency's parameters.
    pub const fn config(&self) -> &FundingConfig {
        &self.config
    }

    /// Register `lab` with `score` for this tick's round.
    pub fn apply(&mut self, lab: LabId, score: f64) {
        self.applicants.push(Applicant { lab, score });
    }

    /// Applicants registered so far this tick, in registration order.
    pub fn applicants(&self) -> &[Applicant] {
        &self.applicants
    }

    /// Applicants of the last round with the scores they were ranked by,
    /// in registration order.
    pub fn evaluated(&self) -> &[Applicant] {
        &self.evaluated
    }

    /// Run this tick's funding round and empty the pool.
    ///
    /// Returns the awards in the order they were made. Budget units left
    /// when the pool runs dry are discarded.
    pub fn allocate(&mut self, rng: &mut impl Rng) -> Vec<Award> {
        let mut pool = core::mem::take(&mut self.applicants);
        let applicants = pool.len();

        if self.config.evaluation_noise {
            for applicant in &mut pool {
                applicant.score += standard_normal(rng) * self.config.noise_stdev;
            }
        }
        self.evaluated.clone_from(&pool);
        if self.config.lottery {
            pool.shuffle(rng);
        } else {
            pool.sort_by(|a, b| a.score.total_cmp(&b.score));
        }

        let mut awards = Vec::new();
        let mut units_spent: u32 = 0;
        for _ in 0..self.config.budget {
            if pool.is_empty() {
                break;
            }
            units_spent = units_spent.saturating_add(1);
            if chance(rng, self.config.big_grant_probability) {
                if let Some(top) = pool.pop() {
                    awards.push(Award {
                        lab: top.lab,
                        years: self.config.big_grant_years,
                    });
                }
            } else {
                for _ in 0..self.config.small_grants_per_unit {
                    let Some(top) = pool.pop() else {
                        break;
                    };
                    awards.push(Award {
                        lab: top.lab,
                        years: self.config.small_grant_years,
                    });
                }
            }
        }

        debug!(
            applicants,
            awards = awards.len(),
            units_spent,
            unfunded = pool.len(),
            "funding round complete"
        );
        awards
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn agency(config: FundingConfig) -> FundingAgency {
        FundingAgency::new(config)
    }

    #[test]
    fn empty_pool_awards_nothing() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig::default());
        assert!(a.allocate(&mut rng).is_empty());
    }

    #[test]
    fn big_grants_go_to_the_top_scores() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig {
            budget: 2,
            big_grant_probability: 1.0,
            ..FundingConfig::default()
        });
        a.apply(LabId::new(0), 0.1);
        a.apply(LabId::new(1), 0.9);
        a.apply(LabId::new(2), 0.5);
        let awards = a.allocate(&mut rng);
        assert_eq!(
            awards,
            vec![
                Award { lab: LabId::new(1), years: 5 },
                Award { lab: LabId::new(2), years: 5 },
            ]
        );
        assert!(a.applicants().is_empty());
    }

    #[test]
    fn small_grants_fund_four_per_unit() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig {
            budget: 1,
            big_grant_probability: 0.0,
            ..FundingConfig::default()
        });
        for i in 0..6_u32 {
            a.apply(LabId::new(u64::from(i)), f64::from(i));
        }
        let awards = a.allocate(&mut rng);
        let funded: Vec<u64> = awards.iter().map(|w| w.lab.into_inner()).collect();
        assert_eq!(funded, vec![5, 4, 3, 2]);
        assert!(awards.iter().all(|w| w.years == 1));
    }

    #[test]
    fn ties_favour_the_latest_registration() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig {
            budget: 1,
            big_grant_probability: 1.0,
            ..FundingConfig::default()
        });
        a.apply(LabId::new(0), 0.5);
        a.apply(LabId::new(1), 0.5);
        let awards = a.allocate(&mut rng);
        assert_eq!(awards.first().map(|w| w.lab), Some(LabId::new(1)));
    }

    #[test]
    fn never_exceeds_budget_and_always_drains() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = FundingConfig::default();
        let mut a = agency(config.clone());
        for round in 0..50_u64 {
            for i in 0..(round % 60) {
                a.apply(LabId::new(i), 0.0);
            }
            let awards = a.allocate(&mut rng);
            let big = awards.iter().filter(|w| w.years == config.big_grant_years).count();
            let small = awards.len() - big;
            // Each unit is one big or up to four small grants.
            let units_needed = big + small.div_ceil(4);
            assert!(units_needed <= 10, "round {round}: {units_needed} units");
            assert!(a.applicants().is_empty());
            // Every awarded lab is distinct within a round.
            let mut labs: Vec<LabId> = awards.iter().map(|w| w.lab).collect();
            labs.sort_unstable();
            labs.dedup();
            assert_eq!(labs.len(), awards.len());
        }
    }

    #[test]
    fn lottery_ignores_scores() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig {
            budget: 1,
            big_grant_probability: 1.0,
            lottery: true,
            ..FundingConfig::default()
        });
        let mut top_wins = 0;
        for _ in 0..400 {
            a.apply(LabId::new(0), 1.0);
            a.apply(LabId::new(1), 0.0);
            if a.allocate(&mut rng).first().map(|w| w.lab) == Some(LabId::new(0)) {
                top_wins += 1;
            }
        }
        assert!((150..250).contains(&top_wins), "{top_wins}");
    }

    #[test]
    fn noise_keeps_scores_finite_and_pool_drained() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig {
            evaluation_noise: true,
            ..FundingConfig::default()
        });
        a.apply(LabId::new(0), 0.3);
        a.apply(LabId::new(1), 0.2);
        let awards = a.allocate(&mut rng);
        assert!(!awards.is_empty());
        assert!(a.applicants().is_empty());
        let scores: Vec<f64> = a.evaluated().iter().map(|e| e.score).collect();
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!(scores.iter().zip([0.3, 0.2]).any(|(s, raw)| (s - raw).abs() > f64::EPSILON));
    }

    #[test]
    fn evaluated_keeps_raw_scores_without_noise() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = agency(FundingConfig::default());
        a.apply(LabId::new(0), 0.3);
        a.apply(LabId::new(1), 0.7);
        a.allocate(&mut rng);
        assert_eq!(
            a.evaluated(),
            &[
                Applicant { lab: LabId::new(0), score: 0.3 },
                Applicant { lab: LabId::new(1), score: 0.7 },
            ]
        );
    }
}
