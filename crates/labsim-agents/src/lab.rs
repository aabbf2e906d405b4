//! The lab record and its per-tick state machine.
//!
//! Each tick a scheduled lab runs, in order:
//!
//! 1. Ages by one tick.
//! 2. Drops expired grants and sets its postdoc count to the number of
//!    remaining grants (skipped on the very first tick of a run, so a seed
//!    lab's initial postdoc works once).
//! 3. Possibly relocates on the landscape.
//! 4. Scores itself for funding and possibly applies.
//! 5. Runs one research attempt per researcher and publishes results.
//! 6. Consumes one year of every grant it holds.
//!
//! Application and publication outcomes are returned in a [`LabTurn`]; the
//! scheduler forwards applications to the funding agency and counts
//! publications for the statistics collector.

use labsim_types::{Grant, LabId, LabView, Topic};
use labsim_world::{Landscape, MAX_BASE_RATE};
use rand::Rng;

use crate::config::ResearchConfig;
use crate::error::AgentError;
use crate::research::{self, ResearchOutcome, ResearchTeam};
use crate::sampling::{chance, random_sign};

/// Lowest effort a lab can have.
pub const MIN_EFFORT: f64 = 1.0;

/// Highest effort a lab can have.
pub const MAX_EFFORT: f64 = 100.0;

/// Clamp an effort value into `[MIN_EFFORT, MAX_EFFORT]`; NaN maps to the
/// minimum.
pub(crate) fn clamp_effort(effort: f64) -> f64 {
    if effort.is_nan() {
        MIN_EFFORT
    } else {
        effort.clamp(MIN_EFFORT, MAX_EFFORT)
    }
}

/// Replace a non-finite value with zero.
const fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Everything a lab reads or writes while acting, besides itself.
pub struct LabContext<'a, R: Rng> {
    /// The shared landscape.
    pub landscape: &'a mut Landscape,
    /// Lab behaviour parameters.
    pub config: &'a ResearchConfig,
    /// Highest prestige in the population at the start of the tick.
    pub highest_prestige: f64,
    /// Whether this is the first tick of the run.
    pub first_tick: bool,
    /// The simulation's random stream.
    pub rng: &'a mut R,
}

/// What a lab did during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LabTurn {
    /// Whether the lab registered with the funding agency.
    pub applied: bool,
    /// Research and publication tallies.
    pub research: ResearchOutcome,
}

/// A research lab.
#[derive(Debug, Clone, PartialEq)]
pub struct Lab {
    id: LabId,
    parent: Option<LabId>,
    topic: Topic,
    effort: f64,
    prestige: f64,
    age: u64,
    grants: Vec<Grant>,
    postdocs: u32,
    application_score: f64,
    innovativeness: f64,
    relative_prestige: f64,
    born_at_tick: u64,
    active_from_tick: u64,
}

impl Lab {
    /// Create a seed lab present from the start of the run.
    ///
    /// `initial_postdocs` are funded without a grant record, so they vanish
    /// at the lab's first refresh.
    pub fn seed(id: LabId, topic: Topic, effort: f64, initial_postdocs: u32) -> Self {
        Self {
            id,
            parent: None,
            topic,
            effort: clamp_effort(effort),
            prestige: 0.0,
            age: 0,
            grants: Vec::new(),
            postdocs: initial_postdocs,
            application_score: 0.0,
            innovativeness: 0.0,
            relative_prestige: 0.0,
            born_at_tick: 0,
            active_from_tick: 0,
        }
    }

    /// Create a lab born from `parent` during `tick`.
    ///
    /// The newborn first acts on the following tick.
    pub fn offspring(id: LabId, parent: LabId, topic: Topic, effort: f64, tick: u64) -> Self {
        Self {
            parent: Some(parent),
            born_at_tick: tick,
            active_from_tick: tick.saturating_add(1),
            ..Self::seed(id, topic, effort, 0)
        }
    }

    // -------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------

    /// Lab identifier.
    pub const fn id(&self) -> LabId {
        self.id
    }

    /// Lab this one was born from.
    pub const fn parent(&self) -> Option<LabId> {
        self.parent
    }

    /// Current topic.
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Research effort in `[MIN_EFFORT, MAX_EFFORT]`.
    pub const fn effort(&self) -> f64 {
        self.effort
    }

    /// Accumulated prestige.
    pub const fn prestige(&self) -> f64 {
        self.prestige
    }

    /// Ticks lived.
    pub const fn age(&self) -> u64 {
        self.age
    }

    /// Grants currently held, including expired ones awaiting refresh.
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Postdoc count as of the last refresh.
    pub const fn postdocs(&self) -> u32 {
        self.postdocs
    }

    /// Sum of remaining years over all grants.
    pub fn total_funds(&self) -> u64 {
        self.grants
            .iter()
            .fold(0_u64, |acc, g| acc.saturating_add(u64::from(g.years_remaining)))
    }

    /// Score computed at the most recent application.
    pub const fn application_score(&self) -> f64 {
        self.application_score
    }

    /// Innovativeness of the topic at the most recent application.
    pub const fn innovativeness(&self) -> f64 {
        self.innovativeness
    }

    /// Prestige relative to the population record at the most recent
    /// application.
    pub const fn relative_prestige(&self) -> f64 {
        self.relative_prestige
    }

    /// Tick during which the lab was born (zero for seed labs).
    pub const fn born_at_tick(&self) -> u64 {
        self.born_at_tick
    }

    /// Whether the lab is scheduled to act during `tick`.
    pub const fn is_active(&self, tick: u64) -> bool {
        tick >= self.active_from_tick
    }

    /// Read-only projection for external consumers.
    pub fn view(&self) -> LabView {
        LabView {
            id: self.id,
            parent: self.parent,
            topic: self.topic,
            age: self.age,
            prestige: self.prestige,
            postdocs: self.postdocs,
            grant_years: self.grants.iter().map(|g| g.years_remaining).collect(),
            effort: self.effort,
            application_score: self.application_score,
        }
    }

    // -------------------------------------------------------------------
    // Mutators used by the scheduler and the lotteries
    // -------------------------------------------------------------------

    /// Add a grant lasting `years`.
    pub fn award(&mut self, years: u32) {
        self.grants.push(Grant::new(years));
    }

    /// Replace the application score with the one the agency ranked.
    pub const fn set_application_score(&mut self, score: f64) {
        self.application_score = finite_or_zero(score);
    }

    /// Shift effort by `delta`, clamped to `[MIN_EFFORT, MAX_EFFORT]`.
    pub fn perturb_effort(&mut self, delta: f64) {
        self.effort = clamp_effort(self.effort + delta);
    }

    // -------------------------------------------------------------------
    // Per-tick state machine
    // -------------------------------------------------------------------

    /// Run one tick of lab behaviour.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::World`] if the lab's topic lies outside the
    /// landscape.
    pub fn act<R: Rng>(&mut self, ctx: &mut LabContext<'_, R>) -> Result<LabTurn, AgentError> {
        self.age = self.age.saturating_add(1);
        if !ctx.first_tick {
            self.refresh_funding();
        }
        self.relocate(ctx);
        let applied = self.apply_for_funding(ctx)?;

        let team = ResearchTeam {
            topic: self.topic,
            effort: self.effort,
            researchers: self.postdocs.saturating_add(1),
            applied,
        };
        let outcome = research::conduct(&team, ctx)?;
        self.prestige += outcome.prestige_gained;

        self.consume_funding();
        Ok(LabTurn {
            applied,
            research: outcome,
        })
    }

    /// Drop expired grants and count one postdoc per remaining grant.
    pub fn refresh_funding(&mut self) {
        self.grants.retain(|g| !g.is_expired());
        self.postdocs = u32::try_from(self.grants.len()).unwrap_or(u32::MAX);
    }

    /// Consume one year of every grant.
    pub fn consume_funding(&mut self) {
        for grant in &mut self.grants {
            grant.tick_down();
        }
    }

    fn relocate<R: Rng>(&mut self, ctx: &mut LabContext<'_, R>) {
        if !chance(ctx.rng, ctx.config.move_probability) {
            return;
        }
        if chance(ctx.rng, ctx.config.random_jump_probability) {
            let size = ctx.landscape.size();
            let x = ctx.rng.random_range(0..size);
            let y = ctx.rng.random_range(0..size);
            self.topic = Topic::new(x, y);
        } else {
            let dx = random_sign(ctx.rng);
            let dy = random_sign(ctx.rng);
            self.topic = ctx.landscape.offset_clamped(self.topic, dx, dy);
        }
    }

    /// Compute the application score and decide whether to apply.
    fn apply_for_funding<R: Rng>(
        &mut self,
        ctx: &mut LabContext<'_, R>,
    ) -> Result<bool, AgentError> {
        let config = ctx.config;
        let base_rate = ctx.landscape.base_rate(self.topic)?;
        let initial = config.initial_base_rate;

        self.innovativeness =
            finite_or_zero(1.0 - (base_rate / initial).ln() / (MAX_BASE_RATE / initial).ln());
        self.relative_prestige = if ctx.highest_prestige > 0.0 {
            finite_or_zero(self.prestige / ctx.highest_prestige)
        } else {
            0.0
        };
        self.application_score = finite_or_zero(
            config.innovation_weight * self.innovativeness
                + config.prestige_weight * self.relative_prestige,
        );

        Ok(chance(ctx.rng, config.apply_probability))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn quiet_config() -> ResearchConfig {
        ResearchConfig {
            move_probability: 0.0,
            ..ResearchConfig::default()
        }
    }

    fn run_tick(
        lab: &mut Lab,
        landscape: &mut Landscape,
        config: &ResearchConfig,
        first_tick: bool,
        rng: &mut SmallRng,
    ) -> LabTurn {
        let mut ctx = LabContext {
            landscape,
            config,
            highest_prestige: 0.0,
            first_tick,
            rng,
        };
        lab.act(&mut ctx).unwrap()
    }

    #[test]
    fn grant_counts_as_postdoc_for_exactly_its_duration() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut land = Landscape::new(5, 0.1).unwrap();
        let config = quiet_config();
        let mut lab = Lab::seed(LabId::new(0), Topic::new(2, 2), 75.0, 0);

        run_tick(&mut lab, &mut land, &config, true, &mut rng);
        lab.award(3);

        let mut postdocs = Vec::new();
        for _ in 0..5 {
            run_tick(&mut lab, &mut land, &config, false, &mut rng);
            postdocs.push(lab.postdocs());
        }
        assert_eq!(postdocs, vec![1, 1, 1, 0, 0]);
        assert!(lab.grants().is_empty());
    }

    #[test]
    fn initial_postdoc_works_only_on_first_tick() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut land = Landscape::new(5, 0.1).unwrap();
        let config = quiet_config();
        let mut lab = Lab::seed(LabId::new(0), Topic::new(2, 2), 75.0, 1);

        run_tick(&mut lab, &mut land, &config, true, &mut rng);
        assert_eq!(lab.postdocs(), 1);
        run_tick(&mut lab, &mut land, &config, false, &mut rng);
        assert_eq!(lab.postdocs(), 0);
        assert_eq!(lab.age(), 2);
    }

    #[test]
    fn relocation_stays_on_grid() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut land = Landscape::new(3, 0.1).unwrap();
        let config = ResearchConfig {
            move_probability: 1.0,
            random_jump_probability: 0.3,
            ..ResearchConfig::default()
        };
        let mut lab = Lab::seed(LabId::new(0), Topic::new(0, 0), 50.0, 0);
        for first in [true, false, false, false, false, false, false, false] {
            run_tick(&mut lab, &mut land, &config, first, &mut rng);
            assert!(lab.topic().x < 3 && lab.topic().y < 3);
        }
    }

    #[test]
    fn score_is_relative_prestige_by_default() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut land = Landscape::new(3, 0.1).unwrap();
        let config = ResearchConfig {
            apply_probability: 1.0,
            ..quiet_config()
        };
        let mut lab = Lab::seed(LabId::new(0), Topic::new(1, 1), 75.0, 0);
        lab.prestige = 2.0;
        let mut ctx = LabContext {
            landscape: &mut land,
            config: &config,
            highest_prestige: 8.0,
            first_tick: true,
            rng: &mut rng,
        };
        let applied = lab.apply_for_funding(&mut ctx).unwrap();
        assert!(applied);
        assert!((lab.relative_prestige() - 0.25).abs() < 1e-12);
        assert!((lab.application_score() - 0.25).abs() < 1e-12);
        // Topic at the initial base rate is maximally innovative.
        assert!((lab.innovativeness() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_record_and_zero_base_rate_give_finite_scores() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut land = Landscape::new(3, 0.1).unwrap();
        land.set_base_rate(Topic::new(1, 1), 0.0).unwrap();
        let config = ResearchConfig {
            innovation_weight: 1.0,
            ..quiet_config()
        };
        let mut lab = Lab::seed(LabId::new(0), Topic::new(1, 1), 75.0, 0);
        let mut ctx = LabContext {
            landscape: &mut land,
            config: &config,
            highest_prestige: 0.0,
            first_tick: true,
            rng: &mut rng,
        };
        lab.apply_for_funding(&mut ctx).unwrap();
        assert!(lab.application_score().is_finite());
        assert!(lab.relative_prestige().abs() < f64::EPSILON);
    }

    #[test]
    fn newborn_waits_one_tick() {
        let lab = Lab::offspring(LabId::new(9), LabId::new(1), Topic::new(0, 0), 40.0, 7);
        assert!(!lab.is_active(7));
        assert!(lab.is_active(8));
        assert_eq!(lab.parent(), Some(LabId::new(1)));
        assert_eq!(lab.born_at_tick(), 7);
    }

    #[test]
    fn effort_is_clamped() {
        let mut lab = Lab::seed(LabId::new(0), Topic::new(0, 0), 250.0, 0);
        assert!((lab.effort() - MAX_EFFORT).abs() < f64::EPSILON);
        lab.perturb_effort(-500.0);
        assert!((lab.effort() - MIN_EFFORT).abs() < f64::EPSILON);
    }
}
