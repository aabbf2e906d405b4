//! Research attempts, peer review and publication.
//!
//! Each researcher of a lab (the principal investigator plus one per
//! postdoc) may attempt one study per tick. A study tests a hypothesis on
//! the lab's topic, whose truth is drawn from the topic's base rate. The
//! lab claims a positive or negative effect, peer review may reject a wrong
//! claim, and accepted results become publications that update the
//! landscape and the lab's prestige.

use labsim_types::Topic;
use labsim_world::increase_and_disperse;
use rand::Rng;

use crate::error::AgentError;
use crate::lab::LabContext;
use crate::sampling::chance;

/// Prestige credited for publishing a replication.
pub const REPLICATION_PRESTIGE: f64 = 0.5;

/// Prestige credited for publishing a novel result.
pub const NOVEL_PRESTIGE: f64 = 1.0;

/// Tallies of one lab's research during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResearchOutcome {
    /// Researchers who went through with a study.
    pub attempts: u32,
    /// Results published.
    pub publications: u64,
    /// Published results whose claim was wrong.
    pub false_discoveries: u64,
    /// Prestige earned from the publications.
    pub prestige_gained: f64,
}

/// The part of a lab that research reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResearchTeam {
    /// Topic being studied.
    pub topic: Topic,
    /// Research effort.
    pub effort: f64,
    /// Principal investigator plus postdocs.
    pub researchers: u32,
    /// Whether the lab applied for funding this tick.
    pub applied: bool,
}

/// Probability that a researcher completes a study at the given effort.
pub fn research_probability(effort_cost: f64, effort: f64) -> f64 {
    1.0 - effort_cost * effort.log10()
}

/// Probability of claiming an effect on a false hypothesis.
///
/// Higher effort lowers the rate; at full power the rate equals the power.
pub fn false_positive_rate(power: f64, effort: f64) -> f64 {
    power / (1.0 + (1.0 - power) * effort)
}

/// Run every researcher's attempt for one tick.
///
/// # Errors
///
/// Returns [`AgentError::World`] if the team's topic lies outside the
/// landscape.
pub fn conduct<R: Rng>(
    team: &ResearchTeam,
    ctx: &mut LabContext<'_, R>,
) -> Result<ResearchOutcome, AgentError> {
    let config = ctx.config;
    let base_probability = research_probability(config.effort_cost, team.effort);
    let fp_rate = false_positive_rate(config.power, team.effort);
    let mut outcome = ResearchOutcome::default();

    for researcher in 0..team.researchers {
        let probability = if team.applied && researcher == 0 {
            base_probability * config.application_cost_factor
        } else {
            base_probability
        };
        if !chance(ctx.rng, probability) {
            continue;
        }
        outcome.attempts = outcome.attempts.saturating_add(1);

        let replication_roll = chance(ctx.rng, config.replication_probability);
        let is_replication = replication_roll && ctx.landscape.publications(team.topic)? > 0;

        let hypothesis_true = chance(ctx.rng, ctx.landscape.base_rate(team.topic)?);
        // (claims an effect, claim is right)
        let (positive, correct) = if hypothesis_true {
            let detected = chance(ctx.rng, config.power);
            (detected, detected)
        } else {
            let false_positive = chance(ctx.rng, fp_rate);
            (false_positive, !false_positive)
        };

        if !correct && chance(ctx.rng, config.peer_review_effectiveness) {
            continue;
        }
        let published = positive || chance(ctx.rng, config.publish_negative_probability);
        if !published {
            continue;
        }

        outcome.publications = outcome.publications.saturating_add(1);
        ctx.landscape.record_publication(team.topic)?;
        increase_and_disperse(ctx.landscape, team.topic, config.discovery_power)?;
        if !correct {
            outcome.false_discoveries = outcome.false_discoveries.saturating_add(1);
        }
        outcome.prestige_gained += if is_replication {
            REPLICATION_PRESTIGE
        } else {
            NOVEL_PRESTIGE
        };
    }

    Ok(outcome)
}
