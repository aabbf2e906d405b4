//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Which lab receives the Gaussian effort perturbation when a lab
/// reproduces.
///
/// By default the *parent* is perturbed after the child has copied its
/// effort, so the child always starts with the unmutated value.
/// `Offspring` applies the perturbation to the newborn lab instead and
/// leaves the parent untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortMutationTarget {
    /// Mutate the reproducing lab's effort.
    #[default]
    Parent,
    /// Mutate the newborn lab's inherited effort.
    Offspring,
}

impl core::fmt::Display for EffortMutationTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parent => write!(f, "parent"),
            Self::Offspring => write!(f, "offspring"),
        }
    }
}
