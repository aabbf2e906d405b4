//! Type-safe identifier wrappers.
//!
//! Lab identifiers are plain monotonic integers: seed labs take `0..n` and
//! every lab born afterwards takes the next unused value. Identifiers are
//! never reused, so a [`LabId`] observed in one tick's snapshot can be
//! matched against later ticks without ambiguity.

use serde::{Deserialize, Serialize};

/// Unique identifier for a lab in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabId(pub u64);

impl LabId {
    /// Wrap a raw identifier value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the inner integer value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Return the identifier that follows this one.
    ///
    /// Returns `None` if the counter would overflow.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }
}

impl core::fmt::Display for LabId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "lab-{}", self.0)
    }
}

impl From<u64> for LabId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<LabId> for u64 {
    fn from(id: LabId) -> Self {
        id.0
    }
}
