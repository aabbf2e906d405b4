//! Simulation clock.
//!
//! The clock holds the number of the tick currently being executed. Ticks
//! are 0-indexed: the scheduler runs every phase of tick `n` and only then
//! advances to `n + 1`, so newborn labs stamped with tick `n` first act in
//! tick `n + 1`.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Monotonic tick counter shared by every phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    tick: u64,
}

impl SimulationClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an arbitrary tick (useful for testing).
    pub const fn at(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance to the next tick and return the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the counter is at `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// The current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Whether the clock is still on the very first tick.
    pub const fn is_first_tick(&self) -> bool {
        self.tick == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero() {
        let clock = SimulationClock::new();
        assert_eq!(clock.tick(), 0);
        assert!(clock.is_first_tick());
    }

    #[test]
    fn advance_increments_tick() {
        let mut clock = SimulationClock::new();
        assert_eq!(clock.advance().ok(), Some(1));
        assert_eq!(clock.advance().ok(), Some(2));
        assert!(!clock.is_first_tick());
    }

    #[test]
    fn advance_overflow_is_an_error() {
        let mut clock = SimulationClock::at(u64::MAX);
        assert!(matches!(clock.advance(), Err(ClockError::TickOverflow)));
        assert_eq!(clock.tick(), u64::MAX);
    }
}
