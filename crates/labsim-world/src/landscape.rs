//! Topic landscape: base-rate and publication grids.
//!
//! The [`Landscape`] owns every topic cell. Cells are stored in two flat
//! row-major vectors indexed by `y * size + x`, so neighbour lookups and
//! the visited bitmap used by diffusion are plain index arithmetic.
//!
//! Base rates are clamped to `[0, MAX_BASE_RATE]` on every write and
//! publication counts only ever grow.

use labsim_types::{LandscapeSnapshot, Topic};

use crate::error::WorldError;

/// Upper bound of any cell's base rate.
pub const MAX_BASE_RATE: f64 = 0.5;

/// Offsets of the eight Moore neighbours.
const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The square grid of research topics.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landscape {
    /// Side length of the grid.
    size: u32,
    /// Base rate per cell, row-major.
    base_rates: Vec<f64>,
    /// Publication count per cell, row-major.
    publications: Vec<u64>,
}

impl Landscape {
    /// Create a `size` x `size` landscape with every base rate set to
    /// `initial_rate` (clamped) and no publications.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::ZeroSize`] if `size` is zero, or
    /// [`WorldError::TooLarge`] if the cell count does not fit in memory
    /// indices.
    pub fn new(size: u32, initial_rate: f64) -> Result<Self, WorldError> {
        if size == 0 {
            return Err(WorldError::ZeroSize);
        }
        let cells = u64::from(size)
            .checked_mul(u64::from(size))
            .and_then(|n| usize::try_from(n).ok())
            .ok_or(WorldError::TooLarge(size))?;
        Ok(Self {
            size,
            base_rates: vec![clamp_rate(initial_rate); cells],
            publications: vec![0; cells],
        })
    }

    /// Side length of the grid.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.base_rates.len()
    }

    /// Flat index of `topic`, or `None` when it lies outside the grid.
    pub fn index_of(&self, topic: Topic) -> Option<usize> {
        if topic.x >= self.size || topic.y >= self.size {
            return None;
        }
        let flat = u64::from(topic.y)
            .checked_mul(u64::from(self.size))?
            .checked_add(u64::from(topic.x))?;
        usize::try_from(flat).ok()
    }

    /// Topic stored at flat index `index`, or `None` when out of range.
    pub fn topic_at(&self, index: usize) -> Option<Topic> {
        if index >= self.cell_count() {
            return None;
        }
        let flat = u64::try_from(index).ok()?;
        let size = u64::from(self.size);
        let x = u32::try_from(flat.checked_rem(size)?).ok()?;
        let y = u32::try_from(flat.checked_div(size)?).ok()?;
        Some(Topic::new(x, y))
    }

    fn checked_index(&self, topic: Topic) -> Result<usize, WorldError> {
        self.index_of(topic).ok_or(WorldError::OutOfBounds {
            x: topic.x,
            y: topic.y,
            size: self.size,
        })
    }

    // -------------------------------------------------------------------
    // Cell access
    // -------------------------------------------------------------------

    /// Base rate of `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `topic` lies outside the grid.
    pub fn base_rate(&self, topic: Topic) -> Result<f64, WorldError> {
        let idx = self.checked_index(topic)?;
        self.base_rates
            .get(idx)
            .copied()
            .ok_or(WorldError::OutOfBounds {
                x: topic.x,
                y: topic.y,
                size: self.size,
            })
    }

    /// Set the base rate of `topic`, clamped to `[0, MAX_BASE_RATE]`.
    ///
    /// Returns the value actually stored.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `topic` lies outside the grid.
    pub fn set_base_rate(&mut self, topic: Topic, rate: f64) -> Result<f64, WorldError> {
        let idx = self.checked_index(topic)?;
        let stored = clamp_rate(rate);
        if let Some(cell) = self.base_rates.get_mut(idx) {
            *cell = stored;
        }
        Ok(stored)
    }

    /// Number of publications on `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `topic` lies outside the grid.
    pub fn publications(&self, topic: Topic) -> Result<u64, WorldError> {
        let idx = self.checked_index(topic)?;
        Ok(self.publications.get(idx).copied().unwrap_or(0))
    }

    /// Count one more publication on `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `topic` lies outside the grid.
    pub fn record_publication(&mut self, topic: Topic) -> Result<(), WorldError> {
        let idx = self.checked_index(topic)?;
        if let Some(count) = self.publications.get_mut(idx) {
            *count = count.saturating_add(1);
        }
        Ok(())
    }

    /// All base rates in row-major order.
    pub fn base_rates(&self) -> &[f64] {
        &self.base_rates
    }

    /// All publication counts in row-major order.
    pub fn publication_counts(&self) -> &[u64] {
        &self.publications
    }

    pub(crate) fn base_rate_at(&self, index: usize) -> Option<f64> {
        self.base_rates.get(index).copied()
    }

    pub(crate) fn set_base_rate_at(&mut self, index: usize, rate: f64) {
        if let Some(cell) = self.base_rates.get_mut(index) {
            *cell = clamp_rate(rate);
        }
    }

    // -------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------

    /// The up-to-eight Moore neighbours of `topic` that lie on the grid.
    ///
    /// Cells on the border have fewer neighbours; the grid does not wrap.
    pub fn neighbors8(&self, topic: Topic) -> Vec<Topic> {
        let size = i64::from(self.size);
        let x = i64::from(topic.x);
        let y = i64::from(topic.y);
        MOORE_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| {
                let nx = x.checked_add(dx)?;
                let ny = y.checked_add(dy)?;
                if nx < 0 || ny < 0 || nx >= size || ny >= size {
                    return None;
                }
                Some(Topic::new(u32::try_from(nx).ok()?, u32::try_from(ny).ok()?))
            })
            .collect()
    }

    /// Clamp a signed coordinate onto `[0, size - 1]`.
    pub fn clamp_coordinate(&self, value: i64) -> u32 {
        let max = i64::from(self.size.saturating_sub(1));
        u32::try_from(value.clamp(0, max)).unwrap_or(0)
    }

    /// Move `topic` by `(dx, dy)`, clamping each axis onto the grid.
    pub fn offset_clamped(&self, topic: Topic, dx: i64, dy: i64) -> Topic {
        let x = i64::from(topic.x).saturating_add(dx);
        let y = i64::from(topic.y).saturating_add(dy);
        Topic::new(self.clamp_coordinate(x), self.clamp_coordinate(y))
    }

    /// Copy both grids into a serializable snapshot.
    pub fn snapshot(&self) -> LandscapeSnapshot {
        LandscapeSnapshot {
            size: self.size,
            base_rates: self.base_rates.clone(),
            publications: self.publications.clone(),
        }
    }
}

/// Clamp a base rate into `[0, MAX_BASE_RATE]`; NaN becomes zero.
fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, MAX_BASE_RATE)
    }
}
