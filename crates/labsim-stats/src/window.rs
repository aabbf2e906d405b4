//! Bounded FIFO of per-tick values.

use std::collections::VecDeque;

/// Keeps the most recent `capacity` values; pushing into a full window
/// evicts the oldest value.
#[derive(Debug, Clone, PartialEq)]
pub struct Window<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> Window<T> {
    /// Create an empty window holding at most `capacity` values.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append `value`, evicting the oldest value if the window is full.
    pub fn push(&mut self, value: T) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Maximum number of values kept.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of values currently held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the window holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }

    /// Most recently pushed value.
    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    /// Arithmetic mean of `f` over the window, zero when empty.
    pub fn mean_by(&self, f: impl Fn(&T) -> f64) -> f64 {
        let values: Vec<f64> = self.values.iter().map(f).collect();
        crate::inequality::mean(&values)
    }
}
