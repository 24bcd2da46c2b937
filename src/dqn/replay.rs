//! Replay memory: a fixed-capacity ring buffer of past transitions.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A (state, action, reward, next state, next action) transition snapshot.
///
/// State vectors are cloned when the snapshot is taken, so stored
/// experiences never alias the solver's live short-term buffers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarsaExperience {
    pub s0: Vec<f64>,
    pub a0: usize,
    pub r0: f64,
    pub s1: Vec<f64>,
    pub a1: usize,
}

/// Fixed-capacity experience store with ring-buffer overwrite semantics.
///
/// The write index increases monotonically and wraps to 0 once it reaches
/// the capacity, overwriting the oldest entry. There is no recency
/// weighting: sampling is uniform over the currently occupied length, so
/// duplicate draws are expected while the buffer is still filling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayMemory {
    entries: Vec<SarsaExperience>,
    capacity: usize,
    write_index: usize,
}

impl ReplayMemory {
    /// Create an empty replay memory with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            write_index: 0,
        }
    }

    /// Configured capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied slots, never exceeding the capacity.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored experiences in slot order (not insertion order once wrapped).
    pub fn entries(&self) -> &[SarsaExperience] {
        &self.entries
    }

    /// Insert an experience at the current write index, overwriting the
    /// oldest entry once the buffer has filled.
    pub fn insert(&mut self, experience: SarsaExperience) {
        if self.write_index < self.entries.len() {
            self.entries[self.write_index] = experience;
        } else {
            self.entries.push(experience);
        }
        self.write_index += 1;
        if self.write_index >= self.capacity {
            // roll over, oldest entries are overwritten next
            self.write_index = 0;
        }
    }

    /// Draw one experience uniformly from the occupied slots.
    ///
    /// Returns `None` on an empty buffer so callers can skip replay instead
    /// of indexing out of bounds.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<&SarsaExperience> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.entries.len());
        Some(&self.entries[index])
    }

    /// Drop all stored experiences and rewind the write index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.write_index = 0;
    }
}
