//! Priority bookkeeping for prioritized sweeping.

use serde::{Deserialize, Serialize};

use crate::td::MIN_UPDATE;

/// Per state-action priority accumulator.
///
/// Priorities grow by the magnitude of TD updates applied to the pair's
/// modeled successor state; a planning pass ranks the seen pairs by
/// accumulated priority and zeroes each entry as it is backed up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityPlanner {
    priorities: Vec<f64>,
}

impl PriorityPlanner {
    /// Create a planner covering `len` state-action pairs, all at priority 0.
    pub fn new(len: usize) -> Self {
        Self {
            priorities: vec![0.0; len],
        }
    }

    /// Accumulate priority on a state-action pair.
    pub fn raise(&mut self, sa: usize, amount: f64) {
        self.priorities[sa] += amount;
    }

    /// Zero the priority of a pair about to be backed up.
    pub fn clear(&mut self, sa: usize) {
        self.priorities[sa] = 0.0;
    }

    pub fn priority(&self, sa: usize) -> f64 {
        self.priorities[sa]
    }

    /// Seen pairs worth backing up, highest priority first.
    ///
    /// Entries at or below the significance threshold are dropped, so an
    /// all-quiet table yields an empty candidate list and planning becomes a
    /// no-op.
    pub fn ranked_candidates(&self, seen: &[usize]) -> Vec<usize> {
        let mut candidates: Vec<(usize, f64)> = seen
            .iter()
            .copied()
            .map(|sa| (sa, self.priorities[sa]))
            .filter(|(_, priority)| *priority > MIN_UPDATE)
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        candidates.into_iter().map(|(sa, _)| sa).collect()
    }

    /// Zero every priority.
    pub fn clear_all(&mut self) {
        self.priorities.fill(0.0);
    }
}
