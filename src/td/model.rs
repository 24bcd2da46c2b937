//! Learned environment model for Dyna-style planning.

use serde::{Deserialize, Serialize};

/// Deterministic (state, action) → (next state, reward) model, learned from
/// observed transitions.
///
/// Entries are addressed by flat state-action index. A pair that was never
/// observed has no next state; the seen-list records each pair exactly once,
/// in first-observed order, and is the candidate set for planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentModel {
    next_states: Vec<Option<usize>>,
    rewards: Vec<f64>,
    seen: Vec<usize>,
}

impl EnvironmentModel {
    /// Create an empty model covering `len` state-action pairs.
    pub fn new(len: usize) -> Self {
        Self {
            next_states: vec![None; len],
            rewards: vec![0.0; len],
            seen: Vec::new(),
        }
    }

    /// Record an observed transition, marking the pair seen on first
    /// observation.
    pub fn record(&mut self, sa: usize, next_state: usize, reward: f64) {
        if self.next_states[sa].is_none() {
            self.seen.push(sa);
        }
        self.next_states[sa] = Some(next_state);
        self.rewards[sa] = reward;
    }

    /// Modeled successor of a state-action pair, `None` if never observed.
    pub fn next_state(&self, sa: usize) -> Option<usize> {
        self.next_states[sa]
    }

    /// Modeled reward of a state-action pair (0.0 if never observed).
    pub fn reward(&self, sa: usize) -> f64 {
        self.rewards[sa]
    }

    /// Whether the pair is modeled to lead into `state`.
    pub fn predicts(&self, sa: usize, state: usize) -> bool {
        self.next_states[sa] == Some(state)
    }

    /// State-action pairs observed so far, in first-observed order.
    pub fn seen(&self) -> &[usize] {
        &self.seen
    }

    /// Forget all observed transitions.
    pub fn clear(&mut self) {
        self.next_states.fill(None);
        self.rewards.fill(0.0);
        self.seen.clear();
    }
}
