//! Exploration policies and action sampling.
//!
//! Both learning cores choose actions epsilon-greedily: with probability ε a
//! uniform random action, otherwise an exploitation choice. The cores differ
//! in what they exploit — the DQN core takes the argmax of a forward pass,
//! the TD core samples its stored policy distribution over the allowed
//! actions of the current state.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Build a solver RNG, seeded for reproducibility when a seed is given.
pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Outcome of an epsilon-greedy draw over an allowed-action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Chosen action index (always a member of the allowed set).
    pub action: usize,
    /// Whether the action came from the uniform exploration branch.
    pub explored: bool,
}

/// Index of the maximum value, ties broken by the lowest index.
///
/// The scan is a stable left-to-right pass, so for `ε = 0` action selection
/// is fully deterministic.
pub fn argmax(values: &[f64]) -> usize {
    debug_assert!(!values.is_empty());
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

/// Linearly annealed exploration rate.
///
/// Decays from `epsilon_max` at tick 0 to `epsilon_min` at `decay_period`
/// ticks, and stays at `epsilon_min` afterwards.
pub fn annealed_epsilon(epsilon_max: f64, epsilon_min: f64, decay_period: u64, tick: u64) -> f64 {
    if tick < decay_period {
        epsilon_max - (epsilon_max - epsilon_min) / decay_period as f64 * tick as f64
    } else {
        epsilon_min
    }
}

/// Epsilon-greedy draw over a dense action-value vector.
///
/// With probability `epsilon` a uniform index in `[0, num_actions)` is
/// returned; otherwise the argmax of `action_values()`. The values are
/// requested lazily so the exploration branch never pays for a forward pass.
pub fn epsilon_greedy<R, F>(rng: &mut R, epsilon: f64, num_actions: usize, action_values: F) -> usize
where
    R: Rng,
    F: FnOnce() -> Vec<f64>,
{
    debug_assert!(num_actions > 0);
    if rng.random::<f64>() < epsilon {
        rng.random_range(0..num_actions)
    } else {
        argmax(&action_values())
    }
}

/// Epsilon-greedy draw restricted to an allowed-action set with an explicit
/// probability weight per allowed action.
///
/// With probability `epsilon` a uniform member of `allowed` is chosen and the
/// draw is flagged as exploratory; otherwise an index is sampled from the
/// cumulative weights in `probabilities` and mapped back into `allowed`.
pub fn epsilon_greedy_weighted<R: Rng>(
    rng: &mut R,
    epsilon: f64,
    allowed: &[usize],
    probabilities: &[f64],
) -> Selection {
    debug_assert!(!allowed.is_empty());
    debug_assert_eq!(allowed.len(), probabilities.len());
    if rng.random::<f64>() < epsilon {
        Selection {
            action: allowed[rng.random_range(0..allowed.len())],
            explored: true,
        }
    } else {
        Selection {
            action: allowed[sample_weighted(rng, probabilities)],
            explored: false,
        }
    }
}

/// Cumulative-weight draw. Falls back to a uniform draw when the total
/// weight is not positive.
fn sample_weighted<R: Rng>(rng: &mut R, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return rng.random_range(0..weights.len());
    }

    let mut threshold = rng.random::<f64>() * total;
    for (index, weight) in weights.iter().enumerate() {
        if threshold < *weight {
            return index;
        }
        threshold -= weight;
    }

    // Numerical fallback when rounding pushes the threshold past the end.
    weights.len() - 1
}
