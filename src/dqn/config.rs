//! Configuration for the DQN core.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hyperparameters for [`DqnSolver`](crate::dqn::DqnSolver).
///
/// Every field has a default; construction goes through
/// [`DqnConfig::new`] with the environment dimensions, followed by
/// builder-style `with_*` overrides. [`validate`](DqnConfig::validate) runs
/// at solver construction and rejects out-of-range values instead of
/// falling back silently.
///
/// # Examples
///
/// ```
/// use reinforce::DqnConfig;
///
/// let config = DqnConfig::new(20, 4)
///     .with_alpha(0.005)
///     .with_gamma(0.9)
///     .with_epsilon_decay(1.0, 0.1, 1_000_000)
///     .with_replay(5000, 25, 10)
///     .with_training_mode(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqnConfig {
    /// Length of the state vectors fed to the approximator
    pub state_count: usize,
    /// Number of selectable actions
    pub action_count: usize,
    /// Hidden layer widths requested from the approximator
    pub hidden_units: Vec<usize>,
    /// Value-function learning rate α
    pub alpha: f64,
    /// Fixed exploration rate used outside of training mode
    pub epsilon: f64,
    /// Annealing start value used in training mode
    pub epsilon_max: f64,
    /// Annealing floor used in training mode
    pub epsilon_min: f64,
    /// Learning cycles over which ε anneals from max to min
    pub epsilon_decay_period: u64,
    /// Future reward discount factor γ
    pub gamma: f64,
    /// Clamp the TD error into [-loss_clamp, +loss_clamp]
    pub do_loss_clipping: bool,
    /// Huber-style loss bound
    pub loss_clamp: f64,
    /// Clamp incoming rewards to sign(r)·min(|r|, reward_clamp)
    pub do_reward_clipping: bool,
    /// Reward magnitude bound
    pub reward_clamp: f64,
    /// Replay memory capacity
    pub experience_size: usize,
    /// Keep one experience every this many learning cycles
    pub keep_experience_interval: u64,
    /// Experiences replayed per learning cycle
    pub replay_steps: usize,
    /// Anneal ε while true, use the fixed deployment ε otherwise
    pub training_mode: bool,
}

impl DqnConfig {
    /// Create a configuration for the given state/action dimensions with
    /// default hyperparameters.
    pub fn new(state_count: usize, action_count: usize) -> Self {
        Self {
            state_count,
            action_count,
            hidden_units: vec![100],
            alpha: 0.005,
            epsilon: 0.2,
            epsilon_max: 1.0,
            epsilon_min: 0.1,
            epsilon_decay_period: 1_000_000,
            gamma: 0.9,
            do_loss_clipping: true,
            loss_clamp: 1.0,
            do_reward_clipping: false,
            reward_clamp: 1.0,
            experience_size: 5000,
            keep_experience_interval: 25,
            replay_steps: 10,
            training_mode: false,
        }
    }

    /// Set the hidden layer widths requested from the approximator.
    pub fn with_hidden_units(mut self, hidden_units: Vec<usize>) -> Self {
        self.hidden_units = hidden_units;
        self
    }

    /// Set the value-function learning rate α.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the fixed deployment exploration rate ε.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the training-mode annealing schedule: ε decays linearly from
    /// `epsilon_max` to `epsilon_min` over `decay_period` learning cycles.
    pub fn with_epsilon_decay(
        mut self,
        epsilon_max: f64,
        epsilon_min: f64,
        decay_period: u64,
    ) -> Self {
        self.epsilon_max = epsilon_max;
        self.epsilon_min = epsilon_min;
        self.epsilon_decay_period = decay_period;
        self
    }

    /// Set the future reward discount factor γ.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Enable or disable Huber-style loss clamping with the given bound.
    pub fn with_loss_clipping(mut self, enabled: bool, loss_clamp: f64) -> Self {
        self.do_loss_clipping = enabled;
        self.loss_clamp = loss_clamp;
        self
    }

    /// Enable or disable reward clamping with the given bound.
    pub fn with_reward_clipping(mut self, enabled: bool, reward_clamp: f64) -> Self {
        self.do_reward_clipping = enabled;
        self.reward_clamp = reward_clamp;
        self
    }

    /// Set replay memory capacity, admission interval and replayed
    /// experiences per learning cycle.
    pub fn with_replay(
        mut self,
        experience_size: usize,
        keep_experience_interval: u64,
        replay_steps: usize,
    ) -> Self {
        self.experience_size = experience_size;
        self.keep_experience_interval = keep_experience_interval;
        self.replay_steps = replay_steps;
        self
    }

    /// Switch between training mode (annealed ε) and deployment mode
    /// (fixed ε).
    pub fn with_training_mode(mut self, training_mode: bool) -> Self {
        self.training_mode = training_mode;
        self
    }

    /// Check every field against its legal range.
    pub fn validate(&self) -> Result<()> {
        if self.state_count == 0 {
            return Self::invalid("state_count must be positive");
        }
        if self.action_count == 0 {
            return Self::invalid("action_count must be positive");
        }
        if self.alpha < 0.0 || !self.alpha.is_finite() {
            return Self::invalid("alpha must be finite and non-negative");
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Self::invalid("epsilon must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.epsilon_max) || !(0.0..=1.0).contains(&self.epsilon_min) {
            return Self::invalid("epsilon_max and epsilon_min must be within [0, 1]");
        }
        if self.epsilon_min > self.epsilon_max {
            return Self::invalid("epsilon_min must not exceed epsilon_max");
        }
        if self.epsilon_decay_period == 0 {
            return Self::invalid("epsilon_decay_period must be positive");
        }
        if !(0.0..1.0).contains(&self.gamma) {
            return Self::invalid("gamma must be within [0, 1)");
        }
        if self.do_loss_clipping && self.loss_clamp <= 0.0 {
            return Self::invalid("loss_clamp must be positive when loss clipping is enabled");
        }
        if self.do_reward_clipping && self.reward_clamp <= 0.0 {
            return Self::invalid("reward_clamp must be positive when reward clipping is enabled");
        }
        if self.experience_size == 0 {
            return Self::invalid("experience_size must be positive");
        }
        if self.keep_experience_interval == 0 {
            return Self::invalid("keep_experience_interval must be positive");
        }
        Ok(())
    }

    fn invalid(message: &str) -> Result<()> {
        Err(Error::InvalidConfiguration {
            message: message.to_string(),
        })
    }
}
