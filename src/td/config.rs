//! Configuration for the tabular TD core.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// TD target selection rule.
///
/// Only these two rules exist; parsing any other string is a configuration
/// error, never a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateRule {
    /// Off-policy target r + γ·max over allowed actions at the next state.
    #[serde(rename = "qlearn")]
    QLearn,
    /// On-policy target r + γ·Q at the action actually taken next.
    #[serde(rename = "sarsa")]
    Sarsa,
}

impl UpdateRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateRule::QLearn => "qlearn",
            UpdateRule::Sarsa => "sarsa",
        }
    }
}

impl FromStr for UpdateRule {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "qlearn" => Ok(UpdateRule::QLearn),
            "sarsa" => Ok(UpdateRule::Sarsa),
            _ => Err(Error::ParseUpdateRule {
                input: input.to_string(),
            }),
        }
    }
}

impl fmt::Display for UpdateRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hyperparameters for [`TdSolver`](crate::td::TdSolver).
///
/// # Examples
///
/// ```
/// use reinforce::{TdConfig, UpdateRule};
///
/// let config = TdConfig::default()
///     .with_update(UpdateRule::Sarsa)
///     .with_alpha(0.05)
///     .with_lambda(0.7)
///     .with_planning_steps(50);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TdConfig {
    /// Target selection rule
    pub update: UpdateRule,
    /// Value-function learning rate α
    pub alpha: f64,
    /// Exploration rate ε
    pub epsilon: f64,
    /// Future reward discount factor γ
    pub gamma: f64,
    /// Policy learning rate β, used when smooth policy updates are on
    pub beta: f64,
    /// Eligibility trace decay λ; 0 disables traces
    pub lambda: f64,
    /// Hard-set traces to 1 instead of accumulating
    pub replacing_traces: bool,
    /// Blend the policy toward the greedy target instead of hard-assigning
    pub smooth_policy_update: bool,
    /// Optimistic initial Q value
    pub q_init: f64,
    /// Modeled transitions replayed per learning cycle; 0 disables planning
    pub planning_steps: usize,
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            update: UpdateRule::QLearn,
            alpha: 0.01,
            epsilon: 0.1,
            gamma: 0.75,
            beta: 0.01,
            lambda: 0.0,
            replacing_traces: true,
            smooth_policy_update: false,
            q_init: 0.0,
            planning_steps: 0,
        }
    }
}

impl TdConfig {
    /// Set the target selection rule.
    pub fn with_update(mut self, update: UpdateRule) -> Self {
        self.update = update;
        self
    }

    /// Set the value-function learning rate α.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the exploration rate ε.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the future reward discount factor γ.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the policy learning rate β for smooth policy updates.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the eligibility trace decay λ. 0 disables traces.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    /// Hard-set traces to 1 on revisit instead of accumulating.
    pub fn with_replacing_traces(mut self, replacing_traces: bool) -> Self {
        self.replacing_traces = replacing_traces;
        self
    }

    /// Blend the policy toward the greedy target by β instead of
    /// hard-assigning it.
    pub fn with_smooth_policy_update(mut self, smooth_policy_update: bool) -> Self {
        self.smooth_policy_update = smooth_policy_update;
        self
    }

    /// Set an optimistic initial value for the Q-table.
    pub fn with_q_init(mut self, q_init: f64) -> Self {
        self.q_init = q_init;
        self
    }

    /// Set the number of planning steps per learning cycle. 0 disables
    /// planning.
    pub fn with_planning_steps(mut self, planning_steps: usize) -> Self {
        self.planning_steps = planning_steps;
        self
    }

    /// Check every field against its legal range.
    pub fn validate(&self) -> Result<()> {
        if self.alpha < 0.0 || !self.alpha.is_finite() {
            return Self::invalid("alpha must be finite and non-negative");
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Self::invalid("epsilon must be within [0, 1]");
        }
        if !(0.0..1.0).contains(&self.gamma) {
            return Self::invalid("gamma must be within [0, 1)");
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return Self::invalid("beta must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.lambda) {
            return Self::invalid("lambda must be within [0, 1]");
        }
        if !self.q_init.is_finite() {
            return Self::invalid("q_init must be finite");
        }
        Ok(())
    }

    fn invalid(message: &str) -> Result<()> {
        Err(Error::InvalidConfiguration {
            message: message.to_string(),
        })
    }
}
