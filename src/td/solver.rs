//! Tabular TD control solver with eligibility traces and planning.

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    policy,
    ports::{DiscreteEnvironment, Solver},
    td::{
        MIN_UPDATE,
        config::{TdConfig, UpdateRule},
        model::EnvironmentModel,
        planner::PriorityPlanner,
    },
};

/// Snapshot of everything a TD solver has learned, used by the
/// serialization layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TdSolverState {
    pub num_states: usize,
    pub num_actions: usize,
    pub q: Vec<f64>,
    pub policy: Vec<f64>,
    pub traces: Vec<f64>,
    pub model: EnvironmentModel,
    pub planner: PriorityPlanner,
    pub rng_seed: Option<u64>,
}

/// Tabular TD control agent (`qlearn` or `sarsa` targets) with an explicit
/// stored policy, eligibility traces and Dyna-style prioritized planning.
///
/// The Q-table, policy table and trace table are flat arrays indexed by
/// `action * num_states + state`. The solver owns its environment handle
/// but never transitions it; the driving loop feeds observed states into
/// [`decide`](Solver::decide) and rewards into [`learn`](Solver::learn).
#[derive(Debug)]
pub struct TdSolver<E: DiscreteEnvironment> {
    config: TdConfig,
    env: E,
    num_states: usize,
    num_actions: usize,
    q: Vec<f64>,
    policy: Vec<f64>,
    traces: Vec<f64>,
    model: EnvironmentModel,
    planner: PriorityPlanner,
    explored: bool,
    s0: Option<usize>,
    a0: Option<usize>,
    r0: Option<f64>,
    s1: Option<usize>,
    a1: Option<usize>,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl<E: DiscreteEnvironment> TdSolver<E> {
    /// Create a solver for the given environment.
    ///
    /// The policy starts uniform over each state's allowed actions and the
    /// Q-table at `q_init`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for out-of-range
    /// hyperparameters or an environment with zero states or actions.
    pub fn new(config: TdConfig, env: E) -> Result<Self> {
        config.validate()?;
        let num_states = env.num_states();
        let num_actions = env.num_actions();
        if num_states == 0 || num_actions == 0 {
            return Err(Error::InvalidConfiguration {
                message: "environment must have at least one state and one action".to_string(),
            });
        }

        let table_len = num_states * num_actions;
        let mut solver = Self {
            q: vec![config.q_init; table_len],
            policy: vec![0.0; table_len],
            traces: vec![0.0; table_len],
            model: EnvironmentModel::new(table_len),
            planner: PriorityPlanner::new(table_len),
            config,
            env,
            num_states,
            num_actions,
            explored: false,
            s0: None,
            a0: None,
            r0: None,
            s1: None,
            a1: None,
            rng: policy::build_rng(None),
            rng_seed: None,
        };
        solver.initialize_policy();
        Ok(solver)
    }

    /// Seed the internal random number generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = policy::build_rng(Some(seed));
        self.rng_seed = Some(seed);
        self
    }

    pub fn config(&self) -> &TdConfig {
        &self.config
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// Learned value of a state-action pair.
    pub fn q_value(&self, state: usize, action: usize) -> f64 {
        self.q[self.sa_index(state, action)]
    }

    /// Current policy probability of taking `action` in `state`.
    pub fn policy_probability(&self, state: usize, action: usize) -> f64 {
        self.policy[self.sa_index(state, action)]
    }

    /// Current eligibility trace of a state-action pair.
    pub fn trace_value(&self, state: usize, action: usize) -> f64 {
        self.traces[self.sa_index(state, action)]
    }

    fn sa_index(&self, state: usize, action: usize) -> usize {
        action * self.num_states + state
    }

    /// Uniform policy over each state's allowed actions.
    fn initialize_policy(&mut self) {
        for state in 0..self.num_states {
            let allowed = self.env.allowed_actions(state);
            if allowed.is_empty() {
                continue;
            }
            let probability = 1.0 / allowed.len() as f64;
            for action in allowed {
                let index = self.sa_index(state, action);
                self.policy[index] = probability;
            }
        }
    }

    fn shift_memory(&mut self, state: usize, action: usize) {
        self.s0 = self.s1;
        self.a0 = self.a1;
        self.s1 = Some(state);
        self.a1 = Some(action);
    }

    /// Max Q over the allowed actions, 0 when the set is empty (terminal
    /// states bootstrap nothing).
    fn max_q(&self, state: usize, allowed: &[usize]) -> f64 {
        let mut best = 0.0;
        for (index, &action) in allowed.iter().enumerate() {
            let value = self.q[self.sa_index(state, action)];
            if index == 0 || value > best {
                best = value;
            }
        }
        best
    }

    fn td_target(&self, r0: f64, s1: usize, a1: Option<usize>) -> f64 {
        let next_value = match self.config.update {
            UpdateRule::QLearn => {
                let allowed = self.env.allowed_actions(s1);
                self.max_q(s1, &allowed)
            }
            UpdateRule::Sarsa => match a1 {
                Some(action) => self.q[self.sa_index(s1, action)],
                None => 0.0,
            },
        };
        r0 + self.config.gamma * next_value
    }

    /// Apply one TD update for an observed or modeled transition.
    ///
    /// With λ = 0 this is a plain one-step update on (s0, a0); the trace
    /// table is untouched. With λ > 0 the update sweeps every allowed
    /// state-action pair through its eligibility trace. Planning replays
    /// always pass λ = 0 so modeled transitions never disturb the traces.
    fn learn_from_tuple(
        &mut self,
        s0: usize,
        a0: usize,
        r0: f64,
        s1: usize,
        a1: Option<usize>,
        lambda: f64,
    ) {
        let target = self.td_target(r0, s1, a1);
        let sa = self.sa_index(s0, a0);

        if lambda > 0.0 {
            if self.config.replacing_traces {
                self.traces[sa] = 1.0;
            } else {
                self.traces[sa] += 1.0;
            }

            let decay = lambda * self.config.gamma;
            let mut state_updates = vec![0.0; self.num_states];
            for state in 0..self.num_states {
                for action in self.env.allowed_actions(state) {
                    let index = self.sa_index(state, action);
                    let update = self.config.alpha * self.traces[index] * (target - self.q[index]);
                    self.q[index] += update;
                    self.update_priority(state, update);
                    self.traces[index] *= decay;
                    let magnitude = update.abs();
                    if magnitude > state_updates[state] {
                        state_updates[state] = magnitude;
                    }
                }
            }
            for state in 0..self.num_states {
                if state_updates[state] > MIN_UPDATE {
                    self.update_policy(state);
                }
            }
            if self.explored && self.config.update == UpdateRule::QLearn {
                // Q-learning is off-policy: an exploratory action breaks the
                // trace's on-policy assumption, so the whole table is wiped.
                self.traces.fill(0.0);
            }
        } else {
            let update = self.config.alpha * (target - self.q[sa]);
            self.q[sa] += update;
            self.update_priority(s0, update);
            self.update_policy(s0);
        }
    }

    /// Raise the priority of every pair modeled to lead into `state`.
    ///
    /// Every action at every state is scanned; pairs never observed have no
    /// modeled successor and never match.
    fn update_priority(&mut self, state: usize, update: f64) {
        let magnitude = update.abs();
        if magnitude < MIN_UPDATE {
            return;
        }
        if self.config.planning_steps == 0 {
            return;
        }
        for source_state in 0..self.num_states {
            for source_action in 0..self.num_actions {
                let index = self.sa_index(source_state, source_action);
                if self.model.predicts(index, state) {
                    self.planner.raise(index, magnitude);
                }
            }
        }
    }

    /// Refresh the policy at `state` toward the greedy target, ties sharing
    /// probability equally.
    fn update_policy(&mut self, state: usize) {
        let allowed = self.env.allowed_actions(state);
        if allowed.is_empty() {
            return;
        }

        let values: Vec<f64> = allowed
            .iter()
            .map(|&action| self.q[self.sa_index(state, action)])
            .collect();
        let mut best = values[0];
        let mut best_count = 1;
        for &value in &values[1..] {
            if value > best {
                best = value;
                best_count = 1;
            } else if value == best {
                best_count += 1;
            }
        }

        let mut total = 0.0;
        for (&action, &value) in allowed.iter().zip(&values) {
            let target = if value == best {
                1.0 / best_count as f64
            } else {
                0.0
            };
            let index = self.sa_index(state, action);
            if self.config.smooth_policy_update {
                self.policy[index] += self.config.beta * (target - self.policy[index]);
                total += self.policy[index];
            } else {
                self.policy[index] = target;
            }
        }

        if self.config.smooth_policy_update && total > 0.0 {
            for &action in &allowed {
                let index = self.sa_index(state, action);
                self.policy[index] /= total;
            }
        }
    }

    /// Back up the highest-priority modeled transitions.
    fn plan(&mut self) {
        let candidates = self.planner.ranked_candidates(self.model.seen());
        let steps = self.config.planning_steps.min(candidates.len());
        for &sa in &candidates[..steps] {
            self.planner.clear(sa);
            let s0 = sa % self.num_states;
            let a0 = sa / self.num_states;
            let Some(s1) = self.model.next_state(sa) else {
                continue;
            };
            let r0 = self.model.reward(sa);
            let a1 = match self.config.update {
                UpdateRule::Sarsa => self.random_allowed_action(s1),
                UpdateRule::QLearn => None,
            };
            self.learn_from_tuple(s0, a0, r0, s1, a1, 0.0);
        }
    }

    fn random_allowed_action(&mut self, state: usize) -> Option<usize> {
        let allowed = self.env.allowed_actions(state);
        if allowed.is_empty() {
            None
        } else {
            Some(allowed[self.rng.random_range(0..allowed.len())])
        }
    }

    fn reset_rng(&mut self) {
        self.rng = policy::build_rng(self.rng_seed);
    }

    pub(crate) fn export_state(&self) -> TdSolverState {
        TdSolverState {
            num_states: self.num_states,
            num_actions: self.num_actions,
            q: self.q.clone(),
            policy: self.policy.clone(),
            traces: self.traces.clone(),
            model: self.model.clone(),
            planner: self.planner.clone(),
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn apply_state(&mut self, state: TdSolverState) {
        self.q = state.q;
        self.policy = state.policy;
        self.traces = state.traces;
        self.model = state.model;
        self.planner = state.planner;
        self.rng_seed = state.rng_seed;
        self.reset_rng();
    }
}

impl<E: DiscreteEnvironment> Solver for TdSolver<E> {
    type State = usize;

    fn decide(&mut self, state: &usize) -> Result<usize> {
        let state = *state;
        if state >= self.num_states {
            return Err(Error::StateOutOfRange {
                state,
                limit: self.num_states,
            });
        }
        let allowed = self.env.allowed_actions(state);
        if allowed.is_empty() {
            return Err(Error::NoAllowedActions { state });
        }

        let probabilities: Vec<f64> = allowed
            .iter()
            .map(|&action| self.policy[self.sa_index(state, action)])
            .collect();
        let selection = policy::epsilon_greedy_weighted(
            &mut self.rng,
            self.config.epsilon,
            &allowed,
            &probabilities,
        );
        self.explored = selection.explored;

        self.shift_memory(state, selection.action);
        Ok(selection.action)
    }

    fn learn(&mut self, reward: f64) -> Result<()> {
        if let (Some(s0), Some(a0), Some(r0), Some(s1), Some(a1)) =
            (self.s0, self.a0, self.r0, self.s1, self.a1)
        {
            self.learn_from_tuple(s0, a0, r0, s1, Some(a1), self.config.lambda);
            if self.config.planning_steps > 0 {
                let sa = self.sa_index(s0, a0);
                self.model.record(sa, s1, r0);
                self.plan();
            }
        }
        self.r0 = Some(reward);
        Ok(())
    }

    fn name(&self) -> &str {
        match self.config.update {
            UpdateRule::QLearn => "Q-learning",
            UpdateRule::Sarsa => "SARSA",
        }
    }

    fn reset(&mut self) -> Result<()> {
        self.q.fill(self.config.q_init);
        self.policy.fill(0.0);
        self.traces.fill(0.0);
        self.initialize_policy();
        self.model.clear();
        self.planner.clear_all();
        self.explored = false;
        self.s0 = None;
        self.a0 = None;
        self.r0 = None;
        self.s1 = None;
        self.a1 = None;
        self.reset_rng();
        Ok(())
    }
}
