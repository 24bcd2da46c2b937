//! Q-learning solver on top of an external value-function approximator.

use rand::rngs::StdRng;

use crate::{
    dqn::{
        config::DqnConfig,
        replay::{ReplayMemory, SarsaExperience},
    },
    error::{Error, Result},
    policy,
    ports::{Solver, ValueApproximator},
};

/// The single mutable (t-1, t) transition the solver learns from.
///
/// All slots start empty; a reward of exactly 0.0 is a real reward and is
/// represented as `Some(0.0)`, never as an absent slot.
#[derive(Debug, Clone, Default)]
struct ShortTermMemory {
    s0: Option<Vec<f64>>,
    a0: Option<usize>,
    r0: Option<f64>,
    s1: Option<Vec<f64>>,
    a1: Option<usize>,
}

impl ShortTermMemory {
    /// Shift the (t-1, t) window forward by one decision.
    fn shift(&mut self, state: Vec<f64>, action: usize) {
        self.s0 = self.s1.take();
        self.a0 = self.a1.take();
        self.s1 = Some(state);
        self.a1 = Some(action);
    }

    /// Clone the window into a detached experience, if complete.
    fn snapshot(&self) -> Option<SarsaExperience> {
        Some(SarsaExperience {
            s0: self.s0.clone()?,
            a0: self.a0?,
            r0: self.r0?,
            s1: self.s1.clone()?,
            a1: self.a1?,
        })
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Q-learning agent with epsilon-greedy exploration, experience replay and
/// clipped TD error.
///
/// The solver is generic over the approximator backing Q(s, ·). Each
/// learning cycle bootstraps a target from a gradient-free forward pass on
/// the successor state, injects the clipped error as the gradient on the
/// chosen action's output slot, and applies one descent step — once for the
/// live transition and once per replayed experience.
#[derive(Debug)]
pub struct DqnSolver<N: ValueApproximator> {
    config: DqnConfig,
    net: N,
    short_term: ShortTermMemory,
    replay: ReplayMemory,
    learn_tick: u64,
    training_mode: bool,
    rng: StdRng,
    rng_seed: Option<u64>,
}

impl<N: ValueApproximator> DqnSolver<N> {
    /// Create a solver from a validated configuration and a freshly
    /// constructed approximator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for out-of-range
    /// hyperparameters and [`Error::ApproximatorShapeMismatch`] when the
    /// approximator dimensions disagree with the configuration.
    pub fn new(config: DqnConfig, net: N) -> Result<Self> {
        config.validate()?;
        if net.input_len() != config.state_count || net.output_len() != config.action_count {
            return Err(Error::ApproximatorShapeMismatch {
                input_len: net.input_len(),
                output_len: net.output_len(),
                expected_inputs: config.state_count,
                expected_outputs: config.action_count,
            });
        }

        let replay = ReplayMemory::new(config.experience_size);
        let training_mode = config.training_mode;
        Ok(Self {
            config,
            net,
            short_term: ShortTermMemory::default(),
            replay,
            learn_tick: 0,
            training_mode,
            rng: policy::build_rng(None),
            rng_seed: None,
        })
    }

    /// Seed the internal random number generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = policy::build_rng(Some(seed));
        self.rng_seed = Some(seed);
        self
    }

    /// Switch between training mode (annealed ε) and deployment mode
    /// (fixed ε).
    pub fn set_training_mode(&mut self, training_mode: bool) {
        self.training_mode = training_mode;
    }

    pub fn training_mode(&self) -> bool {
        self.training_mode
    }

    /// The exploration rate in effect for the next decision.
    pub fn current_epsilon(&self) -> f64 {
        if self.training_mode {
            policy::annealed_epsilon(
                self.config.epsilon_max,
                self.config.epsilon_min,
                self.config.epsilon_decay_period,
                self.learn_tick,
            )
        } else {
            self.config.epsilon
        }
    }

    /// Completed learning cycles so far.
    pub fn learn_tick(&self) -> u64 {
        self.learn_tick
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn net(&self) -> &N {
        &self.net
    }

    pub fn replay_memory(&self) -> &ReplayMemory {
        &self.replay
    }

    fn clip_reward(&self, reward: f64) -> f64 {
        if self.config.do_reward_clipping {
            reward.signum() * reward.abs().min(self.config.reward_clamp)
        } else {
            reward
        }
    }

    fn clip_loss(&self, loss: f64) -> f64 {
        if self.config.do_loss_clipping {
            loss.clamp(-self.config.loss_clamp, self.config.loss_clamp)
        } else {
            loss
        }
    }

    /// One gradient step on a single transition.
    fn learn_from_experience(&mut self, experience: &SarsaExperience) {
        let target = self.target_q(&experience.s1, experience.r0);

        let (q0, tape) = self.net.forward_traced(&experience.s0);
        let loss = self.clip_loss(q0[experience.a0] - target);

        let mut output_gradients = vec![0.0; self.config.action_count];
        output_gradients[experience.a0] = loss;
        self.net.backward(tape, &output_gradients);
        self.net.update(self.config.alpha);
    }

    /// Bootstrapped target r0 + γ·max_a Q(s1, a), gradient-free.
    fn target_q(&self, s1: &[f64], r0: f64) -> f64 {
        let values = self.net.forward(s1);
        r0 + self.config.gamma * values[policy::argmax(&values)]
    }

    /// Admit the experience on gate ticks; the tick advances every learning
    /// cycle regardless of gating.
    fn keep_experience(&mut self, experience: SarsaExperience) {
        if self.learn_tick.is_multiple_of(self.config.keep_experience_interval) {
            self.replay.insert(experience);
        }
        self.learn_tick += 1;
    }

    /// Replay uniformly sampled experiences; a still-empty buffer skips
    /// replay entirely.
    fn replay_experiences(&mut self) {
        if self.replay.is_empty() {
            return;
        }
        for _ in 0..self.config.replay_steps {
            if let Some(experience) = self.replay.sample(&mut self.rng).cloned() {
                self.learn_from_experience(&experience);
            }
        }
    }

    fn reset_rng(&mut self) {
        self.rng = policy::build_rng(self.rng_seed);
    }
}

impl<N: ValueApproximator> Solver for DqnSolver<N> {
    type State = [f64];

    fn decide(&mut self, state: &[f64]) -> Result<usize> {
        if state.len() != self.config.state_count {
            return Err(Error::StateDimensionMismatch {
                expected: self.config.state_count,
                got: state.len(),
            });
        }

        let epsilon = self.current_epsilon();
        let action = policy::epsilon_greedy(&mut self.rng, epsilon, self.config.action_count, || {
            self.net.forward(state)
        });

        self.short_term.shift(state.to_vec(), action);
        Ok(action)
    }

    fn learn(&mut self, reward: f64) -> Result<()> {
        if self.config.alpha > 0.0 {
            if let Some(experience) = self.short_term.snapshot() {
                self.learn_from_experience(&experience);
                self.keep_experience(experience);
                self.replay_experiences();
            }
        }
        self.short_term.r0 = Some(self.clip_reward(reward));
        Ok(())
    }

    fn name(&self) -> &str {
        "DQN"
    }

    fn reset(&mut self) -> Result<()> {
        self.net.reinitialize();
        self.replay.clear();
        self.short_term.clear();
        self.learn_tick = 0;
        self.reset_rng();
        Ok(())
    }
}
