//! Common test fixtures for the reinforce test suite.
//!
//! Provides a minimal linear value-function approximator and environment
//! stubs used across multiple integration tests.

use reinforce::{DiscreteEnvironment, ValueApproximator};
use serde::{Deserialize, Serialize};

/// Gradient context of a [`LinearQNet`] forward pass: the input is all the
/// backward pass needs.
pub struct LinearTape {
    input: Vec<f64>,
}

/// Linear value function Q(s) = W·s + b with one output row per action.
///
/// This is deliberately the simplest thing satisfying the approximator
/// contract: no hidden layers, zero-initialized weights, plain accumulated
/// gradients. Updates are exactly `w -= alpha * grad`, which makes expected
/// weight values easy to compute by hand in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearQNet {
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
    weight_gradients: Vec<Vec<f64>>,
    bias_gradients: Vec<f64>,
}

impl LinearQNet {
    pub fn new(input_len: usize, output_len: usize) -> Self {
        assert!(input_len > 0 && output_len > 0);
        Self {
            weights: vec![vec![0.0; input_len]; output_len],
            bias: vec![0.0; output_len],
            weight_gradients: vec![vec![0.0; input_len]; output_len],
            bias_gradients: vec![0.0; output_len],
        }
    }

    /// Build a net with predetermined weights, one row per action.
    pub fn from_weights(weights: Vec<Vec<f64>>, bias: Vec<f64>) -> Self {
        assert!(!weights.is_empty());
        assert_eq!(weights.len(), bias.len());
        let input_len = weights[0].len();
        let output_len = weights.len();
        Self {
            weights,
            bias,
            weight_gradients: vec![vec![0.0; input_len]; output_len],
            bias_gradients: vec![0.0; output_len],
        }
    }

    pub fn weight(&self, action: usize, input: usize) -> f64 {
        self.weights[action][input]
    }
}

impl ValueApproximator for LinearQNet {
    type Tape = LinearTape;

    fn input_len(&self) -> usize {
        self.weights[0].len()
    }

    fn output_len(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, state: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, bias)| {
                row.iter().zip(state).map(|(w, s)| w * s).sum::<f64>() + bias
            })
            .collect()
    }

    fn forward_traced(&self, state: &[f64]) -> (Vec<f64>, LinearTape) {
        (
            self.forward(state),
            LinearTape {
                input: state.to_vec(),
            },
        )
    }

    fn backward(&mut self, tape: LinearTape, output_gradients: &[f64]) {
        for (action, gradient) in output_gradients.iter().enumerate() {
            for (input, value) in tape.input.iter().enumerate() {
                self.weight_gradients[action][input] += gradient * value;
            }
            self.bias_gradients[action] += gradient;
        }
    }

    fn update(&mut self, learning_rate: f64) {
        for (row, gradients) in self.weights.iter_mut().zip(&mut self.weight_gradients) {
            for (weight, gradient) in row.iter_mut().zip(gradients.iter_mut()) {
                *weight -= learning_rate * *gradient;
                *gradient = 0.0;
            }
        }
        for (bias, gradient) in self.bias.iter_mut().zip(&mut self.bias_gradients) {
            *bias -= learning_rate * *gradient;
            *gradient = 0.0;
        }
    }

    fn reinitialize(&mut self) {
        for row in &mut self.weights {
            row.fill(0.0);
        }
        self.bias.fill(0.0);
        for row in &mut self.weight_gradients {
            row.fill(0.0);
        }
        self.bias_gradients.fill(0.0);
    }
}

/// Environment where every action is allowed in every state.
pub struct FreeEnv {
    pub states: usize,
    pub actions: usize,
}

impl DiscreteEnvironment for FreeEnv {
    fn num_states(&self) -> usize {
        self.states
    }

    fn num_actions(&self) -> usize {
        self.actions
    }

    fn allowed_actions(&self, _state: usize) -> Vec<usize> {
        (0..self.actions).collect()
    }
}
