//! Value-function approximator port consumed by the DQN core.

/// Contract for the numeric collaborator that represents Q(s, ·) as a
/// parametric function of a state vector.
///
/// The DQN core does not define its own autodiff engine. It drives an
/// external one through this trait: a gradient-free [`forward`] pass for
/// bootstrapped targets and greedy action selection, and a traced
/// [`forward_traced`] / [`backward`] / [`update`] cycle for the gradient
/// step.
///
/// The gradient context produced by a traced pass is threaded through as an
/// explicit [`Tape`](ValueApproximator::Tape) value and consumed by the
/// matching [`backward`] call. Replay interleaves many forward passes per
/// learning cycle; pairing each backward invocation with its own tape keeps
/// those passes from trampling each other.
///
/// [`forward`]: ValueApproximator::forward
/// [`forward_traced`]: ValueApproximator::forward_traced
/// [`backward`]: ValueApproximator::backward
/// [`update`]: ValueApproximator::update
pub trait ValueApproximator {
    /// Gradient context recorded by a traced forward pass.
    type Tape;

    /// Length of the state vectors this approximator accepts.
    fn input_len(&self) -> usize;

    /// Number of action values produced per forward pass.
    fn output_len(&self) -> usize;

    /// Gradient-free forward pass.
    fn forward(&self, state: &[f64]) -> Vec<f64>;

    /// Forward pass that records the operations needed for backpropagation.
    fn forward_traced(&self, state: &[f64]) -> (Vec<f64>, Self::Tape);

    /// Backpropagate `output_gradients` through the recorded tape,
    /// accumulating weight gradients.
    fn backward(&mut self, tape: Self::Tape, output_gradients: &[f64]);

    /// Apply the accumulated gradients as a descent step scaled by
    /// `learning_rate`, then clear the accumulators.
    fn update(&mut self, learning_rate: f64);

    /// Discard all learned weights and reinitialize.
    fn reinitialize(&mut self);
}
